//! Block storage volumes, `/v2/volumes`
use serde::{Deserialize, Serialize};

/// Normalized lifecycle of a volume
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum VolumePhase {
    /// Created and not attached to anything
    Available,
    /// Attached to an instance
    Attached,
    /// Attached, waiting for the instance to boot
    PendingInstanceStart,
    /// Being created, attached or detached
    Provisioning,
    /// Teardown has started
    Deleting,
    /// Provisioning failed for good
    Failed,
    /// A status this client does not know
    #[default]
    Unknown,
}

impl From<String> for VolumePhase {
    fn from(status: String) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "attached" => Self::Attached,
            "pending_instance_start" => Self::PendingInstanceStart,
            "creating" | "attaching" | "detaching" | "resizing" => Self::Provisioning,
            "deleting" => Self::Deleting,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// A block storage volume
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub instance_id: String,
    pub cluster_id: String,
    pub network_id: String,
    pub mountpoint: String,
    pub size_gigabytes: u32,
    pub bootable: bool,
    pub status: VolumePhase,
    pub created_at: String,
}

impl_resource!(Volume, "volume", "/v2/volumes", |v| &v.name);

/// Body of `POST /v2/volumes`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeConfig {
    pub name: String,
    pub size_gb: u32,
    pub region: String,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bootable: bool,
}

/// Body of `PUT /v2/volumes/{id}/resize`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VolumeResize {
    pub size_gb: u32,
    pub region: String,
}

/// Body of `PUT /v2/volumes/{id}/attach`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VolumeAttach {
    pub instance_id: String,
    pub region: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phases_are_normalized() {
        assert_eq!(VolumePhase::from("available".to_string()), VolumePhase::Available);
        assert_eq!(VolumePhase::from("attached".to_string()), VolumePhase::Attached);
        assert_eq!(
            VolumePhase::from("pending_instance_start".to_string()),
            VolumePhase::PendingInstanceStart
        );
        assert_eq!(VolumePhase::from("attaching".to_string()), VolumePhase::Provisioning);
    }
}
