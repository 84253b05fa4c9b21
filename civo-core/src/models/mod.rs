//! Remote resource models of the Civo API
//!
//! Each model normalizes the free-form status string the API reports into a
//! per-kind phase enum during deserialization, so that no caller has to match
//! on raw strings.

macro_rules! impl_resource {
    ($model:ty, $kind:literal, $path:literal, |$obj:ident| $name:expr) => {
        impl crate::Resource for $model {
            const KIND: &'static str = $kind;
            const URL_PATH: &'static str = $path;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                let $obj = self;
                $name
            }
        }
    };
}

pub mod firewall;
pub mod instance;
pub mod ip;
pub mod kubernetes;
pub mod network;
pub mod objectstore;
pub mod sshkey;
pub mod volume;

pub use firewall::{Firewall, FirewallConfig, FirewallRule, FirewallRuleConfig};
pub use instance::{Instance, InstanceConfig, InstancePhase, InstanceUpdate};
pub use ip::{Ip, IpAction, IpAssignment, IpConfig};
pub use kubernetes::{
    ClusterPhase, InstalledApplication, KubernetesCluster, KubernetesClusterConfig, KubernetesClusterUpdate,
    KubernetesPool, PoolConfig, Taint,
};
pub use network::{Network, NetworkConfig, NetworkPhase};
pub use objectstore::{
    BucketOwner, ObjectStore, ObjectStoreConfig, ObjectStoreCredential, ObjectStoreCredentialConfig,
    ObjectStorePhase,
};
pub use sshkey::{SshKey, SshKeyConfig};
pub use volume::{Volume, VolumeAttach, VolumeConfig, VolumePhase, VolumeResize};
