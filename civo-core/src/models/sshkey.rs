//! SSH public keys, `/v2/sshkeys`
use serde::{Deserialize, Serialize};

/// An uploaded SSH public key
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SshKey {
    pub id: String,
    pub name: String,
    pub fingerprint: String,
}

impl_resource!(SshKey, "ssh key", "/v2/sshkeys", |k| &k.name);

/// Body of `POST /v2/sshkeys`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SshKeyConfig {
    pub name: String,
    pub public_key: String,
}
