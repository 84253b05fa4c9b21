//! Publishing connection details as Kubernetes secrets
//!
//! Secrets are created once and never overwritten; consumers may rely on
//! their contents staying stable for the lifetime of the managed resource.
use k8s_openapi::{api::core::v1::Secret, ByteString};
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info};

use crate::managed::{ConnectionDetails, ConnectionSecretTarget};

/// Label set on every published secret
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Create the connection secret of `owner` unless it already exists
///
/// Returns whether a secret was created.
pub async fn publish(
    client: &Client,
    target: &ConnectionSecretTarget,
    owner: &str,
    details: &ConnectionDetails,
) -> Result<bool, kube::Error> {
    let api: Api<Secret> = Api::namespaced(client.clone(), &target.connection_secret_namespace);
    let name = target.secret_name(owner);
    if api.get_opt(&name).await?.is_some() {
        debug!(secret = %name, "connection secret already exists");
        return Ok(false);
    }
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(target.connection_secret_namespace.clone()),
            labels: Some([(MANAGED_BY_LABEL.to_string(), "civo-provider".to_string())].into()),
            ..ObjectMeta::default()
        },
        data: Some(
            details
                .iter()
                .map(|(k, v)| (k.clone(), ByteString(v.clone())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Secret::default()
    };
    match api.create(&PostParams::default(), &secret).await {
        Ok(_) => {
            info!(secret = %name, namespace = %target.connection_secret_namespace, "published connection secret");
            Ok(true)
        }
        // created concurrently
        Err(kube::Error::Api(err)) if err.code == 409 => Ok(false),
        Err(err) => Err(err),
    }
}

/// Delete the connection secret of `owner`
///
/// Returns whether a secret was deleted; a missing secret is not an error.
pub async fn remove(client: &Client, target: &ConnectionSecretTarget, owner: &str) -> Result<bool, kube::Error> {
    let api: Api<Secret> = Api::namespaced(client.clone(), &target.connection_secret_namespace);
    let name = target.secret_name(owner);
    match api.delete(&name, &DeleteParams::default()).await {
        Ok(_) => {
            info!(secret = %name, "deleted connection secret");
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(err) => Err(err),
    }
}
