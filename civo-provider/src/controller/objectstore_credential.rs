//! Civo object storage credentials
use civo_client::Api;
use civo_core::models::{ObjectStoreCredential, ObjectStoreCredentialConfig, ObjectStorePhase};
use civo_runtime::{ConnectionDetails, Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::info;

use super::{lookup, phase_name};
use crate::{
    apis::{objectstore_credential::CredentialObservation, CivoObjectStoreCredential, CivoObjectStoreCredentialSpec},
    connector::CivoConnector,
    error::{Context, Error, Result},
};

/// Drives [`CivoObjectStoreCredential`] resources through the credentials API
pub struct CredentialClient {
    credentials: Api<ObjectStoreCredential>,
}

impl CredentialClient {
    /// Create a client for credentials in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self {
            credentials: Api::new(client),
        }
    }
}

fn up_to_date(spec: &CivoObjectStoreCredentialSpec, credential: &ObjectStoreCredential) -> bool {
    spec.max_size_gb.is_none_or(|size| size == credential.max_size_gb) && spec.suspended == credential.suspended
}

impl ExternalClient<CivoObjectStoreCredential> for CredentialClient {
    type Error = Error;
    type Observation = CredentialObservation;

    async fn observe(&self, obj: &CivoObjectStoreCredential) -> Result<ExternalObservation<CredentialObservation>> {
        let Some(credential) = lookup(&self.credentials, obj, &obj.spec.name).await? else {
            return Ok(ExternalObservation::absent());
        };
        let observed = ExternalObservation::present(CredentialObservation {
            id: credential.id.clone(),
            access_key_id: credential.access_key_id.clone(),
            max_size_gb: credential.max_size_gb,
            suspended: credential.suspended,
            status: phase_name(&credential.status),
        });
        match credential.status {
            ObjectStorePhase::Ready => {
                let mut details = ConnectionDetails::new();
                details.insert("accessKeyID".into(), credential.access_key_id.clone().into_bytes());
                details.insert("secretAccessKey".into(), credential.secret_access_key.clone().into_bytes());
                Ok(observed
                    .up_to_date(up_to_date(&obj.spec, &credential))
                    .ready(Readiness::Available)
                    .with_details(details))
            }
            ObjectStorePhase::Creating | ObjectStorePhase::Unknown => Ok(observed.ready(Readiness::Creating)),
            ObjectStorePhase::Failed => Err(Error::RemoteFailed {
                kind: "object store credential",
                id: credential.id,
                status: phase_name(&credential.status),
            }),
        }
    }

    async fn create(&self, obj: &CivoObjectStoreCredential) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self
            .credentials
            .find(&spec.name)
            .await
            .context("cannot find object store credential")?
        {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = ObjectStoreCredentialConfig {
            name: spec.name.clone(),
            access_key_id: spec.access_key_id.clone().filter(|k| !k.is_empty()),
            secret_access_key: None,
            max_size_gb: spec.max_size_gb,
            suspended: spec.suspended.then_some(true),
            region: self.credentials.region().to_string(),
        };
        let created = self
            .credentials
            .create(&config)
            .await
            .context("cannot create object store credential")?;
        info!(credential = %created.id, name = %spec.name, "created object store credential");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoObjectStoreCredential) -> Result<()> {
        let Some(credential) = lookup(&self.credentials, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        let config = ObjectStoreCredentialConfig {
            max_size_gb: obj.spec.max_size_gb,
            suspended: Some(obj.spec.suspended),
            region: self.credentials.region().to_string(),
            ..Default::default()
        };
        self.credentials
            .update(&credential.id, &config)
            .await
            .context("cannot update object store credential")?;
        info!(credential = %credential.id, suspended = obj.spec.suspended, "updated object store credential");
        Ok(())
    }

    async fn delete(&self, obj: &CivoObjectStoreCredential) -> Result<()> {
        let Some(credential) = lookup(&self.credentials, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        self.credentials
            .delete(&credential.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete object store credential")?;
        info!(credential = %credential.id, "deleted object store credential");
        Ok(())
    }
}

impl Connector<CivoObjectStoreCredential> for CivoConnector {
    type Error = Error;
    type External = CredentialClient;

    async fn connect(&self, obj: &CivoObjectStoreCredential) -> Result<CredentialClient> {
        Ok(CredentialClient::new(self.civo_client(obj).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{civo_client, timeout_after_1s};

    use http::Method;
    use serde_json::json;

    fn credential(suspended: bool) -> CivoObjectStoreCredential {
        CivoObjectStoreCredential::new("ci", CivoObjectStoreCredentialSpec {
            name: "ci".into(),
            access_key_id: None,
            max_size_gb: None,
            suspended,
            connection_details: None,
            provider_config_ref: None,
            deletion_policy: Default::default(),
        })
    }

    #[tokio::test]
    async fn suspending_a_credential_updates_it() {
        let (client, mut server) = civo_client();
        let external = CredentialClient::new(client);
        let obj = credential(true);
        let mocksrv = tokio::spawn(async move {
            let listed = json!([{"id": "cred-1", "name": "ci", "access_key_id": "AK", "secret_access_key": "SK",
                "max_size_gb": 500, "suspended": false, "status": "ready"}]);
            server
                .ok(Method::GET, "/v2/objectstore/credentials?region=LON1", listed.clone())
                .await;
            server
                .ok(Method::GET, "/v2/objectstore/credentials?region=LON1", listed)
                .await;
            let body = server
                .ok(
                    Method::PUT,
                    "/v2/objectstore/credentials/cred-1?region=LON1",
                    json!({"id": "cred-1"}),
                )
                .await;
            assert_eq!(body, json!({"suspended": true, "region": "LON1"}));
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(!observed.resource_up_to_date);
        assert_eq!(observed.connection_details["secretAccessKey"], b"SK");
        external.update(&obj).await.unwrap();
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn create_lets_the_api_generate_keys() {
        let (client, mut server) = civo_client();
        let external = CredentialClient::new(client);
        let mocksrv = tokio::spawn(async move {
            server
                .ok(Method::GET, "/v2/objectstore/credentials?region=LON1", json!([]))
                .await;
            let body = server
                .ok(
                    Method::POST,
                    "/v2/objectstore/credentials?region=LON1",
                    json!({"id": "cred-2"}),
                )
                .await;
            assert_eq!(body, json!({"name": "ci", "region": "LON1"}));
        });

        let created = external.create(&credential(false)).await.unwrap();
        assert_eq!(created.external_name.as_deref(), Some("cred-2"));
        timeout_after_1s(mocksrv).await;
    }
}
