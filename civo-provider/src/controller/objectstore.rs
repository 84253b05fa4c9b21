//! Civo object storage buckets
use civo_client::Api;
use civo_core::models::{ObjectStore, ObjectStoreConfig, ObjectStoreCredential, ObjectStorePhase};
use civo_runtime::{ConnectionDetails, Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::info;

use super::{lookup, phase_name};
use crate::{
    apis::{objectstore::ObjectStoreObservation, CivoObjectStore},
    connector::CivoConnector,
    error::{Context, Error, Result},
};

/// Drives [`CivoObjectStore`] resources through the object store API
pub struct ObjectStoreClient {
    stores: Api<ObjectStore>,
    credentials: Api<ObjectStoreCredential>,
}

impl ObjectStoreClient {
    /// Create a client for object stores in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self {
            stores: Api::new(client.clone()),
            credentials: Api::new(client),
        }
    }

    /// Endpoint and keys of a ready bucket
    async fn details(&self, store: &ObjectStore) -> Result<ConnectionDetails> {
        let mut details = ConnectionDetails::new();
        if !store.bucket_url.is_empty() {
            details.insert("endpoint".into(), store.bucket_url.clone().into_bytes());
        }
        let owner = &store.owner_info;
        if !owner.access_key_id.is_empty() {
            details.insert("accessKeyID".into(), owner.access_key_id.clone().into_bytes());
        }
        if !owner.credential_id.is_empty() {
            let credential = self
                .credentials
                .get(&owner.credential_id)
                .await
                .context("cannot get object store credential")?;
            details.insert("secretAccessKey".into(), credential.secret_access_key.into_bytes());
        }
        Ok(details)
    }
}

impl ExternalClient<CivoObjectStore> for ObjectStoreClient {
    type Error = Error;
    type Observation = ObjectStoreObservation;

    async fn observe(&self, obj: &CivoObjectStore) -> Result<ExternalObservation<ObjectStoreObservation>> {
        let Some(store) = lookup(&self.stores, obj, &obj.spec.name).await? else {
            return Ok(ExternalObservation::absent());
        };
        let observed = ExternalObservation::present(ObjectStoreObservation {
            id: store.id.clone(),
            name: store.name.clone(),
            max_size_gb: store.max_size,
            bucket_url: store.bucket_url.clone(),
            access_key_id: store.owner_info.access_key_id.clone(),
            status: phase_name(&store.status),
        });
        match store.status {
            ObjectStorePhase::Ready => Ok(observed
                .up_to_date(obj.spec.max_size_gb == store.max_size)
                .ready(Readiness::Available)
                .with_details(self.details(&store).await?)
                .with_message("Object store is ready")),
            ObjectStorePhase::Creating | ObjectStorePhase::Unknown => Ok(observed
                .ready(Readiness::Creating)
                .with_message("Object store is being created")),
            ObjectStorePhase::Failed => Err(Error::RemoteFailed {
                kind: "object store",
                id: store.id,
                status: phase_name(&store.status),
            }),
        }
    }

    async fn create(&self, obj: &CivoObjectStore) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self.stores.find(&spec.name).await.context("cannot find object store")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = ObjectStoreConfig {
            name: spec.name.clone(),
            max_size_gb: spec.max_size_gb,
            access_key_id: spec.access_key_id.clone().filter(|k| !k.is_empty()),
            region: self.stores.region().to_string(),
        };
        let created = self.stores.create(&config).await.context("cannot create object store")?;
        info!(store = %created.id, name = %spec.name, "created object store");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoObjectStore) -> Result<()> {
        let Some(store) = lookup(&self.stores, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        let config = ObjectStoreConfig {
            name: String::new(),
            max_size_gb: obj.spec.max_size_gb,
            access_key_id: None,
            region: self.stores.region().to_string(),
        };
        self.stores
            .update(&store.id, &config)
            .await
            .context("cannot resize object store")?;
        info!(store = %store.id, max_size_gb = obj.spec.max_size_gb, "resized object store");
        Ok(())
    }

    async fn delete(&self, obj: &CivoObjectStore) -> Result<()> {
        let Some(store) = lookup(&self.stores, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        self.stores
            .delete(&store.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete object store")?;
        info!(store = %store.id, "deleted object store");
        Ok(())
    }
}

impl Connector<CivoObjectStore> for CivoConnector {
    type Error = Error;
    type External = ObjectStoreClient;

    async fn connect(&self, obj: &CivoObjectStore) -> Result<ObjectStoreClient> {
        Ok(ObjectStoreClient::new(self.civo_client(obj).await?))
    }
}
