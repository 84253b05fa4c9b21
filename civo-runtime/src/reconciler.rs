//! The generic managed resource reconciler
//!
//! One reconciliation connects to the external system, observes the external
//! resource and then takes at most one converging step: create when it is
//! absent, update when it drifted, or publish connection details when it is
//! in sync. Deletion is driven through the finalizer.
use std::{sync::Arc, time::Duration};

use kube::{
    api::{Patch, PatchParams},
    runtime::{
        controller::Action,
        finalizer::{finalizer, Event as FinalizerEvent},
    },
    Api, Client, ResourceExt,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    backoff::ObjectBackoff,
    conditions::{set_condition, Condition},
    connection,
    events::EventPublisher,
    managed::{
        ConnectionDetails, Connector, DeletionPolicy, ExternalClient, ExternalError, ExternalObservation, Managed,
        Readiness, EXTERNAL_NAME_ANNOTATION,
    },
};

/// Finalizer guarding external resources
pub const FINALIZER: &str = "finalizer.managedresource.crossplane.io";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors of a reconciliation
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials could not be resolved
    #[error("cannot connect to provider: {0}")]
    Connect(#[source] BoxError),

    /// The external resource could not be observed
    #[error("cannot observe external resource: {0}")]
    Observe(#[source] BoxError),

    /// The external resource could not be created
    #[error("cannot create external resource: {0}")]
    Create(#[source] BoxError),

    /// The external resource could not be updated
    #[error("cannot update external resource: {0}")]
    Update(#[source] BoxError),

    /// The external resource could not be deleted
    #[error("cannot delete external resource: {0}")]
    Delete(#[source] BoxError),

    /// The connection secret could not be written
    #[error("cannot publish connection details: {0}")]
    PublishConnection(#[source] kube::Error),

    /// The external-name annotation could not be written
    #[error("cannot set external name: {0}")]
    SetExternalName(#[source] kube::Error),

    /// The status subresource could not be patched
    #[error("cannot update status: {0}")]
    PatchStatus(#[source] kube::Error),

    /// The object or its observation did not serialize
    #[error("cannot serialize status: {0}")]
    SerializeStatus(#[source] serde_json::Error),

    /// The finalizer could not be added or removed
    #[error("finalizer error: {0}")]
    Finalizer(#[source] Box<kube::runtime::finalizer::Error<Error>>),
}

/// Timing of a managed resource controller
#[derive(Clone, Debug)]
pub struct Config {
    /// Requeue delay while the external resource converges
    pub poll_interval: Duration,
    /// Requeue delay once it is available, and the cap of error backoff
    pub sync_period: Duration,
    /// Maximum number of concurrent reconciliations
    pub concurrency: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            sync_period: Duration::from_secs(3600),
            concurrency: 10,
        }
    }
}

/// State shared by all reconciliations of one kind
pub struct Context<C> {
    /// Kubernetes client
    pub client: Client,
    /// Resolves external clients
    pub connector: C,
    /// Timing
    pub config: Config,
    events: Option<EventPublisher>,
    backoff: ObjectBackoff,
}

impl<C> Context<C> {
    /// A context without event publishing
    pub fn new(client: Client, connector: C, config: Config) -> Self {
        let backoff = ObjectBackoff::new(Duration::from_secs(1), config.sync_period);
        Self {
            client,
            connector,
            config,
            events: None,
            backoff,
        }
    }

    /// Publish events through `events`
    #[must_use]
    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = Some(events);
        self
    }

    async fn normal<K: Managed>(&self, obj: &K, reason: &str, note: String) {
        if let Some(events) = &self.events {
            events.normal(&obj.object_ref(&()), reason, note).await;
        }
    }

    async fn warning<K: Managed>(&self, obj: &K, reason: &str, note: String) {
        if let Some(events) = &self.events {
            events.warning(&obj.object_ref(&()), reason, note).await;
        }
    }
}

/// Reconcile one managed resource
pub async fn reconcile<K, C>(obj: Arc<K>, ctx: Arc<Context<C>>) -> Result<Action, Error>
where
    K: Managed,
    C: Connector<K>,
{
    let api: Api<K> = Api::all(ctx.client.clone());
    let name = obj.name_any();
    debug!(kind = %K::kind(&()), %name, "reconciling");
    let (api_ref, ctx_ref) = (&api, ctx.as_ref());
    let action = finalizer(&api, FINALIZER, obj, |event| async move {
        match event {
            FinalizerEvent::Apply(obj) => apply(api_ref, &obj, ctx_ref).await,
            FinalizerEvent::Cleanup(obj) => cleanup(api_ref, &obj, ctx_ref).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))?;
    ctx.backoff.reset(&name);
    Ok(action)
}

/// Requeue a failed reconciliation with per object exponential backoff
pub fn error_policy<K, C>(obj: Arc<K>, err: &Error, ctx: Arc<Context<C>>) -> Action
where
    K: Managed,
{
    let delay = ctx.backoff.next(&obj.name_any());
    warn!(kind = %K::kind(&()), name = %obj.name_any(), error = %err, ?delay, "reconcile failed");
    Action::requeue(delay)
}

async fn apply<K, C>(api: &Api<K>, obj: &K, ctx: &Context<C>) -> Result<Action, Error>
where
    K: Managed,
    C: Connector<K>,
{
    let mut status = StatusUpdate::new(obj);
    match converge(api, obj, ctx, &mut status).await {
        Ok(action) => {
            status.set(Condition::reconcile_success());
            status.patch(api, obj).await?;
            Ok(action)
        }
        Err(err) => {
            status.set(Condition::reconcile_error(&err));
            if let Err(patch_err) = status.patch(api, obj).await {
                warn!(name = %obj.name_any(), error = %patch_err, "cannot record failure in status");
            }
            ctx.warning(obj, "CannotReconcile", err.to_string()).await;
            Err(err)
        }
    }
}

async fn converge<K, C>(api: &Api<K>, obj: &K, ctx: &Context<C>, status: &mut StatusUpdate) -> Result<Action, Error>
where
    K: Managed,
    C: Connector<K>,
{
    let external = ctx
        .connector
        .connect(obj)
        .await
        .map_err(|e| Error::Connect(Box::new(e)))?;

    let observation = match external.observe(obj).await {
        Ok(observation) => observation,
        Err(err) => {
            if ExternalError::is_terminal(&err) {
                status.set(Condition::unavailable());
            }
            return Err(Error::Observe(Box::new(err)));
        }
    };
    status.observe(&observation)?;

    if !observation.resource_exists {
        let creation = external.create(obj).await.map_err(|e| Error::Create(Box::new(e)))?;
        if let Some(external_name) = &creation.external_name {
            set_external_name(api, obj, external_name).await?;
        }
        status.set(Condition::creating());
        info!(kind = %K::kind(&()), name = %obj.name_any(), "created external resource");
        ctx.normal(obj, "CreatedExternalResource", "Successfully requested creation of external resource".into())
            .await;
        publish_details(obj, ctx, &creation.connection_details).await?;
        return Ok(Action::requeue(ctx.config.poll_interval));
    }

    if !observation.resource_up_to_date {
        external.update(obj).await.map_err(|e| Error::Update(Box::new(e)))?;
        info!(kind = %K::kind(&()), name = %obj.name_any(), "updated external resource");
        ctx.normal(obj, "UpdatedExternalResource", "Successfully requested update of external resource".into())
            .await;
        return Ok(Action::requeue(ctx.config.poll_interval));
    }

    publish_details(obj, ctx, &observation.connection_details).await?;
    match observation.readiness {
        Some(Readiness::Available) => Ok(Action::requeue(ctx.config.sync_period)),
        _ => Ok(Action::requeue(ctx.config.poll_interval)),
    }
}

async fn cleanup<K, C>(api: &Api<K>, obj: &K, ctx: &Context<C>) -> Result<Action, Error>
where
    K: Managed,
    C: Connector<K>,
{
    if let Some(target) = obj.connection_secret() {
        if let Err(err) = connection::remove(&ctx.client, target, &obj.name_any()).await {
            warn!(name = %obj.name_any(), error = %err, "cannot delete connection secret");
        }
    }
    if obj.deletion_policy() == DeletionPolicy::Orphan {
        info!(kind = %K::kind(&()), name = %obj.name_any(), "orphaning external resource");
        return Ok(Action::await_change());
    }

    let mut status = StatusUpdate::new(obj);
    let result = async {
        let external = ctx
            .connector
            .connect(obj)
            .await
            .map_err(|e| Error::Connect(Box::new(e)))?;
        status.set(Condition::deleting());
        status.patch(api, obj).await?;
        external.delete(obj).await.map_err(|e| Error::Delete(Box::new(e)))
    }
    .await;

    match result {
        Ok(()) => {
            info!(kind = %K::kind(&()), name = %obj.name_any(), "deleted external resource");
            ctx.normal(obj, "DeletedExternalResource", "Successfully requested deletion of external resource".into())
                .await;
            Ok(Action::await_change())
        }
        Err(err) => {
            status.set(Condition::reconcile_error(&err));
            if let Err(patch_err) = status.patch(api, obj).await {
                warn!(name = %obj.name_any(), error = %patch_err, "cannot record failure in status");
            }
            ctx.warning(obj, "CannotDeleteExternalResource", err.to_string()).await;
            Err(err)
        }
    }
}

async fn set_external_name<K: Managed>(api: &Api<K>, obj: &K, external_name: &str) -> Result<(), Error> {
    if obj.annotations().get(EXTERNAL_NAME_ANNOTATION).map(String::as_str) == Some(external_name) {
        return Ok(());
    }
    let patch = json!({
        "metadata": {
            "annotations": { EXTERNAL_NAME_ANNOTATION: external_name }
        }
    });
    api.patch(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(Error::SetExternalName)?;
    Ok(())
}

async fn publish_details<K, C>(obj: &K, ctx: &Context<C>, details: &ConnectionDetails) -> Result<(), Error>
where
    K: Managed,
{
    let Some(target) = obj.connection_secret() else {
        return Ok(());
    };
    if details.is_empty() {
        return Ok(());
    }
    let created = connection::publish(&ctx.client, target, &obj.name_any(), details)
        .await
        .map_err(Error::PublishConnection)?;
    if created {
        ctx.normal(
            obj,
            "PublishedConnectionSecret",
            format!("Published connection details to {}", target.secret_name(&obj.name_any())),
        )
        .await;
    }
    Ok(())
}

/// Pending changes to the status of one object
///
/// Changes are merged over the status the object was read with; the status
/// subresource is only patched when the merge differs from it.
struct StatusUpdate {
    before: Map<String, Value>,
    conditions: Vec<Condition>,
    at_provider: Option<Value>,
    message: Option<String>,
    serialize_error: Option<serde_json::Error>,
}

impl StatusUpdate {
    fn new<K: Managed>(obj: &K) -> Self {
        let (before, serialize_error) = match serde_json::to_value(obj) {
            Ok(Value::Object(mut root)) => match root.remove("status") {
                Some(Value::Object(status)) => (status, None),
                _ => (Map::new(), None),
            },
            Ok(_) => (Map::new(), None),
            Err(err) => (Map::new(), Some(err)),
        };
        Self {
            before,
            conditions: obj.conditions().to_vec(),
            at_provider: None,
            message: None,
            serialize_error,
        }
    }

    fn set(&mut self, condition: Condition) {
        set_condition(&mut self.conditions, condition);
    }

    fn observe<O: serde::Serialize>(&mut self, observation: &ExternalObservation<O>) -> Result<(), Error> {
        if let Some(at_provider) = &observation.at_provider {
            self.at_provider = Some(serde_json::to_value(at_provider).map_err(Error::SerializeStatus)?);
        }
        if let Some(message) = &observation.message {
            self.message = Some(message.clone());
        }
        match observation.readiness {
            Some(Readiness::Creating) => self.set(Condition::creating()),
            Some(Readiness::Available) => self.set(Condition::available()),
            Some(Readiness::Deleting) => self.set(Condition::deleting()),
            Some(Readiness::Unavailable) => self.set(Condition::unavailable()),
            None => {}
        }
        Ok(())
    }

    /// The fields this update sets
    fn changes(&self) -> Result<Map<String, Value>, Error> {
        let mut changes = Map::new();
        changes.insert(
            "conditions".into(),
            serde_json::to_value(&self.conditions).map_err(Error::SerializeStatus)?,
        );
        if let Some(at_provider) = &self.at_provider {
            changes.insert("atProvider".into(), at_provider.clone());
        }
        if let Some(message) = &self.message {
            changes.insert("message".into(), Value::String(message.clone()));
        }
        Ok(changes)
    }

    /// Whether applying the changes would alter the status
    fn is_change(&self, changes: &Map<String, Value>) -> bool {
        changes.iter().any(|(k, v)| self.before.get(k) != Some(v))
    }

    async fn patch<K: Managed>(&mut self, api: &Api<K>, obj: &K) -> Result<bool, Error> {
        if let Some(err) = self.serialize_error.take() {
            return Err(Error::SerializeStatus(err));
        }
        let changes = self.changes()?;
        if !self.is_change(&changes) {
            return Ok(false);
        }
        let patch = json!({ "status": Value::Object(changes.clone()) });
        api.patch_status(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(Error::PatchStatus)?;
        self.before.extend(changes);
        Ok(true)
    }
}

#[cfg(test)]
mod tests;
