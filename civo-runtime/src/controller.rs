//! Running a managed resource controller
use std::sync::Arc;

use futures::StreamExt;
use kube::{
    runtime::{controller, watcher, Controller},
    Api, Client,
};
use tracing::{debug, info, warn};

use crate::{
    events::EventPublisher,
    managed::{Connector, Managed},
    reconciler::{error_policy, reconcile, Config, Context},
};

/// Reconcile every object of kind `K` until a termination signal arrives
///
/// All objects of the kind are watched cluster wide. Each one is requeued on
/// its own schedule: the poll interval while converging, the sync period once
/// available, and exponential backoff after failures.
pub async fn run<K, C>(client: Client, connector: C, config: Config, events: Option<EventPublisher>)
where
    K: Managed,
    C: Connector<K>,
{
    let api: Api<K> = Api::all(client.clone());
    let concurrency = config.concurrency;
    let mut ctx = Context::new(client, connector, config);
    if let Some(events) = events {
        ctx = ctx.with_events(events);
    }
    info!(kind = %K::kind(&()), concurrency, "starting controller");
    Controller::new(api, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(reconcile::<K, C>, error_policy::<K, C>, Arc::new(ctx))
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(object = %obj, "reconciled"),
                Err(err) => warn!(error = %err, "reconcile failed"),
            }
        })
        .await;
    info!(kind = %K::kind(&()), "controller shut down");
}
