use std::{sync::Arc, time::Duration};

use http::{Method, Request, Response};
use kube::{client::Body, CustomResource};
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::*;
use crate::{
    conditions::{get_condition, ConditionReason, ConditionStatus, ConditionType},
    managed::{ConnectionSecretTarget, ExternalCreation, ProviderConfigReference},
};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "test.civo.crossplane.io",
    version = "v1alpha1",
    kind = "Widget",
    status = "WidgetStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    size: u32,
    #[serde(default)]
    deletion_policy: DeletionPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connection_details: Option<ConnectionSecretTarget>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    at_provider: Option<Value>,
    #[serde(default)]
    conditions: Vec<Condition>,
}

impl Managed for Widget {
    fn provider_config_ref(&self) -> Option<&ProviderConfigReference> {
        None
    }

    fn deletion_policy(&self) -> DeletionPolicy {
        self.spec.deletion_policy
    }

    fn connection_secret(&self) -> Option<&ConnectionSecretTarget> {
        self.spec.connection_details.as_ref()
    }

    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
enum Boom {
    #[error("remote exploded")]
    Exploded,
    #[error("remote widget failed")]
    Failed,
}

impl ExternalError for Boom {
    fn is_terminal(&self) -> bool {
        matches!(self, Boom::Failed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Remote {
    Missing,
    Stale,
    Ready,
    Broken,
    Failed,
}

#[derive(Clone)]
struct FakeExternal {
    remote: Remote,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl ExternalClient<Widget> for FakeExternal {
    type Error = Boom;
    type Observation = Value;

    async fn observe(&self, _: &Widget) -> Result<ExternalObservation<Value>, Boom> {
        self.calls.lock().push("observe");
        match self.remote {
            Remote::Missing => Ok(ExternalObservation::absent()),
            Remote::Stale => Ok(ExternalObservation::present(json!({"id": "w-123"}))
                .up_to_date(false)
                .ready(Readiness::Available)),
            Remote::Ready => Ok(ExternalObservation::present(json!({"id": "w-123"}))
                .ready(Readiness::Available)
                .with_details(ConnectionDetails::from([(
                    "endpoint".to_string(),
                    b"w-123.example.com".to_vec(),
                )]))),
            Remote::Broken => Err(Boom::Exploded),
            Remote::Failed => Err(Boom::Failed),
        }
    }

    async fn create(&self, _: &Widget) -> Result<ExternalCreation, Boom> {
        self.calls.lock().push("create");
        Ok(ExternalCreation::named("w-123"))
    }

    async fn update(&self, _: &Widget) -> Result<(), Boom> {
        self.calls.lock().push("update");
        Ok(())
    }

    async fn delete(&self, _: &Widget) -> Result<(), Boom> {
        self.calls.lock().push("delete");
        Ok(())
    }
}

struct FakeConnector(FakeExternal);

impl Connector<Widget> for FakeConnector {
    type Error = Boom;
    type External = FakeExternal;

    async fn connect(&self, _: &Widget) -> Result<FakeExternal, Boom> {
        Ok(self.0.clone())
    }
}

type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;

const WIDGET_PATH: &str = "/apis/test.civo.crossplane.io/v1alpha1/widgets/w1";
const SECRETS_PATH: &str = "/api/v1/namespaces/crossplane-system/secrets";

fn widget(status: Option<Value>, deleting: bool, policy: &str) -> Widget {
    let mut obj = json!({
        "apiVersion": "test.civo.crossplane.io/v1alpha1",
        "kind": "Widget",
        "metadata": {
            "name": "w1",
            "finalizers": [FINALIZER],
        },
        "spec": { "size": 3, "deletionPolicy": policy },
    });
    if deleting {
        obj["metadata"]["deletionTimestamp"] = json!("2024-01-01T00:00:00Z");
    }
    if let Some(status) = status {
        obj["status"] = status;
    }
    serde_json::from_value(obj).unwrap()
}

fn with_connection_secret(mut obj: Widget) -> Widget {
    obj.spec.connection_details = Some(ConnectionSecretTarget {
        connection_secret_name_prefix: "widget-details".into(),
        connection_secret_namespace: "crossplane-system".into(),
    });
    obj
}

fn settled_status() -> Value {
    json!({
        "atProvider": {"id": "w-123"},
        "conditions": [
            {"type": "Ready", "status": "True", "reason": "Available", "lastTransitionTime": "2024-01-01T00:00:00Z"},
            {"type": "Synced", "status": "True", "reason": "ReconcileSuccess", "lastTransitionTime": "2024-01-01T00:00:00Z"},
        ]
    })
}

fn testcontext(remote: Remote) -> (Arc<Context<FakeConnector>>, Arc<Mutex<Vec<&'static str>>>, ApiServerHandle) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    let calls = Arc::new(Mutex::new(vec![]));
    let connector = FakeConnector(FakeExternal {
        remote,
        calls: calls.clone(),
    });
    let config = Config {
        poll_interval: Duration::from_secs(60),
        sync_period: Duration::from_secs(3600),
        concurrency: 1,
    };
    let ctx = Context::new(Client::new(mock_service, "default"), connector, config);
    (Arc::new(ctx), calls, handle)
}

fn respond_with(obj: &Widget) -> Response<Body> {
    Response::builder()
        .body(Body::from(serde_json::to_vec(obj).unwrap()))
        .unwrap()
}

fn api_failure(code: u16, reason: &str) -> Response<Body> {
    let body = json!({
        "kind": "Status", "apiVersion": "v1", "status": "Failure",
        "message": reason, "reason": reason, "code": code
    });
    Response::builder()
        .status(code)
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn json_body(request: Request<Body>) -> Value {
    let body = request.into_body().collect_bytes().await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn condition(status: &Value, type_: &str) -> Value {
    status["conditions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == type_)
        .cloned()
        .unwrap()
}

async fn timeout_after_1s<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(1), fut)
        .await
        .expect("timeout on mock apiserver")
}

#[tokio::test]
async fn absent_resource_is_created_and_named() {
    let (ctx, calls, mut handle) = testcontext(Remote::Missing);
    let obj = widget(None, false, "Delete");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("annotation patch not called");
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.uri().path(), WIDGET_PATH);
        let body = json_body(request).await;
        assert_eq!(body["metadata"]["annotations"][EXTERNAL_NAME_ANNOTATION], "w-123");
        send.send_response(respond_with(&echo));

        let (request, send) = handle.next_request().await.expect("status patch not called");
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.uri().path(), format!("{WIDGET_PATH}/status"));
        let body = json_body(request).await;
        let ready = condition(&body["status"], "Ready");
        assert_eq!(ready["status"], "False");
        assert_eq!(ready["reason"], "Creating");
        assert_eq!(condition(&body["status"], "Synced")["reason"], "ReconcileSuccess");
        send.send_response(respond_with(&echo));
    });

    let action = reconcile(Arc::new(obj), ctx).await.unwrap();
    assert_eq!(action, Action::requeue(Duration::from_secs(60)));
    assert_eq!(*calls.lock(), vec!["observe", "create"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn drifted_resource_is_updated() {
    let (ctx, calls, mut handle) = testcontext(Remote::Stale);
    let obj = widget(None, false, "Delete");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("status patch not called");
        assert_eq!(request.uri().path(), format!("{WIDGET_PATH}/status"));
        let body = json_body(request).await;
        assert_eq!(body["status"]["atProvider"], json!({"id": "w-123"}));
        assert_eq!(condition(&body["status"], "Ready")["reason"], "Available");
        send.send_response(respond_with(&echo));
    });

    let action = reconcile(Arc::new(obj), ctx).await.unwrap();
    assert_eq!(action, Action::requeue(Duration::from_secs(60)));
    assert_eq!(*calls.lock(), vec!["observe", "update"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn settled_resource_is_left_alone() {
    let (ctx, calls, _handle) = testcontext(Remote::Ready);
    let obj = widget(Some(settled_status()), false, "Delete");

    // no request reaches the apiserver, so this would hang on any patch
    let action = timeout_after_1s(reconcile(Arc::new(obj), ctx)).await.unwrap();
    assert_eq!(action, Action::requeue(Duration::from_secs(3600)));
    assert_eq!(*calls.lock(), vec!["observe"]);
}

#[tokio::test]
async fn terminal_failure_marks_resource_unavailable() {
    let (ctx, calls, mut handle) = testcontext(Remote::Failed);
    let obj = widget(None, false, "Delete");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("status patch not called");
        let body = json_body(request).await;
        let ready = condition(&body["status"], "Ready");
        assert_eq!(ready["reason"], "Unavailable");
        let synced = condition(&body["status"], "Synced");
        assert_eq!(synced["status"], "False");
        assert_eq!(synced["reason"], "ReconcileError");
        assert!(synced["message"].as_str().unwrap().contains("remote widget failed"));
        send.send_response(respond_with(&echo));
    });

    let err = reconcile(Arc::new(obj.clone()), ctx.clone()).await.unwrap_err();
    assert!(err.to_string().contains("cannot observe external resource"));
    assert_eq!(*calls.lock(), vec!["observe"]);
    timeout_after_1s(server).await.unwrap();

    assert_eq!(
        error_policy(Arc::new(obj.clone()), &err, ctx.clone()),
        Action::requeue(Duration::from_secs(1))
    );
    assert_eq!(
        error_policy(Arc::new(obj), &err, ctx),
        Action::requeue(Duration::from_secs(2))
    );
}

#[tokio::test]
async fn transient_failure_keeps_readiness() {
    let (ctx, calls, mut handle) = testcontext(Remote::Broken);
    let obj = widget(Some(settled_status()), false, "Delete");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("status patch not called");
        assert_eq!(request.uri().path(), format!("{WIDGET_PATH}/status"));
        let body = json_body(request).await;
        let ready = condition(&body["status"], "Ready");
        assert_eq!(ready["status"], "True");
        assert_eq!(ready["reason"], "Available");
        assert_eq!(ready["lastTransitionTime"], "2024-01-01T00:00:00Z");
        let synced = condition(&body["status"], "Synced");
        assert_eq!(synced["reason"], "ReconcileError");
        assert!(synced["message"].as_str().unwrap().contains("remote exploded"));
        send.send_response(respond_with(&echo));
    });

    let err = reconcile(Arc::new(obj), ctx).await.unwrap_err();
    assert!(err.to_string().contains("cannot observe external resource"));
    assert_eq!(*calls.lock(), vec!["observe"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn settled_resource_publishes_its_connection_secret_once() {
    let (ctx, calls, mut handle) = testcontext(Remote::Ready);
    let obj = with_connection_secret(widget(Some(settled_status()), false, "Delete"));
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("secret lookup not called");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), format!("{SECRETS_PATH}/widget-details-w1"));
        send.send_response(api_failure(404, "NotFound"));

        let (request, send) = handle.next_request().await.expect("secret create not called");
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().path(), SECRETS_PATH);
        let secret = json_body(request).await;
        assert_eq!(secret["metadata"]["name"], "widget-details-w1");
        // "w-123.example.com"
        assert_eq!(secret["data"]["endpoint"], "dy0xMjMuZXhhbXBsZS5jb20=");
        send.send_response(Response::builder().body(Body::from(serde_json::to_vec(&secret).unwrap())).unwrap());

        // second pass: the secret exists and is left alone
        let (request, send) = handle.next_request().await.expect("secret lookup not called");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), format!("{SECRETS_PATH}/widget-details-w1"));
        let existing = json!({
            "apiVersion": "v1", "kind": "Secret",
            "metadata": {"name": "widget-details-w1", "namespace": "crossplane-system"},
            "data": {"endpoint": "b2xk"}
        });
        send.send_response(Response::builder().body(Body::from(serde_json::to_vec(&existing).unwrap())).unwrap());
    });

    // any request beyond the scripted ones fails against the finished server
    let first = timeout_after_1s(reconcile(Arc::new(obj.clone()), ctx.clone())).await.unwrap();
    assert_eq!(first, Action::requeue(Duration::from_secs(3600)));
    let second = timeout_after_1s(reconcile(Arc::new(obj), ctx)).await.unwrap();
    assert_eq!(second, Action::requeue(Duration::from_secs(3600)));
    assert_eq!(*calls.lock(), vec!["observe", "observe"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn failed_secret_removal_does_not_block_deletion() {
    let (ctx, calls, mut handle) = testcontext(Remote::Ready);
    let obj = with_connection_secret(widget(None, true, "Delete"));
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("secret delete not called");
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.uri().path(), format!("{SECRETS_PATH}/widget-details-w1"));
        send.send_response(api_failure(500, "InternalError"));

        let (request, send) = handle.next_request().await.expect("status patch not called");
        assert_eq!(request.uri().path(), format!("{WIDGET_PATH}/status"));
        send.send_response(respond_with(&echo));

        let (request, send) = handle.next_request().await.expect("finalizer removal not called");
        assert_eq!(request.uri().path(), WIDGET_PATH);
        send.send_response(respond_with(&echo));
    });

    let action = reconcile(Arc::new(obj), ctx).await.unwrap();
    assert_eq!(action, Action::await_change());
    assert_eq!(*calls.lock(), vec!["delete"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn deletion_deletes_then_releases_finalizer() {
    let (ctx, calls, mut handle) = testcontext(Remote::Ready);
    let obj = widget(None, true, "Delete");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("status patch not called");
        assert_eq!(request.uri().path(), format!("{WIDGET_PATH}/status"));
        let body = json_body(request).await;
        assert_eq!(condition(&body["status"], "Ready")["reason"], "Deleting");
        send.send_response(respond_with(&echo));

        let (request, send) = handle.next_request().await.expect("finalizer removal not called");
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.uri().path(), WIDGET_PATH);
        let body = json_body(request).await;
        assert_eq!(body[1], json!({"op": "remove", "path": "/metadata/finalizers/0"}));
        send.send_response(respond_with(&echo));
    });

    let action = reconcile(Arc::new(obj), ctx).await.unwrap();
    assert_eq!(action, Action::await_change());
    assert_eq!(*calls.lock(), vec!["delete"]);
    timeout_after_1s(server).await.unwrap();
}

#[tokio::test]
async fn orphaned_resource_is_not_deleted() {
    let (ctx, calls, mut handle) = testcontext(Remote::Ready);
    let obj = widget(None, true, "Orphan");
    let echo = obj.clone();
    let server = tokio::spawn(async move {
        let (request, send) = handle.next_request().await.expect("finalizer removal not called");
        assert_eq!(request.uri().path(), WIDGET_PATH);
        send.send_response(respond_with(&echo));
    });

    let action = reconcile(Arc::new(obj), ctx).await.unwrap();
    assert_eq!(action, Action::await_change());
    assert!(calls.lock().is_empty());
    timeout_after_1s(server).await.unwrap();
}

#[test]
fn status_update_keeps_transition_times() {
    let status = json!({
        "conditions": [
            {"type": "Ready", "status": "True", "reason": "Available", "lastTransitionTime": "2024-01-01T00:00:00Z"},
        ]
    });
    let obj = widget(Some(status), false, "Delete");
    let mut update = StatusUpdate::new(&obj);
    update.set(Condition::available());
    update.set(Condition::reconcile_success());
    let ready = get_condition(&update.conditions, ConditionType::Ready).unwrap();
    assert_eq!(ready.reason, ConditionReason::Available);
    assert_eq!(ready.status, ConditionStatus::True);
    assert_eq!(ready.last_transition_time.0.timestamp(), 1_704_067_200);
    let changes = update.changes().unwrap();
    assert!(update.is_change(&changes));
}
