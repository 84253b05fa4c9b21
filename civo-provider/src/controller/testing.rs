// Mock Civo API shared by the strategy tests
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::Value;

use crate::connector::{CivoConnector, Defaults};

type CivoHandle = tower_test::mock::Handle<Request<Full<Bytes>>, Response<Full<Bytes>>>;
type KubeHandle = tower_test::mock::Handle<Request<kube::client::Body>, Response<kube::client::Body>>;

pub(crate) const REGION: &str = "LON1";

/// A fake Civo API answering one expected request at a time
pub(crate) struct CivoServer(CivoHandle);

pub(crate) fn civo_client() -> (civo_client::Client, CivoServer) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Full<Bytes>>, Response<Full<Bytes>>>();
    (civo_client::Client::new(mock_service, REGION), CivoServer(handle))
}

/// A connector over a fake Kubernetes API
pub(crate) fn connector() -> (CivoConnector, KubeServer) {
    let (mock_service, handle) =
        tower_test::mock::pair::<Request<kube::client::Body>, Response<kube::client::Body>>();
    let connector = CivoConnector::new(kube::Client::new(mock_service, "default"), Defaults::default());
    (connector, KubeServer(handle))
}

impl CivoServer {
    /// Expect `method uri`, answer with `status` and `body`, and return the request body
    pub(crate) async fn expect(&mut self, method: Method, uri: &str, status: StatusCode, body: Value) -> Value {
        let (request, send) = self
            .0
            .next_request()
            .await
            .unwrap_or_else(|| panic!("{method} {uri} not called"));
        assert_eq!(request.method(), method, "{uri}");
        assert_eq!(request.uri(), uri);
        let bytes = request.into_body().collect().await.unwrap().to_bytes();
        send.send_response(
            Response::builder()
                .status(status)
                .body(Full::new(Bytes::from(serde_json::to_vec(&body).unwrap())))
                .unwrap(),
        );
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    pub(crate) async fn ok(&mut self, method: Method, uri: &str, body: Value) -> Value {
        self.expect(method, uri, StatusCode::OK, body).await
    }

    pub(crate) async fn not_found(&mut self, uri: &str) {
        self.expect(
            Method::GET,
            uri,
            StatusCode::NOT_FOUND,
            serde_json::json!({"code": "database_not_found", "reason": "not found"}),
        )
        .await;
    }
}

/// A fake Kubernetes API answering one expected request at a time
pub(crate) struct KubeServer(KubeHandle);

impl KubeServer {
    pub(crate) async fn get(&mut self, path: &str, body: Value) {
        let (request, send) = self
            .0
            .next_request()
            .await
            .unwrap_or_else(|| panic!("GET {path} not called"));
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), path);
        send.send_response(
            Response::builder()
                .body(kube::client::Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        );
    }
}

pub(crate) async fn timeout_after_1s(handle: tokio::task::JoinHandle<()>) {
    tokio::time::timeout(std::time::Duration::from_secs(1), handle)
        .await
        .expect("timeout on mock api")
        .expect("scenario succeeded")
}
