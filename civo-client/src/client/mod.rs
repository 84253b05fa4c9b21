//! A basic API client for interacting with the Civo API
//!
//! The [`Client`] uses standard error handling: any non-success status is
//! turned into [`Error::Api`] carrying the decoded [`ErrorResponse`].
//!
//! This client can be used on its own or in conjuction with the [`Api`][crate::api::Api]
//! type for more structured interaction with the remote resources.
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response, StatusCode};
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full};
use serde::de::DeserializeOwned;
use tower::{buffer::Buffer, util::BoxService, BoxError, Layer, Service, ServiceExt};
use tower_http::map_response_body::MapResponseBodyLayer;

use crate::{error::ErrorResponse, Config, Error, Result};

mod builder;
pub mod middleware;

pub use builder::{ClientBuilder, GenericService};

/// Response body of the type erased service stack
pub type Body = UnsyncBoxBody<Bytes, BoxError>;

/// Client for connecting with the Civo API.
///
/// The easiest way to instantiate the client is from a validated [`Config`]
/// using [`Client::try_from`].
#[derive(Clone)]
pub struct Client {
    // - `Buffer` for cheap clone
    // - `BoxFuture` for dynamic response future type
    inner: Buffer<Request<Full<Bytes>>, BoxFuture<'static, Result<Response<Body>, BoxError>>>,
    region: String,
}

impl Client {
    /// Create a [`Client`] using a custom `Service` stack.
    ///
    /// Requests arriving at the service have paths relative to the API root.
    /// Tests use this to plug in a `tower_test` mock.
    pub fn new<S, B, T>(service: S, region: T) -> Self
    where
        S: Service<Request<Full<Bytes>>, Response = Response<B>> + Send + 'static,
        S::Future: Send + 'static,
        S::Error: Into<BoxError>,
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
        T: Into<String>,
    {
        // Erase the response body and error types to avoid type parameters.
        let service = MapResponseBodyLayer::new(|b: B| b.map_err(Into::<BoxError>::into).boxed_unsync())
            .layer(service)
            .map_err(|e| e.into());
        Self {
            inner: Buffer::new(BoxService::new(service), 1024),
            region: region.into(),
        }
    }

    /// The region all requests of this client are scoped to
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Perform a raw HTTP request against the API and return the raw response back.
    pub async fn send(&self, request: Request<Full<Bytes>>) -> Result<Response<Body>> {
        let mut svc = self.inner.clone();
        let res = svc
            .ready()
            .await
            .map_err(Error::Service)?
            .call(request)
            .await
            .map_err(|err| {
                // Error decorating request
                err.downcast::<Error>()
                    .map(|e| *e)
                    // Error requesting
                    .or_else(|err| {
                        err.downcast::<hyper_util::client::legacy::Error>()
                            .map(|err| Error::HyperError(*err))
                    })
                    // Error from another middleware
                    .unwrap_or_else(Error::Service)
            })?;
        Ok(res)
    }

    /// Perform a raw HTTP request against the API and deserialize the response
    /// as JSON to some known type.
    pub async fn request<T>(&self, request: Request<Vec<u8>>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let text = self.request_text(request).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!("{}, {:?}", text, e);
            Error::SerdeError(e)
        })
    }

    /// Perform a raw HTTP request against the API and get back the response
    /// as a string
    pub async fn request_text(&self, request: Request<Vec<u8>>) -> Result<String> {
        let res = self.send(request.map(|body| Full::new(Bytes::from(body)))).await?;
        let status = res.status();
        let body_bytes = res.into_body().collect().await.map_err(Error::Service)?.to_bytes();
        let text = String::from_utf8(body_bytes.to_vec()).map_err(Error::FromUtf8)?;
        handle_api_errors(&text, status)?;

        Ok(text)
    }
}

/// Civo returned error handling
///
/// Either the API returns a JSON error body with a code and reason, or
/// something else (a proxy page, an empty body) that is wrapped verbatim.
fn handle_api_errors(text: &str, s: StatusCode) -> Result<()> {
    if s.is_client_error() || s.is_server_error() {
        if let Ok(mut errdata) = serde_json::from_str::<ErrorResponse>(text) {
            errdata.status = s.as_u16();
            tracing::debug!("Unsuccessful: {errdata:?}");
            Err(Error::Api(errdata))
        } else {
            tracing::warn!("Unsuccessful data error parse: {}", text);
            let error_response = ErrorResponse {
                status: s.as_u16(),
                code: s.canonical_reason().unwrap_or("unknown").to_ascii_lowercase().replace(' ', "_"),
                reason: text.to_string(),
                result: None,
            };
            tracing::debug!("Unsuccessful: {error_response:?} (reconstruct)");
            Err(Error::Api(error_response))
        }
    } else {
        Ok(())
    }
}

impl TryFrom<Config> for Client {
    type Error = Error;

    /// Builds a default [`Client`] from a [`Config`].
    ///
    /// See [`ClientBuilder`] or [`Client::new`] if more customization is required
    fn try_from(config: Config) -> Result<Self> {
        Ok(ClientBuilder::try_from(config)?.build())
    }
}

#[cfg(test)]
mod tests {
    use super::handle_api_errors;
    use crate::Error;
    use http::StatusCode;

    #[test]
    fn decodes_api_error_bodies() {
        let body = r#"{"code":"database_volume_not_found","reason":"Volume could not be found"}"#;
        match handle_api_errors(body, StatusCode::NOT_FOUND) {
            Err(Error::Api(err)) => {
                assert_eq!(err.status, 404);
                assert_eq!(err.code, "database_volume_not_found");
                assert!(err.is_not_found());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wraps_unparseable_bodies() {
        match handle_api_errors("<html>bad gateway</html>", StatusCode::BAD_GATEWAY) {
            Err(Error::Api(err)) => {
                assert_eq!(err.status, 502);
                assert_eq!(err.code, "bad_gateway");
                assert!(!err.is_not_found());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_passes_through() {
        assert!(handle_api_errors("{}", StatusCode::OK).is_ok());
    }
}
