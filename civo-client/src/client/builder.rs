use bytes::Bytes;
use http::{header::HeaderMap, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_timeout::TimeoutConnector;
use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};
use std::time::Duration;
use tower::{filter::FilterLayer, util::BoxService, BoxError, Layer, Service, ServiceBuilder};
use tower_http::{
    classify::ServerErrorsFailureClass, map_response_body::MapResponseBodyLayer, trace::TraceLayer,
};
use tracing::Span;

use super::{
    middleware::{AuthLayer, BaseUri},
    Body,
};
use crate::{Client, Config, Error, Result};

/// Builder for [`Client`] instances with customized [tower](`Service`) middleware.
pub struct ClientBuilder<Svc> {
    service: Svc,
    region: String,
}

impl<Svc> ClientBuilder<Svc> {
    /// Construct a [`ClientBuilder`] from scratch with a fully custom [`Service`] stack.
    ///
    /// This method is only intended for advanced use cases, most users will want to use [`ClientBuilder::try_from`] instead,
    /// which provides a default stack as a starting point.
    pub fn new(service: Svc, region: impl Into<String>) -> Self
    where
        Svc: Service<Request<Full<Bytes>>>,
    {
        Self {
            service,
            region: region.into(),
        }
    }

    /// Add a [`Layer`] to the current [`Service`] stack.
    pub fn with_layer<L: Layer<Svc>>(self, layer: &L) -> ClientBuilder<L::Service> {
        let Self { service: stack, region } = self;
        ClientBuilder {
            service: layer.layer(stack),
            region,
        }
    }

    /// Build a [`Client`] instance with the current [`Service`] stack.
    pub fn build<B>(self) -> Client
    where
        Svc: Service<Request<Full<Bytes>>, Response = Response<B>> + Send + 'static,
        Svc::Future: Send + 'static,
        Svc::Error: Into<BoxError>,
        B: http_body::Body<Data = bytes::Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Client::new(self.service, self.region)
    }
}

/// The type erased default service stack
pub type GenericService = BoxService<Request<Full<Bytes>>, Response<Body>, BoxError>;

impl TryFrom<Config> for ClientBuilder<GenericService> {
    type Error = Error;

    /// Builds a default [`ClientBuilder`] stack from a given configuration
    fn try_from(config: Config) -> Result<Self> {
        let auth = config.bearer().map_err(Error::Config)?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_native_roots(rustls::crypto::ring::default_provider())
            .map_err(Error::Tls)?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let mut connector = TimeoutConnector::new(https);
        connector.set_connect_timeout(config.connect_timeout);
        connector.set_read_timeout(config.read_timeout);
        connector.set_write_timeout(config.write_timeout);

        let client: hyper_util::client::legacy::Client<_, Full<Bytes>> =
            hyper_util::client::legacy::Builder::new(TokioExecutor::new()).build(connector);

        let service = ServiceBuilder::new()
            .layer(FilterLayer::new(BaseUri::new(config.api_url.clone())))
            .layer(AuthLayer::new(auth))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|req: &Request<Full<Bytes>>| {
                        tracing::debug_span!(
                            "civo",
                            civo.method = %req.method(),
                            civo.url = %req.uri(),
                            civo.status_code = tracing::field::Empty,
                        )
                    })
                    .on_request(|_req: &Request<Full<Bytes>>, _span: &Span| {
                        tracing::debug!("requesting");
                    })
                    .on_response(|res: &Response<Incoming>, _latency: Duration, span: &Span| {
                        span.record("civo.status_code", res.status().as_u16());
                    })
                    // Explicitly disable `on_body_chunk`. The default does nothing.
                    .on_body_chunk(())
                    .on_eos(|_: Option<&HeaderMap>, _duration: Duration, _span: &Span| {
                        tracing::debug!("stream closed");
                    })
                    .on_failure(|ec: ServerErrorsFailureClass, _latency: Duration, span: &Span| {
                        match ec {
                            ServerErrorsFailureClass::StatusCode(status) => {
                                span.record("civo.status_code", status.as_u16());
                                tracing::error!("failed with status {}", status)
                            }
                            ServerErrorsFailureClass::Error(err) => {
                                tracing::error!("failed with error {}", err)
                            }
                        }
                    }),
            )
            .map_err(BoxError::from)
            .service(client);

        Ok(ClientBuilder::new(
            BoxService::new(
                MapResponseBodyLayer::new(|body| {
                    BodyExt::boxed_unsync(BodyExt::map_err(body, BoxError::from))
                })
                .layer(service),
            ),
            config.region,
        ))
    }
}
