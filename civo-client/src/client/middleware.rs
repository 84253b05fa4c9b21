//! Middleware layers for the default client stack
use http::{header::AUTHORIZATION, HeaderValue, Request};
use tower::{filter::Predicate, BoxError, Layer, Service};

/// Predicate that rewrites relative request paths onto the API base url
///
/// Used through [`tower::filter::FilterLayer`]; a path that cannot be joined
/// fails the request instead of the process.
#[derive(Clone, Debug)]
pub struct BaseUri {
    base: http::Uri,
}

impl BaseUri {
    /// Join requests onto `base`, keeping any path prefix it has
    pub fn new(base: http::Uri) -> Self {
        Self { base }
    }
}

impl<B> Predicate<Request<B>> for BaseUri {
    type Request = Request<B>;

    fn check(&mut self, request: Request<B>) -> Result<Self::Request, BoxError> {
        let (mut parts, body) = request.into_parts();
        let pandq = parts.uri.path_and_query().map_or("/", |p| p.as_str());
        let prefix = self.base.path().trim_end_matches('/');
        let mut uri = self.base.clone().into_parts();
        uri.path_and_query = Some(format!("{prefix}{pandq}").parse()?);
        parts.uri = http::Uri::from_parts(uri)?;
        Ok(Request::from_parts(parts, body))
    }
}

#[derive(Clone)]
/// Layer that sets the bearer `Authorization` header on each request
pub struct AuthLayer {
    header: HeaderValue,
}

impl AuthLayer {
    /// Use a prepared header value, which should be marked sensitive
    pub fn new(header: HeaderValue) -> Self {
        Self { header }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = Auth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Auth {
            inner,
            header: self.header.clone(),
        }
    }
}

#[derive(Clone)]
/// Service that sets the bearer `Authorization` header on each request
pub struct Auth<S> {
    inner: S,
    header: HeaderValue,
}

impl<S, ReqBody> Service<Request<ReqBody>> for Auth<S>
where
    S: Service<Request<ReqBody>>,
{
    type Error = S::Error;
    type Future = S::Future;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        req.headers_mut().insert(AUTHORIZATION, self.header.clone());
        self.inner.call(req)
    }
}
