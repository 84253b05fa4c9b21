//! API helpers for structured interaction with the Civo API
use std::{fmt::Debug, marker::PhantomData};

use serde::Serialize;

use civo_core::{Created, ListResponse, Request, Resource};

use crate::{Client, Error, Result};

mod actions;

/// The generic Api abstraction
///
/// This abstracts over a [`Request`] and a type `K` so that
/// we get automatic serialization/deserialization on the api calls
/// implemented by the dynamic [`Resource`].
///
/// Every call is scoped to the region of the [`Client`].
#[derive(Clone)]
pub struct Api<K> {
    /// The request builder object with its resource dependent url
    pub(crate) request: Request,
    /// The client to use (from this library)
    pub(crate) client: Client,
    /// No `K` is ever held; `Empty<K>` keeps the api `Send` whatever `K` is.
    pub(crate) _phantom: std::iter::Empty<K>,
}

impl<K: Resource> Api<K> {
    /// Typed access to the `K` collection within the client's region
    pub fn new(client: Client) -> Self {
        let request = Request::new(K::URL_PATH).within(client.region());
        Self {
            request,
            client,
            _phantom: std::iter::empty(),
        }
    }

    /// The region this api is scoped to
    pub fn region(&self) -> &str {
        self.client.region()
    }

    /// Consume self and return the [`Client`]
    pub fn into_client(self) -> Client {
        self.into()
    }
}

impl<K> From<Api<K>> for Client {
    fn from(api: Api<K>) -> Self {
        api.client
    }
}

impl<K> Debug for Api<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Intentionally destructuring, to cause compile errors when new fields are added
        let Self {
            request,
            client: _,
            _phantom,
        } = self;
        f.debug_struct("Api")
            .field("request", &request)
            .field("client", &"...")
            .field("_phantom", &PhantomData::<K>)
            .finish()
    }
}

/// PUSH/PUT/POST/GET abstractions
impl<K> Api<K>
where
    K: Resource + Debug,
{
    /// Get a remote object by its identifier, failing if it does not exist
    pub async fn get(&self, id: &str) -> Result<K> {
        let req = self.request.get(id).map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// [Get](`Api::get`) a remote object if it exists, returns [`None`] if it doesn't exist
    ///
    /// Only not-found responses are normalized; server errors and transport
    /// failures are still returned as errors.
    ///
    /// ```no_run
    /// # use civo_client::Api;
    /// use civo_core::models::Volume;
    ///
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client: civo_client::Client = todo!();
    /// let volumes: Api<Volume> = Api::new(client);
    /// if let Some(volume) = volumes.get_opt("5f1b2d0c").await? {
    ///     // Volume was found
    /// } else {
    ///     // Volume was not found
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_opt(&self, id: &str) -> Result<Option<K>> {
        match self.get(id).await {
            Ok(obj) => Ok(Some(obj)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Get every object of this kind in the region, following pagination
    pub async fn list(&self) -> Result<Vec<K>> {
        let mut page = None;
        let mut items = Vec::new();
        loop {
            let req = self.request.list(page).map_err(Error::BuildRequest)?;
            let response = self.client.request::<ListResponse<K>>(req).await?;
            page = response.next_page();
            items.extend(response.into_items());
            if page.is_none() {
                return Ok(items);
            }
        }
    }

    /// Find a remote object whose identifier or name equals `name_or_id`
    ///
    /// An identifier match wins over name matches. Several objects with the
    /// same name are reported as [`Error::MultipleMatches`].
    pub async fn find(&self, name_or_id: &str) -> Result<Option<K>> {
        let items = self.list().await?;
        if let Some(obj) = items.iter().find(|o| o.id() == name_or_id) {
            return Ok(Some(obj.clone()));
        }
        let mut named = items.into_iter().filter(|o| o.name() == name_or_id).collect::<Vec<_>>();
        match named.len() {
            0 | 1 => Ok(named.pop()),
            count => Err(Error::MultipleMatches {
                kind: K::KIND,
                name: name_or_id.to_string(),
                count,
            }),
        }
    }

    /// Create a remote object
    ///
    /// The body is the kind specific creation config; only the new identifier
    /// is decoded from the response.
    pub async fn create<C: Serialize>(&self, data: &C) -> Result<Created> {
        let req = self.request.create(data).map_err(Error::BuildRequest)?;
        self.client.request::<Created>(req).await
    }

    /// Update the mutable fields of a remote object
    pub async fn update<C: Serialize>(&self, id: &str, data: &C) -> Result<()> {
        let req = self.request.update(id, data).map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }

    /// Delete a remote object
    pub async fn delete(&self, id: &str) -> Result<()> {
        let req = self.request.delete(id).map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }
}
