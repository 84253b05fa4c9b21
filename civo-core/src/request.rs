//! Request builder type for arbitrary Civo API resources
use serde::Serialize;

use crate::{Error, Result};

/// A Civo API request builder
///
/// Takes a base path and supplies constructors for the REST operations of
/// the v2 API. All constructors return `http::Request` objects with paths
/// relative to the API root; the client prefixes the configured base url.
///
/// Reads and deletes address the region through the `region` query parameter.
/// Writes carry the region in their body, which is the caller's concern.
#[derive(Debug, Clone)]
pub struct Request {
    /// The path component of a url
    pub url_path: String,
    /// The region requests are scoped to
    pub region: Option<String>,
}

impl Request {
    /// New request with a resource's url path
    pub fn new<S: Into<String>>(url_path: S) -> Self {
        Self {
            url_path: url_path.into(),
            region: None,
        }
    }

    /// Scope all requests built from this builder to a region
    #[must_use]
    pub fn within(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    fn target(&self, segments: &[&str], extra: &[(&str, String)]) -> Result<String> {
        let mut path = self.url_path.clone();
        for segment in segments {
            if segment.is_empty() || segment.contains(['/', '?', '#']) {
                return Err(Error::InvalidPathSegment((*segment).to_string()));
            }
            path.push('/');
            path.push_str(segment);
        }
        let mut qp = form_urlencoded::Serializer::new(String::new());
        for (key, value) in extra {
            qp.append_pair(key, value);
        }
        if let Some(region) = &self.region {
            qp.append_pair("region", region);
        }
        let query = qp.finish();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        Ok(path)
    }
}

fn json_body<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(Error::SerializeBody)
}

fn with_json(builder: http::request::Builder, body: Vec<u8>) -> Result<http::Request<Vec<u8>>> {
    builder
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .map_err(Error::BuildRequest)
}

// -------------------------------------------------------

/// Convenience methods found from API conventions
impl Request {
    /// List a collection of a resource
    ///
    /// Paginated collections take a 1-indexed `page`.
    pub fn list(&self, page: Option<u32>) -> Result<http::Request<Vec<u8>>> {
        let extra = page.map(|p| vec![("page", p.to_string())]).unwrap_or_default();
        let urlstr = self.target(&[], &extra)?;
        http::Request::get(urlstr).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Get a single instance
    pub fn get(&self, id: &str) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id], &[])?;
        http::Request::get(urlstr).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Create an instance of a resource
    pub fn create<T: Serialize>(&self, data: &T) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[], &[])?;
        with_json(http::Request::post(urlstr), json_body(data)?)
    }

    /// Replace the mutable fields of an instance
    ///
    /// The API treats absent fields as unchanged.
    pub fn update<T: Serialize>(&self, id: &str, data: &T) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id], &[])?;
        with_json(http::Request::put(urlstr), json_body(data)?)
    }

    /// Delete an instance of a resource
    pub fn delete(&self, id: &str) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id], &[])?;
        http::Request::delete(urlstr).body(vec![]).map_err(Error::BuildRequest)
    }
}

/// Sub-resource and action requests
impl Request {
    /// Call a named action on an instance, e.g. `PUT /v2/volumes/{id}/resize`
    pub fn action<T: Serialize>(
        &self,
        method: http::Method,
        id: &str,
        action: &str,
        data: &T,
    ) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id, action], &[])?;
        with_json(http::Request::builder().method(method).uri(urlstr), json_body(data)?)
    }

    /// List a nested collection, e.g. `GET /v2/firewalls/{id}/rules`
    pub fn list_nested(&self, id: &str, collection: &str) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id, collection], &[])?;
        http::Request::get(urlstr).body(vec![]).map_err(Error::BuildRequest)
    }

    /// Delete a member of a nested collection, e.g. `DELETE /v2/firewalls/{id}/rules/{rule}`
    pub fn delete_nested(&self, id: &str, collection: &str, member: &str) -> Result<http::Request<Vec<u8>>> {
        let urlstr = self.target(&[id, collection, member], &[])?;
        http::Request::delete(urlstr).body(vec![]).map_err(Error::BuildRequest)
    }
}

#[cfg(test)]
mod test {
    use super::Request;
    use assert_json_diff::assert_json_eq;
    use http::Method;
    use serde_json::json;

    #[test]
    fn list_path_has_region_and_page() {
        let req = Request::new("/v2/instances").within("LON1").list(Some(2)).unwrap();
        assert_eq!(req.uri(), "/v2/instances?page=2&region=LON1");
        assert_eq!(req.method(), Method::GET);
    }

    #[test]
    fn unscoped_paths_carry_no_query() {
        let req = Request::new("/v2/sshkeys").get("abc").unwrap();
        assert_eq!(req.uri(), "/v2/sshkeys/abc");
    }

    #[test]
    fn create_is_json_post() {
        let req = Request::new("/v2/networks")
            .within("NYC1")
            .create(&json!({"label": "lab", "region": "NYC1"}))
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri(), "/v2/networks?region=NYC1");
        assert_eq!(req.headers()[http::header::CONTENT_TYPE], "application/json");
        let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap();
        assert_json_eq!(body, json!({"label": "lab", "region": "NYC1"}));
    }

    #[test]
    fn update_and_delete_address_the_id() {
        let builder = Request::new("/v2/kubernetes/clusters").within("LON1");
        let req = builder.update("c-1", &json!({"region": "LON1"})).unwrap();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(req.uri(), "/v2/kubernetes/clusters/c-1?region=LON1");
        let req = builder.delete("c-1").unwrap();
        assert_eq!(req.method(), Method::DELETE);
        assert_eq!(req.uri(), "/v2/kubernetes/clusters/c-1?region=LON1");
    }

    #[test]
    fn actions_and_nested_collections() {
        let builder = Request::new("/v2/firewalls");
        let req = builder.list_nested("fw", "rules").unwrap();
        assert_eq!(req.uri(), "/v2/firewalls/fw/rules");
        let req = builder.delete_nested("fw", "rules", "r1").unwrap();
        assert_eq!(req.uri(), "/v2/firewalls/fw/rules/r1");
        let req = Request::new("/v2/volumes")
            .action(Method::PUT, "v1", "resize", &json!({"size_gb": 20}))
            .unwrap();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(req.uri(), "/v2/volumes/v1/resize");
    }

    #[test]
    fn rejects_ids_that_escape_the_path() {
        let builder = Request::new("/v2/volumes");
        assert!(builder.get("").is_err());
        assert!(builder.get("a/b").is_err());
        assert!(builder.delete("x?region=other").is_err());
    }
}
