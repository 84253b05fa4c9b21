//! The error body returned by the Civo API
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error response from the API.
///
/// The API answers failures with a machine readable `code` such as
/// `database_kubernetes_cluster_not_found` and a human `reason`.
/// The HTTP status is not part of the body and is filled in by the client.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{code}: {reason} ({status})")]
pub struct ErrorResponse {
    /// The HTTP status code of the response
    #[serde(default)]
    pub status: u16,
    /// The machine readable error code
    #[serde(default)]
    pub code: String,
    /// A message about the error
    #[serde(default)]
    pub reason: String,
    /// Additional result text some endpoints return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ErrorResponse {
    /// Whether the response means the addressed resource does not exist
    ///
    /// Only client errors qualify; a server error never means absence.
    pub fn is_not_found(&self) -> bool {
        if !(400..500).contains(&self.status) {
            return false;
        }
        self.status == 404 || self.code.ends_with("_not_found") || self.code == "not_found"
    }
}

#[cfg(test)]
mod test {
    use super::ErrorResponse;

    fn response(status: u16, code: &str) -> ErrorResponse {
        ErrorResponse {
            status,
            code: code.into(),
            reason: String::new(),
            result: None,
        }
    }

    #[test]
    fn not_found_signatures() {
        assert!(response(404, "").is_not_found());
        assert!(response(400, "database_kubernetes_cluster_not_found").is_not_found());
        assert!(response(403, "database_instance_not_found").is_not_found());
        assert!(!response(400, "parameter_size_invalid").is_not_found());
    }

    #[test]
    fn server_errors_are_never_absence() {
        assert!(!response(500, "database_kubernetes_cluster_not_found").is_not_found());
        assert!(!response(503, "").is_not_found());
    }

    #[test]
    fn deserializes_without_status() {
        let body = r#"{"code":"database_network_not_found","reason":"The network could not be found"}"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.status, 0);
        assert_eq!(err.code, "database_network_not_found");
        assert_eq!(err.result, None);
    }
}
