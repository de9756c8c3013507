use super::RequestView;
use http::header::USER_AGENT;
use serde::{Deserialize, Serialize};

/// Fields reported by the `/ip` endpoint
///
/// Field declaration order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicDetails {
    pub ip: String,
    pub user_agent: Option<String>,
    pub method: String,
    pub url: String,
}

/// Fields reported by the `/details` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDetails {
    pub ip: String,
    pub user_agent: Option<String>,
    pub headers: Vec<String>,
}

/// Per-request field set, one variant per endpoint
///
/// Serializes as the bare object of the wrapped variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestDetails {
    Basic(BasicDetails),
    Extended(ExtendedDetails),
}

impl From<BasicDetails> for RequestDetails {
    fn from(details: BasicDetails) -> Self {
        RequestDetails::Basic(details)
    }
}

impl From<ExtendedDetails> for RequestDetails {
    fn from(details: ExtendedDetails) -> Self {
        RequestDetails::Extended(details)
    }
}

/// Collects ip, User-Agent, method and URL
pub fn basic_details<R: RequestView>(request: &R) -> BasicDetails {
    BasicDetails {
        ip: request.remote_address(),
        user_agent: request.header(USER_AGENT.as_str()).map(str::to_owned),
        method: request.method().to_owned(),
        url: request.request_url(),
    }
}

/// Collects ip, User-Agent and every header name in receipt order
///
/// A header sent more than once is listed once per occurrence.
pub fn extended_details<R: RequestView>(request: &R) -> ExtendedDetails {
    ExtendedDetails {
        ip: request.remote_address(),
        user_agent: request.header(USER_AGENT.as_str()).map(str::to_owned),
        headers: request.header_names().map(str::to_owned).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRequest {
        remote: &'static str,
        user_agent: Option<&'static str>,
        method: &'static str,
        url: &'static str,
        header_names: Vec<String>,
    }

    impl FakeRequest {
        fn new(remote: &'static str, user_agent: Option<&'static str>) -> Self {
            Self {
                remote,
                user_agent,
                method: "GET",
                url: "http://localhost:8080/api/ip",
                header_names: Vec::new(),
            }
        }
    }

    impl RequestView for FakeRequest {
        fn remote_address(&self) -> String {
            self.remote.to_string()
        }

        fn header(&self, name: &str) -> Option<&str> {
            if name.eq_ignore_ascii_case("user-agent") {
                self.user_agent
            } else {
                None
            }
        }

        fn method(&self) -> &str {
            self.method
        }

        fn request_url(&self) -> String {
            self.url.to_string()
        }

        fn header_names(&self) -> impl Iterator<Item = &str> {
            self.header_names.iter().map(String::as_str)
        }
    }

    #[test]
    fn test_basic_details_copies_request_fields() {
        let request = FakeRequest::new("127.0.0.1", Some("TestAgent"));

        let details = basic_details(&request);

        assert_eq!(
            details,
            BasicDetails {
                ip: "127.0.0.1".to_string(),
                user_agent: Some("TestAgent".to_string()),
                method: "GET".to_string(),
                url: "http://localhost:8080/api/ip".to_string(),
            }
        );
    }

    #[test]
    fn test_basic_details_without_user_agent() {
        let request = FakeRequest::new("10.0.0.7", None);

        let details = basic_details(&request);

        assert_eq!(details.ip, "10.0.0.7");
        assert_eq!(details.user_agent, None);
    }

    #[test]
    fn test_extended_details_keeps_header_order() {
        let mut request = FakeRequest::new("192.168.1.1", Some("Mozilla/5.0"));
        request.header_names = vec!["Content-Type".to_string(), "Accept".to_string()];

        let details = extended_details(&request);

        assert_eq!(details.ip, "192.168.1.1");
        assert_eq!(details.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(details.headers, vec!["Content-Type", "Accept"]);
    }

    #[test]
    fn test_extended_details_with_no_headers() {
        let request = FakeRequest::new("127.0.0.1", Some("SomeUserAgent"));

        let details = extended_details(&request);

        assert!(details.headers.is_empty());
    }

    #[test]
    fn test_extended_details_lists_repeated_headers() {
        let mut request = FakeRequest::new("127.0.0.1", None);
        request.header_names = ["Accept", "Cookie", "Cookie"].map(String::from).to_vec();

        let details = extended_details(&request);

        assert_eq!(details.headers, vec!["Accept", "Cookie", "Cookie"]);
    }

    #[test]
    fn test_request_details_serializes_untagged() {
        let details: RequestDetails = ExtendedDetails {
            ip: "127.0.0.1".to_string(),
            user_agent: None,
            headers: vec![],
        }
        .into();

        let json = serde_json::to_string(&details).unwrap();
        assert_eq!(json, r#"{"ip":"127.0.0.1","userAgent":null,"headers":[]}"#);
    }
}
