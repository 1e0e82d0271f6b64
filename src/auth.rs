//! Credential provider
//!
//! Attaches credential material to outgoing requests. The token is supplied
//! once at startup from configuration; there is no refresh or rotation and
//! the token is assumed valid for the duration of the run.

use reqwest::RequestBuilder;

/// Credentials applied to every outgoing request
#[derive(Clone, Default)]
pub enum Credentials {
    /// No authentication (tests, local mocks)
    #[default]
    None,

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },
}

impl Credentials {
    /// Create bearer credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Apply credentials to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => req,
            Self::Bearer { token } => req.bearer_auth(token),
        }
    }
}

// Token is a secret; keep it out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Credentials::None"),
            Self::Bearer { .. } => write!(f, "Credentials::Bearer {{ token: <redacted> }}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn test_bearer_sets_authorization_header() {
        let creds = Credentials::bearer("dbt_abc123");
        let client = Client::new();
        let req = creds
            .apply(client.get("http://localhost/accounts/1"))
            .build()
            .unwrap();

        let header = req.headers().get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer dbt_abc123");
    }

    #[test]
    fn test_none_leaves_request_untouched() {
        let creds = Credentials::None;
        let client = Client::new();
        let req = creds
            .apply(client.get("http://localhost/accounts/1"))
            .build()
            .unwrap();

        assert!(req.headers().get("authorization").is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::bearer("super-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
    }
}
