use crate::errors::MyError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The parts of a Google service-account JSON key the bot needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

type Cache = Arc<Mutex<Option<CachedToken>>>;

/// OAuth2 access tokens for a service account, via the JWT bearer grant.
#[derive(Clone)]
pub struct GoogleAuth {
    key: ServiceAccountKey,
    scope: &'static str,
    client: reqwest::Client,
    cache: Cache,
}

impl GoogleAuth {
    pub fn new(key: ServiceAccountKey, scope: &'static str, client: reqwest::Client) -> Self {
        Self {
            key,
            scope,
            client,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn access_token(&self) -> Result<String, MyError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.access_token.clone());
        }

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT.to_owned()),
                ("assertion", self.assertion()?),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        debug!(
            "Fetched access token for {}, valid for {}s",
            self.key.client_email, response.expires_in
        );

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cache = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }

    fn assertion(&self) -> Result<String, MyError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_uri_defaults_to_google() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn debug_output_hides_private_key() {
        let key = ServiceAccountKey {
            client_email: "a@b.iam.gserviceaccount.com".to_owned(),
            private_key: "super secret".to_owned(),
            token_uri: DEFAULT_TOKEN_URI.to_owned(),
        };
        let printed = format!("{:?}", key);
        assert!(printed.contains("a@b.iam.gserviceaccount.com"));
        assert!(!printed.contains("super secret"));
    }

    #[test]
    fn malformed_private_key_is_an_error() {
        let key = ServiceAccountKey {
            client_email: "a@b.iam.gserviceaccount.com".to_owned(),
            private_key: "not a pem".to_owned(),
            token_uri: DEFAULT_TOKEN_URI.to_owned(),
        };
        let auth = GoogleAuth::new(key, SPREADSHEETS_SCOPE, reqwest::Client::new());
        assert!(matches!(auth.assertion(), Err(MyError::Jwt(_))));
    }
}
