use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::api::{self, ApiError};
use super::keyring;

/// The signed-in identity as reported by the auth service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// A resolved session plus the bearer token that backs it.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session: Session,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    #[serde(flatten)]
    session: Session,
    token: String,
}

/// Auth flows against the remote session provider. A successful sign-in
/// stores the token in the system keyring so the session survives restarts;
/// `resume` turns the stored token back into an identity.
pub struct SessionProvider {
    base_url: String,
    http: Client,
}

impl SessionProvider {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Credential sign-in. Bad credentials come back as `Unauthorized`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Authenticated, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::validation("email", "an email address is required"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password", "a password is required"));
        }

        let resp = self
            .http
            .post(self.url("auth/signin"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let signed_in: SignInResponse = api::check(resp).await?.json().await?;
        self.remember(&signed_in.token).await;
        log::info!("Signed in as {}", signed_in.session.email);
        Ok(Authenticated {
            session: signed_in.session,
            token: signed_in.token,
        })
    }

    /// Federated sign-in: exchange an OAuth provider's access token for a
    /// session of our own.
    pub async fn sign_in_with_provider(
        &self,
        provider: &str,
        access_token: &str,
    ) -> Result<Authenticated, ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("auth/callback/{}", provider)))
            .json(&serde_json::json!({ "accessToken": access_token }))
            .send()
            .await?;
        let signed_in: SignInResponse = api::check(resp).await?.json().await?;
        self.remember(&signed_in.token).await;
        log::info!(
            "Signed in as {} via {}",
            signed_in.session.email,
            provider
        );
        Ok(Authenticated {
            session: signed_in.session,
            token: signed_in.token,
        })
    }

    /// Resolve the keyring-stored token to a session. A missing or stale
    /// token is "no session", not an error; callers redirect to sign-in.
    pub async fn resume(&self) -> Result<Option<Authenticated>, ApiError> {
        let token = match keyring::load_token().await {
            Ok(Some(t)) => t,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::warn!("Keyring unavailable: {}", e);
                return Ok(None);
            }
        };

        let resp = self
            .http
            .get(self.url("auth/session"))
            .bearer_auth(&token)
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            // Stale token: forget it so the next run doesn't retry it.
            if let Err(e) = keyring::delete_token().await {
                log::warn!("Failed to drop stale token: {}", e);
            }
            return Ok(None);
        }
        let session: Session = api::check(resp).await?.json().await?;
        Ok(Some(Authenticated { session, token }))
    }

    /// End the session on the server and forget the stored token. Best
    /// effort on both sides.
    pub async fn sign_out(&self, token: &str) {
        if let Err(e) = self
            .http
            .post(self.url("auth/signout"))
            .bearer_auth(token)
            .send()
            .await
        {
            log::warn!("Sign-out request failed: {}", e);
        }
        if let Err(e) = keyring::delete_token().await {
            log::warn!("Failed to delete session token: {}", e);
        }
    }

    async fn remember(&self, token: &str) {
        if let Err(e) = keyring::store_token(token).await {
            log::warn!("Session will not persist: {}", e);
        }
    }
}
