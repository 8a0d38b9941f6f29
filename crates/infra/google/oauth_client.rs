use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::error;
use url::Url;

use crate::domain::value_objects::users::OAuthProfile;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

pub const PROVIDER_GOOGLE: &str = "google";

pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Consent screen URL; `state` comes back untouched on the callback.
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuthProfile> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("google token exchange request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, response_body = %body, "oauth: google token exchange failed");
            anyhow::bail!("Google token exchange failed (status {})", status);
        }
        let token: TokenResponse = resp.json().await?;

        let resp = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("google userinfo request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Google userinfo failed (status {})", resp.status());
        }
        let info: GoogleUserInfo = resp.json().await?;

        profile_from_userinfo(info)
    }
}

fn profile_from_userinfo(info: GoogleUserInfo) -> Result<OAuthProfile> {
    let email = info
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("google account has no email"))?;
    if info.email_verified == Some(false) {
        anyhow::bail!("google account email is not verified");
    }

    let full_name = info
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(OAuthProfile {
        provider: PROVIDER_GOOGLE.to_string(),
        subject: info.sub,
        email: email.trim().to_lowercase(),
        full_name,
        avatar_url: info.picture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/callback".to_string(),
        )
    }

    #[test]
    fn authorization_url_carries_state_and_redirect() {
        let url = client().authorization_url("owner").unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(params.contains(&("state".to_string(), "owner".to_string())));
        assert!(params.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/callback".to_string()
        )));
    }

    #[test]
    fn profile_falls_back_to_email_local_part() {
        let profile = profile_from_userinfo(GoogleUserInfo {
            sub: "123".to_string(),
            email: Some("Ana@Example.com".to_string()),
            email_verified: Some(true),
            name: None,
            picture: None,
        })
        .unwrap();

        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(profile.full_name, "Ana");
        assert_eq!(profile.provider, PROVIDER_GOOGLE);
    }

    #[test]
    fn unverified_email_is_refused() {
        let result = profile_from_userinfo(GoogleUserInfo {
            sub: "123".to_string(),
            email: Some("ana@example.com".to_string()),
            email_verified: Some(false),
            name: Some("Ana".to_string()),
            picture: None,
        });
        assert!(result.is_err());
    }
}
