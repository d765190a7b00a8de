// Auth provider adapter - exchanges username + 4-digit PIN for the
// synthetic credential pair the external auth service expects
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::application::repositories::AuthProvider;
use crate::infrastructure::config::AuthSettings;

/// The synthetic pair sent to the auth service. This is an adapter for a
/// provider that insists on email/password credentials, not a security
/// boundary - the PIN is the actual secret the user knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn derive_credentials(username: &str, pin: &str, settings: &AuthSettings) -> Credentials {
    Credentials {
        email: format!("{}@{}", username, settings.email_domain),
        password: format!("{}{}", pin, settings.password_suffix),
    }
}

pub struct HttpAuthProvider {
    settings: AuthSettings,
    client: reqwest::Client,
}

impl HttpAuthProvider {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, method: reqwest::Method, path: &str, credentials: &Credentials) -> Result<()> {
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&self.settings.api_key)
            .json(credentials)
            .send()
            .await
            .context("failed to reach auth provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("auth provider request failed with status {}: {}", status, body);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn create_account(&self, username: &str, pin: &str) -> Result<()> {
        let credentials = derive_credentials(username, pin, &self.settings);
        self.send(reqwest::Method::POST, "/users", &credentials).await
    }

    async fn update_password(&self, username: &str, pin: &str) -> Result<()> {
        let credentials = derive_credentials(username, pin, &self.settings);
        self.send(reqwest::Method::PUT, "/users/password", &credentials)
            .await
    }
}

/// Stand-in for local development (memory backend): accepts every
/// exchange without calling out.
pub struct LocalAuthProvider;

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn create_account(&self, username: &str, _pin: &str) -> Result<()> {
        tracing::debug!(%username, "local auth: account created");
        Ok(())
    }

    async fn update_password(&self, username: &str, _pin: &str) -> Result<()> {
        tracing::debug!(%username, "local auth: password updated");
        Ok(())
    }
}

/// Test double that records every exchange instead of calling out.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingAuthProvider {
    created: std::sync::Mutex<Vec<(String, String)>>,
    updated: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingAuthProvider {
    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, String)> {
        self.updated.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl AuthProvider for RecordingAuthProvider {
    async fn create_account(&self, username: &str, pin: &str) -> Result<()> {
        self.created
            .lock()
            .unwrap()
            .push((username.to_string(), pin.to_string()));
        Ok(())
    }

    async fn update_password(&self, username: &str, pin: &str) -> Result<()> {
        self.updated
            .lock()
            .unwrap()
            .push((username.to_string(), pin.to_string()));
        Ok(())
    }
}
