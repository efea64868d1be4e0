//! Credential matching against the user collection.

use reqwest::Client;
use shared::domain::User;
use tracing::{info, warn};
use url::Url;

use crate::{
    error::IdentityError,
    store::{endpoint, ensure_success, request_error},
};

pub struct IdentityClient {
    http: Client,
    base_url: Url,
}

impl IdentityClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Resolves the user whose email (case-insensitive) and password match.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let url = endpoint(&self.base_url, &["users"]);
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| request_error("GET", &url, source))?;
        let res = ensure_success("GET", &url, res)?;
        let users: Vec<User> = res
            .json()
            .await
            .map_err(|source| request_error("GET", &url, source))?;

        match find_matching_user(users, email, password) {
            Some(user) => {
                info!(user_id = %user.id, "identity: signed in");
                Ok(user)
            }
            None => {
                warn!("identity: credentials did not match any user");
                Err(IdentityError::InvalidCredentials)
            }
        }
    }
}

fn find_matching_user(users: Vec<User>, email: &str, password: &str) -> Option<User> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return None;
    }
    users
        .into_iter()
        .find(|user| user.email.eq_ignore_ascii_case(email) && user.password == password)
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
