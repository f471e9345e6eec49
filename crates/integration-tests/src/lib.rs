//! Integration tests for the carniceria catalog API.
//!
//! # Running Tests
//!
//! The HTTP tests need a running server with a migrated, seeded
//! database:
//!
//! ```bash
//! cargo run -p carniceria-cli -- migrate
//! cargo run -p carniceria-cli -- seed seeds/catalog.yaml
//! cargo run -p carniceria-server &
//! cargo test -p carniceria-integration-tests -- --ignored
//! ```
//!
//! The base URL defaults to `http://localhost:5000` and can be
//! overridden with `CARNICERIA_TEST_BASE_URL`.

use reqwest::Client;

/// Shared context for API tests.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context pointing at the server under test.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("CARNICERIA_TEST_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_owned());

        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Login with the seeded admin account and return the token.
    ///
    /// # Panics
    ///
    /// Panics if the login request fails; the tests using this helper
    /// already require a seeded, running server.
    pub async fn login_as_admin(&self) -> String {
        let response = self
            .client
            .post(self.api("/users/login"))
            .json(&serde_json::json!({
                "email": "admin@example.com",
                "password": "123456",
            }))
            .send()
            .await
            .expect("login request failed");

        assert_eq!(response.status(), 200, "seeded admin login should succeed");

        let body: serde_json::Value = response.json().await.expect("login response is JSON");
        body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_owned()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
