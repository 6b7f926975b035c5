#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use user_service::app::{app, AppState};
use user_service::auth::{Claims, JwtAuthority};
use user_service::config::AppConfig;
use user_service::database::models::user::Role;
use user_service::database::MemoryUserRepository;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// A router served in-process on its own port, backed by a fresh in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    jwt: JwtAuthority,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.security.jwt_secret = TEST_JWT_SECRET.to_string();

        let jwt = JwtAuthority::from_config(&config.security)?;
        let state = AppState::new(Arc::new(MemoryUserRepository::new()), jwt.clone());
        let router = app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            jwt,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token the server will accept, minted without a login round trip.
    pub fn token_for(&self, id: &str, role: Role) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let token = self.jwt.sign(&Claims {
            sub: id.to_string(),
            name: id.to_string(),
            role,
            exp: now + 3600,
            iat: now,
        })?;
        Ok(token)
    }

    pub async fn create_user(&self, body: &Value) -> Result<Value> {
        let res = self.client.post(self.url("/users")).json(body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }
}

/// Fresh server per test; each `#[tokio::test]` owns its runtime.
pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

pub fn ann() -> Value {
    json!({
        "id": "u1",
        "name": "Ann",
        "email": "a@x.com",
        "password": "p",
        "birthDate": "1990-04-01",
        "role": "admin"
    })
}

pub fn bob() -> Value {
    json!({
        "id": "u2",
        "name": "Bob",
        "email": "b@x.com",
        "password": "hunter2"
    })
}
