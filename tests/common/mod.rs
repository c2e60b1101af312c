#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use userhub::auth::JwtKeys;
use userhub::config::AppConfig;
use userhub::database::models::{NewRefreshToken, NewUser, RefreshToken, User};
use userhub::database::{DatabaseError, RefreshTokenRepository, UserListing, UserRepository};
use userhub::listing::{ListingError, ListingResult, PageFetcher};
use userhub::security::hash_password_with_cost;
use userhub::state::AppState;

pub const JWT_SECRET: &[u8] = b"integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_userhub-internal"));
        cmd.env("INTERNAL_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn internal server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/status", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Internal server owned by the calling test; killed when dropped.
pub async fn spawn_internal_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Users kept in memory, listed in id order.
#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn insert(&self, username: &str, password: &str, is_active: bool) -> User {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password: hash_password_with_cost(password, 4).unwrap(),
            is_active,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get_user_by_username(&self, username: Option<&str>) -> Result<Option<User>, DatabaseError> {
        let Some(username) = username.filter(|name| !name.is_empty()) else {
            return Ok(None);
        };
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Duplicate(new_user.username));
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username,
            password: new_user.password,
            is_active: true,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn paginate_get_all(&self, page: u32, page_size: u32) -> Result<UserListing, ListingError> {
        let rows = self.users.lock().unwrap().clone();
        let fetcher: Box<dyn PageFetcher<Record = User>> = Box::new(SliceFetcher {
            rows,
            offset: 0,
            limit: u64::MAX,
        });
        ListingResult::new(fetcher, page, page_size)
    }
}

/// Offset/limit over an in-memory snapshot.
pub struct SliceFetcher<R> {
    rows: Vec<R>,
    offset: u64,
    limit: u64,
}

#[async_trait]
impl<R: Clone + Send + Sync> PageFetcher for SliceFetcher<R> {
    type Record = R;

    fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    async fn fetch(&self) -> Result<Vec<R>, DatabaseError> {
        Ok(self
            .rows
            .iter()
            .skip(self.offset as usize)
            .take(self.limit.min(usize::MAX as u64) as usize)
            .cloned()
            .collect())
    }

    fn has_count(&self) -> bool {
        true
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.rows.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokens {
    tokens: Mutex<Vec<RefreshToken>>,
}

impl MemoryRefreshTokens {
    pub fn all(&self) -> Vec<RefreshToken> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn insert(&self, token: RefreshToken) {
        self.tokens.lock().unwrap().push(token);
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokens {
    async fn save_token(&self, token: NewRefreshToken, user: &User) -> Result<RefreshToken, DatabaseError> {
        let mut tokens = self.tokens.lock().unwrap();
        let saved = RefreshToken {
            id: tokens.len() as i64 + 1,
            refresh_token: token.refresh_token,
            username: token.username,
            valid: token.valid,
            user_id: user.id,
        };
        tokens.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.refresh_token == token).cloned())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUsers>,
    pub refresh_tokens: Arc<MemoryRefreshTokens>,
}

/// External service state over in-memory repositories, HS256 tokens and
/// the given internal status URL.
pub fn test_app(internal_status_url: &str) -> TestApp {
    let mut config = AppConfig::development();
    config.server.internal_status_url = internal_status_url.to_string();
    config.listing.max_page_size = 50;

    let users = Arc::new(MemoryUsers::default());
    let refresh_tokens = Arc::new(MemoryRefreshTokens::default());

    let state = AppState::new(
        config,
        users.clone(),
        refresh_tokens.clone(),
        JwtKeys::from_secret(JWT_SECRET, 3600),
    )
    .expect("failed to build app state");

    TestApp {
        state,
        users,
        refresh_tokens,
    }
}

/// A URL on which nothing listens.
pub fn unreachable_url() -> String {
    let port = portpicker::pick_unused_port().expect("no free port");
    format!("http://127.0.0.1:{}/status", port)
}
