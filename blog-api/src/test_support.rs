//! In-memory database and router harness for HTTP-level tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use crate::data::repositories::sqlite::user_repository::SqliteUserRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::{PasswordVault, TEST_COST};
use crate::presentation::AppState;
use crate::server::build_router;

pub(crate) const TEST_JWT_SECRET: &str = "test-secret-test-secret-test-secret";

pub(crate) struct TestApp {
    router: Router,
    pool: SqlitePool,
    jwt: Arc<JwtService>,
}

#[derive(Debug, Clone)]
pub(crate) struct TestUser {
    pub(crate) id: i64,
    pub(crate) token: String,
}

#[derive(Debug)]
pub(crate) struct TestResponse {
    pub(crate) status: StatusCode,
    pub(crate) body: Value,
}

impl TestApp {
    /// Fresh database per call; nothing is shared between tests.
    pub(crate) async fn spawn() -> Self {
        let pool = create_pool("sqlite::memory:", 1)
            .await
            .expect("in-memory database must open");
        run_migrations(&pool)
            .await
            .expect("migrations must apply");

        let jwt = Arc::new(JwtService::new(TEST_JWT_SECRET, 3600));
        let passwords = PasswordVault::new(TEST_COST).expect("password vault must build");
        let state = AppState::from_pool(pool.clone(), jwt.clone(), passwords);

        Self {
            router: build_router(state),
            pool,
            jwt,
        }
    }

    /// Inserts a user directly, skipping password hashing, and mints a token.
    pub(crate) async fn create_user(&self, username: &str) -> TestUser {
        let id = SqliteUserRepository::new(self.pool.clone())
            .insert_user(username, "unused")
            .await
            .expect("user must be inserted");
        let token = self.token_for(id, username);

        TestUser { id, token }
    }

    /// Removes the posts table so every post query fails in storage.
    pub(crate) async fn break_post_storage(&self) {
        sqlx::query("DROP TABLE posts")
            .execute(&self.pool)
            .await
            .expect("posts table must drop");
    }

    pub(crate) fn token_for(&self, id: i64, username: &str) -> String {
        self.jwt
            .generate_token(id, username)
            .expect("token must encode")
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request must build");

        self.dispatch(request).await
    }

    pub(crate) async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub(crate) async fn create_post(&self, user: &TestUser, body: Value) -> Value {
        let response = self
            .send(Method::POST, "/api/posts", Some(&user.token), Some(body))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}
