//! Shared test harness: an in-memory user store, a recording mailer and a
//! router wired over both.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Months, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use accounts_api::api::{create_router, AppState};
use accounts_api::config::Config;
use accounts_api::domain::{NewUser, User};
use accounts_api::errors::{AppError, AppResult};
use accounts_api::infra::{email_taken, Database, Mailer, OutgoingEmail, UserRepository};
use accounts_api::services::{AccountManager, AccountService, Services};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";
pub const PASSWORD: &str = "Testpass123";

/// `UserRepository` over a map, with the same uniqueness rule as the table.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    pub fn get_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn update<F: FnOnce(&mut User)>(&self, email: &str, f: F) {
        let mut users = self.users.lock().unwrap();
        let user = users
            .values_mut()
            .find(|u| u.email == email)
            .expect("user exists");
        f(user);
    }

    pub fn remove(&self, email: &str) {
        self.users.lock().unwrap().retain(|_, u| u.email != email);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.get_by_email(email))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(email_taken());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            gender: new_user.gender,
            birth_date: new_user.birth_date,
            is_active: true,
            is_staff: new_user.is_staff,
            is_superuser: new_user.is_superuser,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.update_name(name);
        }
        if let Some(hash) = password_hash {
            user.set_password_hash(hash);
        }
        Ok(user.clone())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.set_password_hash(password_hash);
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.last_login = Some(Utc::now());
        Ok(())
    }

    async fn list_non_superusers(&self) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| !u.is_superuser)
            .cloned()
            .collect())
    }
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        if self.failing {
            return Err(AppError::EmailDispatch("smtp unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let config = Config::with_secret(TEST_SECRET);
        let users = Arc::new(InMemoryUsers::default());
        let mailer = Arc::new(mailer);

        let services = Services::from_parts(users.clone(), mailer.clone(), &config);
        let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
        let router = create_router(AppState::new(&services, database));

        Self {
            router,
            users,
            mailer,
            config,
        }
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn register(&self, email: &str, birth_date: NaiveDate) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/user/create/",
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "name": "A",
                "gender": "F",
                "birth_date": birth_date.to_string(),
            })),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/user/token/",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Register and log in, returning the bearer token.
    pub async fn registered_token(&self, email: &str) -> String {
        let (status, _) = self.register(email, years_ago(30)).await;
        assert_eq!(status, StatusCode::CREATED);
        self.token_for(email, PASSWORD).await
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_superuser(&self, email: &str, password: &str) -> User {
        AccountManager::new(self.users.clone())
            .create_superuser(email.to_string(), password.to_string(), None)
            .await
            .unwrap()
    }
}

pub fn years_ago(years: u32) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(12 * years))
        .unwrap()
}

/// Field names present in a validation error body.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["error"]["fields"]
        .as_object()
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}
