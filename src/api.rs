// src/api.rs
//! REST client for the laboratory backend
//!
//! [`LabApi`] is the seam the session, dashboard and report code depend on;
//! [`ApiClient`] implements it over reqwest.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::*;

// ==================== RESOURCES ====================

/// Binds an entity to its CRUD collection on the backend.
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path relative to the base URL
    const PATH: &'static str;
    /// Human name used in logs and alerts
    const NAME: &'static str;
}

impl Resource for User {
    const PATH: &'static str = "users";
    const NAME: &'static str = "users";
}

impl Resource for Laboratory {
    const PATH: &'static str = "laboratorios";
    const NAME: &'static str = "laboratories";
}

impl Resource for Equipment {
    const PATH: &'static str = "equipos";
    const NAME: &'static str = "equipment";
}

impl Resource for EquipmentCategory {
    const PATH: &'static str = "categoria_equipos";
    const NAME: &'static str = "equipment categories";
}

impl Resource for MaintenanceRecord {
    const PATH: &'static str = "mantenimientos";
    const NAME: &'static str = "maintenance records";
}

impl Resource for Loan {
    const PATH: &'static str = "prestamos";
    const NAME: &'static str = "loans";
}

impl Resource for LabReservation {
    const PATH: &'static str = "reservas_laboratorios";
    const NAME: &'static str = "lab reservations";
}

// ==================== API SEAM ====================

#[async_trait]
pub trait LabApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<User>;
    async fn register(&self, form: &RegistrationForm) -> ClientResult<User>;

    async fn users(&self) -> ClientResult<Vec<User>>;
    async fn laboratories(&self) -> ClientResult<Vec<Laboratory>>;
    async fn equipment(&self) -> ClientResult<Vec<Equipment>>;
    async fn categories(&self) -> ClientResult<Vec<EquipmentCategory>>;
    async fn loans(&self) -> ClientResult<Vec<Loan>>;
    async fn reservations(&self) -> ClientResult<Vec<LabReservation>>;
    async fn maintenance(&self) -> ClientResult<Vec<MaintenanceRecord>>;

    async fn user_loan_report(&self, user_id: i64) -> ClientResult<LoanActivityReport>;
    async fn user_lab_report(&self, user_id: i64) -> ClientResult<UserLabReport>;
}

// ==================== HTTP CLIENT ====================

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        Self::with_timeouts(&config.base_url, config.request_timeout(), config.connect_timeout())
    }

    pub fn with_timeouts(base_url: &str, request_timeout: Duration, connect_timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "backend request");
        self.client.request(method, self.url(path))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> ClientResult<T> {
        let response = request.send().await.map_err(|e| log_failure(path, e.into()))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(log_failure(path, backend_error(status, &body)));
        }

        let bytes = response.bytes().await.map_err(|e| log_failure(path, e.into()))?;
        serde_json::from_slice(&bytes).map_err(|e| log_failure(path, e.into()))
    }

    async fn send_empty(&self, request: RequestBuilder, path: &str) -> ClientResult<()> {
        let response = request.send().await.map_err(|e| log_failure(path, e.into()))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(log_failure(path, backend_error(status, &body)));
        }
        Ok(())
    }

    // ==================== GENERIC CRUD ====================

    pub async fn list<R: Resource>(&self) -> ClientResult<Vec<R>> {
        self.send_json(self.request(Method::GET, R::PATH), R::PATH).await
    }

    pub async fn get<R: Resource>(&self, id: i64) -> ClientResult<R> {
        let path = format!("{}/{}", R::PATH, id);
        self.send_json(self.request(Method::GET, &path), &path).await
    }

    pub async fn create<R: Resource, B: Serialize + Sync>(&self, body: &B) -> ClientResult<R> {
        let request = self.request(Method::POST, R::PATH).json(body);
        self.send_json(request, R::PATH).await
    }

    pub async fn update<R: Resource, B: Serialize + Sync>(&self, id: i64, body: &B) -> ClientResult<R> {
        let path = format!("{}/{}", R::PATH, id);
        let request = self.request(Method::PUT, &path).json(body);
        self.send_json(request, &path).await
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> ClientResult<()> {
        let path = format!("{}/{}", R::PATH, id);
        self.send_empty(self.request(Method::DELETE, &path), &path).await
    }

    /// Server-side aggregate; shape is owned by the backend.
    pub async fn admin_dashboard(&self) -> ClientResult<Value> {
        self.send_json(self.request(Method::GET, "admin/dashboard"), "admin/dashboard").await
    }
}

#[async_trait]
impl LabApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let request = self.request(Method::POST, "users/login").json(credentials);
        self.send_json(request, "users/login").await
    }

    async fn register(&self, form: &RegistrationForm) -> ClientResult<User> {
        let request = self.request(Method::POST, "users/register").json(form);
        self.send_json(request, "users/register").await
    }

    async fn users(&self) -> ClientResult<Vec<User>> {
        self.list().await
    }

    async fn laboratories(&self) -> ClientResult<Vec<Laboratory>> {
        self.list().await
    }

    async fn equipment(&self) -> ClientResult<Vec<Equipment>> {
        self.list().await
    }

    async fn categories(&self) -> ClientResult<Vec<EquipmentCategory>> {
        self.list().await
    }

    async fn loans(&self) -> ClientResult<Vec<Loan>> {
        self.list().await
    }

    async fn reservations(&self) -> ClientResult<Vec<LabReservation>> {
        self.list().await
    }

    async fn maintenance(&self) -> ClientResult<Vec<MaintenanceRecord>> {
        self.list().await
    }

    async fn user_loan_report(&self, user_id: i64) -> ClientResult<LoanActivityReport> {
        let path = format!("users/{}/loan-report", user_id);
        self.send_json(self.request(Method::GET, &path), &path).await
    }

    async fn user_lab_report(&self, user_id: i64) -> ClientResult<UserLabReport> {
        let path = format!("users/{}/lab-reservas", user_id);
        self.send_json(self.request(Method::GET, &path), &path).await
    }
}

// ==================== HELPERS ====================

fn log_failure(path: &str, err: ClientError) -> ClientError {
    tracing::warn!(path, error = %err, "backend request failed");
    err
}

/// Builds the error for a non-2xx response, preferring the body's `message` field.
fn backend_error(status: StatusCode, body: &str) -> ClientError {
    ClientError::Backend {
        status: status.as_u16(),
        message: extract_error_message(status, body),
    }
}

pub(crate) fn extract_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        })
}
