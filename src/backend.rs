use std::time::Duration;

use derive_more::Display;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::attendance::{AttendanceAction, AttendanceRecord};
use crate::model::cash_advance::{CashAdvance, CashAdvanceMutation};
use crate::model::employee::Employee;
use crate::model::envelope::{Envelope, ListBody};
use crate::model::payroll::Payslip;

#[derive(Debug, Display)]
pub enum BackendError {
    #[display(fmt = "backend unreachable: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "backend answered {}: {}", status, message)]
    Status { status: u16, message: String },
    #[display(fmt = "{}", _0)]
    Rejected(String),
    #[display(fmt = "backend sent an unreadable body: {}", _0)]
    Malformed(String),
}

impl std::error::Error for BackendError {}

/// Strip trailing slashes and one trailing `/api` so both
/// `http://host:8080` and `http://host:8080/api/` resolve the same way.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).trim_end_matches('/').to_string()
}

/// `http` -> `ws`, `https` -> `wss`. Other schemes pass through.
pub fn ws_base_from_http(http_base: &str) -> String {
    let base = normalize_base_url(http_base);
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base
    }
}

/// Pull a human readable message out of an error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct WithMessage {
        message: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<WithMessage>(body) {
        Ok(WithMessage { message: Some(m), .. }) | Ok(WithMessage { error: Some(m), .. }) => m,
        _ if body.trim().is_empty() => "request failed".to_string(),
        _ => body.trim().to_string(),
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    nama: &'a str,
    action: AttendanceAction,
}

#[derive(Deserialize)]
struct SubmitReply {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<AttendanceRecord>,
}

/// REST client for the business backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: Client,
    base: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(timeout).build().map_err(BackendError::Transport)?;
        Ok(Self {
            http,
            base: normalize_base_url(base_url),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base, path)
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
        let status = resp.status();
        let body = resp.text().await.map_err(BackendError::Transport)?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(BackendError::Transport)?;
        Self::read(resp).await
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        self.get_json::<Envelope<T>>(path)
            .await?
            .into_data()
            .map_err(BackendError::Rejected)
    }

    /// Most recent clock-ins across every employee.
    pub async fn list_attendance(&self, limit: u32) -> Result<Vec<AttendanceRecord>, BackendError> {
        self.get_json::<ListBody<AttendanceRecord>>(&format!("/absensi?limit={limit}"))
            .await?
            .into_vec()
            .map_err(BackendError::Rejected)
    }

    pub async fn submit_attendance(
        &self,
        name: &str,
        action: AttendanceAction,
    ) -> Result<AttendanceRecord, BackendError> {
        let resp = self
            .http
            .post(self.url("/absensi"))
            .header(ACCEPT, "application/json")
            .json(&SubmitBody { nama: name, action })
            .send()
            .await
            .map_err(BackendError::Transport)?;

        // Validation failures come back as 400 with the same body shape.
        let status = resp.status();
        let body = resp.text().await.map_err(BackendError::Transport)?;
        let reply: SubmitReply = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(_) if !status.is_success() => {
                return Err(BackendError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }
            Err(e) => return Err(BackendError::Malformed(e.to_string())),
        };

        if !reply.status.eq_ignore_ascii_case("ok") {
            return Err(BackendError::Rejected(reply.message));
        }
        reply
            .data
            .ok_or_else(|| BackendError::Malformed("accepted submission carried no record".into()))
    }

    pub async fn payslip(&self, id: Uuid) -> Result<Payslip, BackendError> {
        self.get_enveloped(&format!("/penggajian/{id}")).await
    }

    pub async fn cash_advance(&self, id: Uuid) -> Result<CashAdvance, BackendError> {
        self.get_enveloped(&format!("/kasbon/{id}")).await
    }

    /// Newest first, as the backend orders them.
    pub async fn cash_advance_mutations(&self, id: Uuid) -> Result<Vec<CashAdvanceMutation>, BackendError> {
        self.get_json::<ListBody<CashAdvanceMutation>>(&format!("/kasbon/{id}/mutasi"))
            .await?
            .into_vec()
            .map_err(BackendError::Rejected)
    }

    pub async fn employee(&self, id: Uuid) -> Result<Employee, BackendError> {
        self.get_enveloped(&format!("/masterpegawai/{id}")).await
    }
}
