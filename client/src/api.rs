// client/src/api.rs

use std::time::Duration;

use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use rx_models::{
    ApiResponse, DoctorView, PrescriptionPayload, PrescriptionView, ReportFilters, ReportRequest,
    ReportResponse,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status and this message.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Response from {0} carried no data")]
    MissingData(String),
}

impl ClientError {
    /// Errors worth showing to the user as-is: the server's own message for
    /// a rejected request.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if (400..500).contains(status))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Thin reqwest wrapper over the `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_prescriptions(&self) -> Result<Vec<PrescriptionView>> {
        let response = self.http.get(self.url("/prescriptions")).send().await?;
        data_of(response, "/prescriptions").await
    }

    pub async fn create_prescription(&self, payload: &PrescriptionPayload) -> Result<PrescriptionView> {
        let response = self
            .http
            .post(self.url("/prescriptions"))
            .json(payload)
            .send()
            .await?;
        data_of(response, "/prescriptions").await
    }

    pub async fn update_prescription(
        &self,
        id: &str,
        payload: &PrescriptionPayload,
    ) -> Result<PrescriptionView> {
        let path = format!("/prescriptions/{}", id);
        let response = self.http.put(self.url(&path)).json(payload).send().await?;
        data_of(response, &path).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete_prescription(&self, id: &str) -> Result<String> {
        let path = format!("/prescriptions/{}", id);
        let response = self.http.delete(self.url(&path)).send().await?;
        let envelope: ApiResponse<Value> = decode(response).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub async fn list_doctors(&self) -> Result<Vec<DoctorView>> {
        let response = self.http.get(self.url("/doctors")).send().await?;
        data_of(response, "/doctors").await
    }

    pub async fn report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        let response = self
            .http
            .post(self.url("/reports"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn report_filters(&self) -> Result<ReportFilters> {
        let response = self.http.get(self.url("/report-filters")).send().await?;
        data_of(response, "/report-filters").await
    }

    pub async fn health(&self) -> Result<Value> {
        let response = self.http.get(self.url("/health")).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    debug!("Request failed with {}: {}", status, body);
    let message = serde_json::from_str::<ApiResponse<Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn data_of<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let envelope: ApiResponse<T> = decode(response).await?;
    envelope
        .data
        .ok_or_else(|| ClientError::MissingData(path.to_string()))
}
