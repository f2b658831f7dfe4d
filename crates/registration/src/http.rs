//! HTTP registration client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use checkin_core::{CheckInId, RegistrationError, VenueDescriptor, VenueType};

use crate::client::RegistrationClient;

/// Registration client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Registration service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://checkin-registry:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    venue_id: &'a str,
    venue_type: VenueType,
    arrival: DateTime<Utc>,
    departure: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: String,
}

/// [`RegistrationClient`] over the registration service's REST surface.
#[derive(Clone)]
pub struct HttpRegistrationClient {
    config: RegistrationConfig,
    http_client: reqwest::Client,
}

impl HttpRegistrationClient {
    pub fn new(config: RegistrationConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/v1/check-ins{}", self.config.base_url.trim_end_matches('/'), suffix)
    }
}

/// Classifies a transport-level failure.
fn transport_error(e: reqwest::Error) -> RegistrationError {
    if e.is_connect() || e.is_timeout() {
        RegistrationError::NetworkUnavailable(e.to_string())
    } else {
        RegistrationError::Unknown(e.to_string())
    }
}

async fn rejection(response: reqwest::Response) -> RegistrationError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    RegistrationError::ServerRejected { status, message }
}

#[async_trait]
impl RegistrationClient for HttpRegistrationClient {
    async fn register(
        &self,
        venue: &VenueDescriptor,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Result<CheckInId, RegistrationError> {
        let url = self.endpoint("");
        let request = RegisterRequest {
            venue_id: venue.id(),
            venue_type: venue.venue_type(),
            arrival,
            departure,
        };

        debug!(url = %url, venue = venue.id(), "Registering check-in");

        let response = self
            .http_client
            .post(&url)
            .header("X-Idempotency-Key", Uuid::new_v4().to_string())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration request failed");
                transport_error(e)
            })?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, "Registration rejected");
            return Err(err);
        }

        let body: RegisterResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse registration response");
            RegistrationError::Unknown(format!("invalid registration response: {e}"))
        })?;

        if body.id.is_empty() {
            return Err(RegistrationError::Unknown(
                "registration response carried an empty identifier".into(),
            ));
        }

        Ok(CheckInId::new(body.id))
    }

    async fn update(
        &self,
        id: &CheckInId,
        venue: &VenueDescriptor,
        new_arrival: DateTime<Utc>,
        new_departure: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        let url = self.endpoint(&format!("/{id}"));
        let request = RegisterRequest {
            venue_id: venue.id(),
            venue_type: venue.venue_type(),
            arrival: new_arrival,
            departure: new_departure,
        };

        debug!(url = %url, "Updating registered check-in");

        let response = self
            .http_client
            .put(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration update request failed");
                transport_error(e)
            })?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, "Registration update rejected");
            return Err(err);
        }

        Ok(())
    }
}
