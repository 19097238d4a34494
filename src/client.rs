//! Client for a remote serving endpoint. Connectivity failures are surfaced as
//! [`ClientError::Transport`]; nothing is retried here.

use crate::config::ClientConfig;
use crate::decision::{PredictionResponse, PredictionResult};
use crate::error::ClientError;
use crate::schema::RawCustomerRecord;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct PredictionClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn predict(&self, record: &RawCustomerRecord) -> Result<PredictionResult, ClientError> {
        self.post(record)
    }

    /// Send an arbitrary JSON body; the server validates it.
    pub fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<PredictionResult, ClientError> {
        let res = self.client.post(&self.endpoint).json(body).send().map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "serving endpoint unreachable");
            ClientError::Transport(e.to_string())
        })?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let response: PredictionResponse = res.json().map_err(|e| ClientError::Decode(e.to_string()))?;
        if !(0.0..=1.0).contains(&response.churn_probability) || response.prediction > 1 {
            return Err(ClientError::Decode(format!(
                "prediction {} / probability {} out of range",
                response.prediction, response.churn_probability
            )));
        }
        debug!(probability = response.churn_probability, "remote prediction received");
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to be listening.
        let config = ClientConfig {
            endpoint: "http://127.0.0.1:9/predict/".to_string(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
        };
        let client = PredictionClient::new(&config).unwrap();
        let err = client.post(&serde_json::json!({"type": "One year"})).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
    }
}
