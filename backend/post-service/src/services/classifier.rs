/// Client for the external hate-speech prediction service
use crate::config::ClassifierConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Label and confidence returned by the prediction service.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Model confidence in `result`, normalized to [0, 1]
    pub probability: f64,
    /// Predicted label, e.g. "Hate Speech" or "Not Hate Speech"
    pub result: String,
}

/// Classification boundary for user-submitted text, plus an optional media
/// locator the service may use for multimodal models.
///
/// Implementations must never guess a label: any transport or decoding
/// failure surfaces as an error and the whole submission is aborted.
#[async_trait]
pub trait HateSpeechClassifier: Send + Sync {
    async fn predict(&self, text: &str, image_url: Option<&str>) -> Result<Prediction>;
}

/// HTTP client for the prediction API (`POST /predict`, multipart form).
pub struct PredictApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PredictApiClient {
    /// Build the client from configuration with an explicit request timeout.
    pub fn from_config(cfg: &ClassifierConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_string(),
        })
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }
}

#[async_trait]
impl HateSpeechClassifier for PredictApiClient {
    async fn predict(&self, text: &str, image_url: Option<&str>) -> Result<Prediction> {
        let mut form = reqwest::multipart::Form::new().text("text", text.to_owned());
        if let Some(url) = image_url {
            form = form.text("image", url.to_owned());
        }

        let response = self
            .http
            .post(self.predict_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Classification(format!("prediction request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Classification(format!(
                "prediction API returned {status}: {body}"
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| AppError::Classification(format!("undecodable prediction response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_decodes_service_response() {
        let prediction: Prediction =
            serde_json::from_str(r#"{"probability": 0.93, "result": "Hate Speech"}"#).unwrap();

        assert_eq!(prediction.result, "Hate Speech");
        assert!((prediction.probability - 0.93).abs() < 1e-9);
    }

    #[test]
    fn predict_url_joins_base_with_and_without_trailing_slash() {
        for base in ["http://127.0.0.1:5000", "http://127.0.0.1:5000/"] {
            let client = PredictApiClient::from_config(&ClassifierConfig {
                url: base.to_string(),
                timeout_secs: 5,
            })
            .unwrap();

            assert_eq!(client.predict_url(), "http://127.0.0.1:5000/predict");
        }
    }
}
