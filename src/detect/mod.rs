//! Material detection client
//!
//! Thin client for the object-detection backend that suggests a title,
//! category and recyclability for a photographed material.

use crate::constants::api::DETECTION_URL;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const DETECT_TIMEOUT: Duration = Duration::from_secs(60);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// What the backend recognized in an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDetection {
    pub material_type: String,
    pub title: String,
    pub description: String,
    pub is_recyclable: bool,
    pub suggested_category: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_weight: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    success: bool,
    material: Option<MaterialDetection>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the detection backend
#[derive(Debug, Clone)]
pub struct DetectionClient {
    client: reqwest::Client,
    base_url: String,
}

impl DetectionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Analyze an image given as a `data:` URL
    pub async fn analyze(&self, image_data_url: &str) -> Result<MaterialDetection> {
        let url = format!("{}/detect", self.base_url);
        debug!("Sending {} byte image to {}", image_data_url.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest { image: image_data_url })
            .timeout(DETECT_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Detection(format!("Detection backend not reachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Detection API error {}: {}", status, body);
            return Err(Error::Detection(format!("API request failed: {}", status)));
        }

        let data: DetectResponse = response
            .json()
            .await
            .map_err(|e| Error::Detection(format!("Failed to parse detection response: {}", e)))?;

        match data.material {
            Some(material) if data.success => {
                info!(
                    "Detected {} ({:.0}% confidence, recyclable: {})",
                    material.material_type,
                    material.confidence * 100.0,
                    material.is_recyclable
                );
                Ok(material)
            }
            _ => Err(Error::Detection("Invalid response from API".to_string())),
        }
    }

    /// Whether the backend reports itself healthy
    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        let response = match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Health check failed: {}", e);
                return false;
            }
        };

        match response.json::<HealthResponse>().await {
            Ok(health) => health.status == "healthy",
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        }
    }
}

impl Default for DetectionClient {
    fn default() -> Self {
        Self::new(DETECTION_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, unreachable_url};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

    fn material() -> serde_json::Value {
        serde_json::json!({
            "materialType": "plastic bottle",
            "title": "Plastic Bottles",
            "description": "PET bottles suitable for recycling",
            "isRecyclable": true,
            "suggestedCategory": "plastic",
            "confidence": 0.87
        })
    }

    #[tokio::test]
    async fn test_analyze() {
        let router = Router::new().route(
            "/detect",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["image"], IMAGE);
                Json(serde_json::json!({"success": true, "material": material()}))
            }),
        );
        let client = DetectionClient::new(serve(router).await);

        let detection = client.analyze(IMAGE).await.unwrap();
        assert_eq!(detection.suggested_category, "plastic");
        assert!(detection.is_recyclable);
        assert!(detection.estimated_weight.is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_responses() {
        let router = Router::new()
            .route(
                "/unsuccessful/detect",
                post(|| async { Json(serde_json::json!({"success": false, "material": material()})) }),
            )
            .route(
                "/broken/detect",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
            );
        let base = serve(router).await;

        for path in ["/unsuccessful", "/broken"] {
            let client = DetectionClient::new(format!("{base}{path}"));
            assert!(matches!(client.analyze(IMAGE).await, Err(Error::Detection(_))));
        }
    }

    #[tokio::test]
    async fn test_health() {
        let router = Router::new()
            .route("/ok/health", get(|| async { Json(serde_json::json!({"status": "healthy"})) }))
            .route("/sick/health", get(|| async { Json(serde_json::json!({"status": "loading"})) }));
        let base = serve(router).await;

        assert!(DetectionClient::new(format!("{base}/ok")).is_healthy().await);
        assert!(!DetectionClient::new(format!("{base}/sick")).is_healthy().await);
        assert!(!DetectionClient::new(unreachable_url().await).is_healthy().await);
    }
}
