use crate::config::ServiceConfig;
use crate::error::SubmitError;
use crate::questionnaire::{PredictionRequest, PredictionResult};
use crate::upload::ImageFile;
use crate::PredictionService;
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;

/// Multipart field the detection service reads the image from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking HTTP client for both prediction services.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: Client,
    detection_url: String,
    prediction_url: String,
}

impl HttpPredictionClient {
    pub fn new(cfg: &ServiceConfig) -> Result<Self, SubmitError> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| SubmitError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            detection_url: cfg.detection_url.clone(),
            prediction_url: cfg.prediction_url.clone(),
        })
    }

    pub fn detection_url(&self) -> &str {
        &self.detection_url
    }

    pub fn prediction_url(&self) -> &str {
        &self.prediction_url
    }
}

impl PredictionService for HttpPredictionClient {
    fn detect(&self, file: &ImageFile) -> Result<String, SubmitError> {
        let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime) = file.mime {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!("POST {} ({} bytes)", self.detection_url, file.bytes.len());
        let response = self.http.post(&self.detection_url).multipart(form).send()?;
        let body: DetectionResponse = read_json(response)?;
        tracing::info!("detection result: {}", body.message);
        Ok(body.message)
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, SubmitError> {
        tracing::debug!(
            "POST {} ({} answers)",
            self.prediction_url,
            request.answer.answered()
        );
        let response = self.http.post(&self.prediction_url).json(request).send()?;
        let result: PredictionResult = read_json(response)?;
        tracing::info!(
            "prediction result: {} ({:.2}%)",
            result.prediction,
            result.confidence
        );
        Ok(result)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SubmitError> {
    let status = response.status();
    let text = response.text()?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| text.trim().to_string());
        return Err(SubmitError::Server {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_str(&text).map_err(|e| SubmitError::MalformedResponse(e.to_string()))
}
