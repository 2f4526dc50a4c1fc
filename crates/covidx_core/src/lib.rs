//! Client-side core for the COVID detection and risk questionnaire services.

pub mod client;
pub mod config;
pub mod error;
pub mod questionnaire;
pub mod upload;

pub use client::HttpPredictionClient;
pub use config::ServiceConfig;
pub use error::{ErrorKind, SubmitError};
pub use questionnaire::{
    Answer, AnswerSet, PAGE_SIZE, Pagination, PredictionRequest, PredictionResult,
    QuestionDefinition, Questionnaire, RadioId, covid_questions,
};
pub use upload::{IMAGE_EXTENSIONS, ImageFile, UploadState};

/// The two remote classifiers, as seen by the UI flows.
pub trait PredictionService {
    /// Uploads an image and returns the service's `message`.
    fn detect(&self, file: &ImageFile) -> Result<String, SubmitError>;

    /// Sends the questionnaire answers and returns the verdict.
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, SubmitError>;
}
