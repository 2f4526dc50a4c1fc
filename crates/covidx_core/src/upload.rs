//! Single-image upload: selection with preview, last submission outcome.

use crate::PredictionService;
use crate::error::SubmitError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Image bytes as picked from disk. Contents are not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Content type guessed from the extension, if recognised.
    pub mime: Option<&'static str>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for(Path::new(&name));
        Self { name, bytes, mime }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read image: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Extensions offered in the file picker. Advisory only.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A selected file together with its preview handle.
#[derive(Debug)]
pub struct Selection<P> {
    pub file: ImageFile,
    pub preview: P,
}

/// State of the image upload form. `P` is the preview handle; dropping it releases it.
#[derive(Debug)]
pub struct UploadState<P> {
    selection: Option<Selection<P>>,
    in_flight: bool,
    /// Message or error of the last completed submission; kept until the next one completes.
    last_outcome: Option<Result<String, SubmitError>>,
}

impl<P> Default for UploadState<P> {
    fn default() -> Self {
        Self {
            selection: None,
            in_flight: false,
            last_outcome: None,
        }
    }
}

impl<P> UploadState<P> {
    pub fn selection(&self) -> Option<&Selection<P>> {
        self.selection.as_ref()
    }

    pub fn preview(&self) -> Option<&P> {
        self.selection.as_ref().map(|s| &s.preview)
    }

    pub fn last_outcome(&self) -> Option<&Result<String, SubmitError>> {
        self.last_outcome.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Replaces the current selection. The previous preview is dropped here.
    pub fn select_file(&mut self, file: ImageFile, preview: P) {
        tracing::debug!("selected {} ({} bytes)", file.name, file.bytes.len());
        self.selection = Some(Selection { file, preview });
    }

    /// Marks a submission as in flight and returns the file to send.
    pub fn begin_submit(&mut self) -> Result<ImageFile, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }
        let file = self
            .selection
            .as_ref()
            .map(|s| s.file.clone())
            .ok_or(SubmitError::NoFileSelected)?;
        self.in_flight = true;
        Ok(file)
    }

    pub fn finish_submit(&mut self, outcome: Result<String, SubmitError>) {
        if let Err(err) = &outcome {
            tracing::warn!("image submission failed: {err}");
        }
        self.in_flight = false;
        self.last_outcome = Some(outcome);
    }

    /// Runs a whole submission against `service` on the current thread.
    pub fn submit<S>(&mut self, service: &S) -> Result<String, SubmitError>
    where
        S: PredictionService + ?Sized,
    {
        let file = self.begin_submit()?;
        let outcome = service.detect(&file);
        self.finish_submit(outcome.clone());
        outcome
    }
}
