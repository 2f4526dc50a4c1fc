use thiserror::Error;

/// Broad category of a submission failure, used to decide how the UI reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user can fix this without retrying the request.
    User,
    /// The service could not be reached.
    Network,
    /// The service answered, but not with a usable result.
    Server,
}

/// Outcome of any submission to a prediction service, for both flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please select an image to upload.")]
    NoFileSelected,
    #[error("A submission is already in progress.")]
    InFlight,
    #[error("Answer the remaining questions before submitting.")]
    NotOnFinalPage,
    #[error("Could not reach the prediction service: {0}")]
    Network(String),
    #[error("The prediction service returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response from the prediction service: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::NoFileSelected | SubmitError::InFlight | SubmitError::NotOnFinalPage => {
                ErrorKind::User
            }
            SubmitError::Network(_) => ErrorKind::Network,
            SubmitError::Server { .. } | SubmitError::MalformedResponse(_) => ErrorKind::Server,
        }
    }

    /// Whether resending the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::User
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SubmitError::MalformedResponse(err.to_string())
        } else {
            SubmitError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SubmitError::NoFileSelected, ErrorKind::User)]
    #[case(SubmitError::InFlight, ErrorKind::User)]
    #[case(SubmitError::NotOnFinalPage, ErrorKind::User)]
    #[case(SubmitError::Network("refused".into()), ErrorKind::Network)]
    #[case(SubmitError::Server { status: 500, message: "boom".into() }, ErrorKind::Server)]
    #[case(SubmitError::MalformedResponse("eof".into()), ErrorKind::Server)]
    fn kind_matches_variant(#[case] err: SubmitError, #[case] kind: ErrorKind) {
        assert_eq!(err.kind(), kind);
        assert_eq!(err.is_retryable(), kind != ErrorKind::User);
    }

    #[test]
    fn no_file_message_matches_notice() {
        assert_eq!(
            SubmitError::NoFileSelected.to_string(),
            "Please select an image to upload."
        );
    }
}
