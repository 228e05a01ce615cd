#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,
    #[error("blank canvas")]
    BlankCanvas,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered with a non-2xx status. `message` is the `error`
    /// field of a JSON body, when there was one.
    #[error("backend returned {status}")]
    Http { status: u16, message: Option<String> },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("encoding drawing failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub const NAME_REQUIRED_MESSAGE: &str = "Name is required!";
pub const BLANK_CANVAS_MESSAGE: &str = "Canvas is blank. Please draw something!";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const SUBMIT_FAILED_MESSAGE: &str = "Error submitting drawing";

impl SubmitError {
    /// Text shown to the user for this failure.
    pub fn status_message(&self) -> String {
        match self {
            SubmitError::Validation(ValidationError::NameRequired) => {
                NAME_REQUIRED_MESSAGE.to_string()
            }
            SubmitError::Validation(ValidationError::BlankCanvas) => {
                BLANK_CANVAS_MESSAGE.to_string()
            }
            SubmitError::Backend(BackendError::Http { message, .. }) => format!(
                "Error: {}",
                message.as_deref().unwrap_or(UPLOAD_FAILED_MESSAGE)
            ),
            SubmitError::Encode(_)
            | SubmitError::Backend(BackendError::Network(_))
            | SubmitError::Backend(BackendError::Decode(_)) => SUBMIT_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages() {
        assert_eq!(
            SubmitError::from(ValidationError::NameRequired).status_message(),
            "Name is required!"
        );
        assert_eq!(
            SubmitError::from(ValidationError::BlankCanvas).status_message(),
            "Canvas is blank. Please draw something!"
        );
    }

    #[test]
    fn http_failure_prefers_backend_message() {
        let with_message = SubmitError::from(BackendError::Http {
            status: 400,
            message: Some("No file uploaded".into()),
        });
        let without = SubmitError::from(BackendError::Http {
            status: 502,
            message: None,
        });

        assert_eq!(with_message.status_message(), "Error: No file uploaded");
        assert_eq!(without.status_message(), "Error: Upload failed");
    }

    #[test]
    fn decode_failure_is_generic() {
        let err = serde_json::from_str::<serde_json::Value>("{").expect_err("bad json");
        let submit = SubmitError::from(BackendError::from(err));
        assert_eq!(submit.status_message(), "Error submitting drawing");
        assert!(!submit.is_validation());
    }
}
