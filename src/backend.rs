use crate::error::BackendError;
use crate::queue::model::{QueueItem, QueueResponse};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

pub const UPLOAD_FIELD_NAME: &str = "name";
pub const UPLOAD_FIELD_DRAWING: &str = "drawing";
pub const UPLOAD_FILE_NAME: &str = "drawing.png";

/// What gets posted to the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub author_name: Option<String>,
    pub image_png: Vec<u8>,
}

/// Parsed body of a successful upload. Every field is optional because the
/// body is not part of the success contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The queue service as seen from this client.
pub trait QueueBackend: Send + Sync {
    fn upload(&self, request: &SubmissionRequest) -> Result<UploadReceipt, BackendError>;

    fn fetch_queue(&self) -> Result<Vec<QueueItem>, BackendError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sketch-queue/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    pub fn queue_url(&self) -> String {
        format!("{}/queue", self.base_url)
    }

    /// Probe the backend root; `Ok` means it answered with a 2xx.
    pub fn health(&self) -> Result<(), BackendError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send()?;
        check_status(resp).map(|_| ())
    }
}

impl QueueBackend for HttpBackend {
    fn upload(&self, request: &SubmissionRequest) -> Result<UploadReceipt, BackendError> {
        let drawing = Part::bytes(request.image_png.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("image/png")?;
        let mut form = Form::new();
        if let Some(name) = &request.author_name {
            form = form.text(UPLOAD_FIELD_NAME, name.clone());
        }
        form = form.part(UPLOAD_FIELD_DRAWING, drawing);

        let resp = self.client.post(self.upload_url()).multipart(form).send()?;
        let body = check_status(resp)?.bytes()?;
        Ok(serde_json::from_slice(&body).unwrap_or_default())
    }

    fn fetch_queue(&self) -> Result<Vec<QueueItem>, BackendError> {
        let resp = self.client.get(self.queue_url()).send()?;
        let body = check_status(resp)?.bytes()?;
        let parsed: QueueResponse = serde_json::from_slice(&body)?;
        Ok(parsed.queue)
    }
}

fn check_status(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .bytes()
        .ok()
        .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
        .and_then(|body| body.error);
    Err(BackendError::Http {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_ignore_trailing_slash() {
        let backend =
            HttpBackend::new("http://localhost:5000/", Duration::from_secs(1)).expect("client");
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.upload_url(), "http://localhost:5000/upload");
        assert_eq!(backend.queue_url(), "http://localhost:5000/queue");
    }

    #[test]
    fn receipt_tolerates_missing_fields() {
        let receipt: UploadReceipt = serde_json::from_str("{}").expect("parse");
        assert_eq!(receipt, UploadReceipt::default());
    }
}
