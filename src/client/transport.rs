use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::state::{ClientError, SelectedFile, GENERIC_FAILURE};
use crate::models::ExtractReply;
use crate::EXTRACT_PATH;

/// Sends one file to the extraction endpoint and yields its text.
pub trait Transport: Send + Sync {
    fn upload(&self, file: &SelectedFile) -> impl Future<Output = Result<String, ClientError>> + Send;
}

/// Reads a raw endpoint reply.
///
/// Any non-success status yields the generic failure message, whatever the
/// body says. On a success status an `error` field is surfaced verbatim; a
/// body that is not JSON or has no `text` is generic again.
pub fn interpret_reply(status: u16, body: &[u8]) -> Result<String, ClientError> {
    if !(200..300).contains(&status) {
        debug!(status, "Server replied with failure status");
        return Err(ClientError::generic());
    }

    let reply: ExtractReply = match serde_json::from_slice(body) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(status, "Unreadable reply from server: {}", e);
            return Err(ClientError::generic());
        }
    };

    if let Some(error) = reply.error {
        return Err(ClientError::request_failed(error));
    }
    reply.text.ok_or_else(ClientError::generic)
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), EXTRACT_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| {
                warn!("Invalid media type {:?}: {}", file.media_type, e);
                ClientError::generic()
            })?;
        let form = Form::new().part("file", part);

        debug!(endpoint = %self.endpoint, file_name = %file.name, size = file.size(), "Uploading file");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Upload error: {}", e);
                ClientError::generic()
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read reply body: {}", e);
            ClientError::generic()
        })?;

        interpret_reply(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_yields_text() {
        assert_eq!(interpret_reply(200, br#"{"text":"hello"}"#), Ok("hello".to_string()));
        assert_eq!(interpret_reply(200, br#"{"text":""}"#), Ok(String::new()));
    }

    #[test]
    fn error_field_is_surfaced_verbatim_on_success_status() {
        let err = interpret_reply(200, br#"{"text":"x","error":"No file uploaded"}"#).unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded");
    }

    #[test]
    fn non_ok_status_is_always_generic() {
        let err = interpret_reply(500, br#"{"error":"Failed to parse PDF"}"#).unwrap_err();
        assert_eq!(err, ClientError::generic());

        let err = interpret_reply(400, br#"{"error":"No file uploaded"}"#).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let err = interpret_reply(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, ClientError::generic());

        let err = interpret_reply(503, br#"{"text":"ignored"}"#).unwrap_err();
        assert_eq!(err, ClientError::generic());
    }

    #[test]
    fn missing_text_is_generic() {
        assert_eq!(interpret_reply(200, b"{}"), Err(ClientError::generic()));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let transport = HttpTransport::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8080/api/pdf");
    }
}
