//! Shared response handling

use clearance_domain::CollaboratorError;
use reqwest::{Response, StatusCode};

/// Map a failed request (connect, timeout, body read) to a transport error
pub(crate) fn transport_error(err: reqwest::Error) -> CollaboratorError {
    if err.is_timeout() {
        CollaboratorError::Transport(format!("Request timed out: {}", err))
    } else {
        CollaboratorError::Transport(format!("Request failed: {}", err))
    }
}

/// Map a non-success status to a collaborator error
pub(crate) fn status_error(
    status: StatusCode,
    body: String,
    subject: &str,
    write: bool,
) -> CollaboratorError {
    match status {
        StatusCode::NOT_FOUND => CollaboratorError::NotFound(subject.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY if write => {
            CollaboratorError::RemoteValidation {
                status: status.as_u16(),
                message: body,
            }
        }
        _ => CollaboratorError::Transport(format!("HTTP {}: {}", status, body)),
    }
}

/// Pass a successful response through, or turn it into an error
pub(crate) async fn ensure_success(
    response: Response,
    subject: &str,
    write: bool,
) -> Result<Response, CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(status_error(status, body, subject, write))
}

/// Read a JSON body
pub(crate) async fn read_json(response: Response) -> Result<serde_json::Value, CollaboratorError> {
    let text = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&text)
        .map_err(|e| CollaboratorError::InvalidResponse(format!("Failed to parse response: {}", e)))
}
