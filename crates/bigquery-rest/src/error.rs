use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use http::StatusCode;

use crate::resources::ErrorProto;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] gcp_auth::Error),
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    BadRequest(ErrorPayload),
    #[error(transparent)]
    NotAuthorized(ErrorPayload),
    #[error(transparent)]
    NotFound(ErrorPayload),
    #[error(transparent)]
    AlreadyExists(ErrorPayload),
    #[error(transparent)]
    Server(ErrorPayload),
    /// A job that ran to completion, but completed by failing.
    #[error("job failed: {main}")]
    Job {
        main: ErrorProto,
        misc: Vec<ErrorProto>,
    },
    #[error("job '{job_id}' still not done after {timeout:?}")]
    Timeout {
        job_id: Box<str>,
        timeout: std::time::Duration,
    },
    /// The service omitted a field we can't operate without.
    #[error("missing expected field '{field}' in {resource} response")]
    MissingField {
        resource: &'static str,
        field: &'static str,
    },
}

/// Checks the status code, classifying anything non-2xx into the payload
/// carrying [`Error`] variants.
pub(crate) async fn validate_response(
    response: reqwest::Response,
) -> crate::Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let payload = ErrorPayload::from_raw_parts(status, response.bytes().await?);

    Err(match status.as_u16() {
        401 | 403 => Error::NotAuthorized(payload),
        404 => Error::NotFound(payload),
        409 => Error::AlreadyExists(payload),
        400..=499 => Error::BadRequest(payload),
        _ => Error::Server(payload),
    })
}

/// The error body most Google REST APIs respond with, unwrapped from its
/// `{"error": ...}` envelope.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ErrorPayload {
    code: u16,
    message: Box<str>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

impl ErrorPayload {
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        &self.errors
    }

    /// Builds the most descriptive payload the raw response bytes support.
    /// Bodies that aren't the documented JSON envelope get carried along as
    /// plain text rather than dropped.
    pub(crate) fn from_raw_parts(status: StatusCode, payload: Bytes) -> Self {
        #[derive(serde::Deserialize)]
        struct NestedPayload {
            error: ErrorPayload,
        }

        match payload.trim_ascii_start().first().copied() {
            Some(b'{') => match serde_json::from_slice::<NestedPayload>(&payload) {
                Ok(NestedPayload { error }) => error,
                Err(error) => {
                    tracing::warn!(?error, "unexpected error response shape, keeping raw text");
                    Self::from_message(status, payload)
                }
            },
            Some(b'[') => match serde_json::from_slice::<Vec<ErrorDetail>>(&payload) {
                Ok(errors) => Self::from_errors(status, errors),
                Err(_) => Self::from_message(status, payload),
            },
            Some(_) => Self::from_message(status, payload),
            None => Self::from_status(status),
        }
    }

    fn from_status(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            message: status.to_string().into_boxed_str(),
            errors: Vec::new(),
        }
    }

    fn from_message(status: StatusCode, payload: Bytes) -> Self {
        Self {
            code: status.as_u16(),
            message: String::from_utf8_lossy(&payload).into_owned().into_boxed_str(),
            errors: Vec::new(),
        }
    }

    fn from_errors(status: StatusCode, errors: Vec<ErrorDetail>) -> Self {
        let message = match errors.first() {
            Some(detail) => detail.message.clone(),
            None => status.to_string().into_boxed_str(),
        };

        Self {
            code: status.as_u16(),
            message,
            errors,
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut itoa_buf = itoa::Buffer::new();

        f.write_str("error code ")?;
        f.write_str(itoa_buf.format(self.code))?;
        f.write_str(": ")?;

        match self.errors.as_slice() {
            [] => f.write_str(&self.message),
            [detail] => write!(f, "{detail}"),
            [detail, rest @ ..] => {
                write!(f, "{detail} and ")?;
                f.write_str(itoa_buf.format(rest.len()))?;
                f.write_str(" others...")
            }
        }
    }
}

impl std::error::Error for ErrorPayload {}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ErrorDetail {
    message: Box<str>,
    reason: Box<str>,
    /// Usually `domain`/`location`/`locationType`, but left open ended.
    #[serde(flatten)]
    misc: HashMap<Box<str>, serde_json::Value>,
}

impl ErrorDetail {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.reason)
    }
}
