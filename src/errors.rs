use axum::http::StatusCode;
use std::path::PathBuf;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed duration {input:?}, expected \"<H>h <M>m\"")]
pub struct MalformedDurationError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date key {input:?}, expected YYYY-MM-DD")]
pub struct InvalidDateKeyError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecordError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("{field}: {source}")]
    Duration {
        field: &'static str,
        #[source]
        source: MalformedDurationError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} reported an error: {message}")]
    Rejected { url: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PersistFailure {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    Invalid(#[from] InvalidRecordError),
    #[error(transparent)]
    Persist(#[from] PersistFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("day {day} is outside {year}-{month:02} (1..={last})")]
    DayOutOfRange {
        year: i32,
        month: u32,
        day: u32,
        last: u32,
    },

    #[error("month {0} is not between 1 and 12")]
    InvalidMonth(u32),

    #[error("year {0} is not between 0 and 9999")]
    YearOutOfRange(i32),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        error!("internal error: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl From<InvalidRecordError> for AppError {
    fn from(err: InvalidRecordError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::Invalid(err) => err.into(),
            MergeError::Persist(err) => err.into(),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<FetchFailure> for AppError {
    fn from(err: FetchFailure) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<PersistFailure> for AppError {
    fn from(err: PersistFailure) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
