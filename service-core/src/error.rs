use std::collections::VecDeque;

use serde_json::Value;
use thiserror::Error;

/// Tag for the classified error kinds, for exhaustive handling and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Env,
    Network,
    Auth,
    Rls,
    Service,
    Unknown,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Rls => "rls",
            Self::Service => "service",
            Self::Unknown => "unknown",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Env(String),

    #[error("Network error: {0}")]
    Network(anyhow::Error),

    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Rls(String),

    #[error("Service error [{code}]: {message}")]
    Service {
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Unknown(anyhow::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Env(_) => ErrorKind::Env,
            Self::Network(_) => ErrorKind::Network,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Rls(_) => ErrorKind::Rls,
            Self::Service { .. } => ErrorKind::Service,
            Self::Unknown(_) => ErrorKind::Unknown,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Remediation hint shown alongside the message.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Env => "Check the service environment variables and restart",
            ErrorKind::Network => "Check connectivity to the data backend and retry",
            ErrorKind::Auth => "Sign in again; the session is missing or expired",
            ErrorKind::Rls => "The signed-in role lacks access to one of the source tables",
            ErrorKind::Service => "The data backend rejected the request; see details",
            ErrorKind::Unknown => "Unexpected failure; see the logged message",
            ErrorKind::Validation => "Fix the reported input and retry",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Env(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Unknown(anyhow::Error::new(err))
    }
}

/// Map a sqlx failure onto the classified taxonomy.
///
/// Permission errors (`42501`) mean the request reached the backend but was
/// rejected by row-level security; authentication codes mean the session is
/// bad. Transport-level failures are Network. Everything else structured from
/// the backend is Service, carrying the backend's detail/hint payload.
pub fn classify_sqlx(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Io(e) => AppError::Network(anyhow::Error::new(e)),
        sqlx::Error::Tls(e) => AppError::Network(anyhow::anyhow!(e)),
        sqlx::Error::PoolTimedOut => AppError::Network(anyhow::anyhow!(
            "timed out waiting for a backend connection"
        )),
        sqlx::Error::PoolClosed => {
            AppError::Network(anyhow::anyhow!("backend connection pool is closed"))
        }
        sqlx::Error::Configuration(e) => AppError::Env(e.to_string()),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("42501") => AppError::Rls(db.message().to_string()),
            Some("28000") | Some("28P01") => AppError::Auth(db.message().to_string()),
            code => {
                let pg = db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>();
                let detail = pg.and_then(|p| p.detail()).map(str::to_string);
                let hint = pg.and_then(|p| p.hint()).map(str::to_string);
                let details = if detail.is_none() && hint.is_none() {
                    None
                } else {
                    Some(serde_json::json!({ "detail": detail, "hint": hint }))
                };
                AppError::Service {
                    code: code.unwrap_or("unclassified").to_string(),
                    message: db.message().to_string(),
                    details,
                }
            }
        },
        other => AppError::Unknown(anyhow::Error::new(other)),
    }
}

/// One entry in the error log, flattened for display.
#[derive(Debug, Clone)]
pub struct LoggedError {
    pub kind: ErrorKind,
    pub message: String,
    pub hint: &'static str,
}

impl From<&AppError> for LoggedError {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            hint: err.hint(),
        }
    }
}

/// Bounded, most-recent-first log of classified errors.
///
/// Pushing past the cap drops the oldest entry.
#[derive(Debug)]
pub struct ErrorLog {
    entries: VecDeque<LoggedError>,
    cap: usize,
}

impl ErrorLog {
    pub const DEFAULT_CAP: usize = 20;

    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, err: &AppError) {
        self.entries.push_front(LoggedError::from(err));
        self.entries.truncate(self.cap);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LoggedError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAP)
    }
}
