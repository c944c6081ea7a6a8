use crate::domain::model::MarkTarget;
use thiserror::Error;

/// Failure of the client-credentials exchange.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token request could not be sent: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("token response is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("token response did not contain an access token")]
    MissingToken,
}

/// Failure of a single call against the grading API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request could not be sent: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API response could not be parsed: {0}")]
    MalformedBody(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum GraderError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("project {project_id} is not a known pool module")]
    UnknownProjectError { project_id: String },

    #[error("could not acquire access token: {0}")]
    AuthenticationError(#[from] AuthError),

    #[error("{operation} failed: {source}")]
    RemoteError {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error("user {user_id} has no recorded attempt on project {project_id}")]
    EmptyResultError { user_id: String, project_id: String },

    #[error("pool module {child_id} (project {project_id}) is not validated for user {user_id}")]
    UnvalidatedChildError {
        user_id: String,
        child_id: String,
        project_id: i64,
    },

    #[error("team {team_id} has no projects_user attached")]
    MissingProjectsUserError { team_id: i64 },

    #[error("updating {target} failed, nothing was written: {source}")]
    CommitError {
        target: MarkTarget,
        #[source]
        source: ApiError,
    },

    #[error("team {team_id} was updated but projects_user {projects_user_id} was not: {source}")]
    PartialUpdateError {
        team_id: i64,
        projects_user_id: i64,
        #[source]
        source: ApiError,
    },

    #[error("Logging setup failed: {message}")]
    LoggingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Eligibility,
    Consistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 遠端暫時性錯誤，稍後重試可能成功
    Medium,
    /// 設定或資料錯誤，需要人工處理
    High,
    /// 遠端資料已不一致
    Critical,
}

impl GraderError {
    pub fn remote(operation: impl Into<String>, source: ApiError) -> Self {
        GraderError::RemoteError {
            operation: operation.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GraderError::ConfigError { .. }
            | GraderError::InvalidConfigValueError { .. }
            | GraderError::MissingConfigError { .. }
            | GraderError::IoError(_)
            | GraderError::UnknownProjectError { .. }
            | GraderError::LoggingError { .. } => ErrorCategory::Configuration,
            GraderError::AuthenticationError(_) => ErrorCategory::Authentication,
            GraderError::RemoteError { .. } | GraderError::CommitError { .. } => {
                ErrorCategory::Network
            }
            GraderError::EmptyResultError { .. }
            | GraderError::UnvalidatedChildError { .. }
            | GraderError::MissingProjectsUserError { .. } => ErrorCategory::Eligibility,
            GraderError::PartialUpdateError { .. } => ErrorCategory::Consistency,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Consistency => ErrorSeverity::Critical,
            ErrorCategory::Configuration
            | ErrorCategory::Authentication
            | ErrorCategory::Eligibility => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GraderError::ConfigError { .. }
            | GraderError::InvalidConfigValueError { .. }
            | GraderError::MissingConfigError { .. } => {
                "Check grader.toml and the pool list file".to_string()
            }
            GraderError::IoError(_) => "Check that the file exists and is readable".to_string(),
            GraderError::UnknownProjectError { .. } => {
                "Only child modules listed in the pool list can be checked".to_string()
            }
            GraderError::AuthenticationError(_) => {
                "Verify client_id / client_secret and that the application is still active"
                    .to_string()
            }
            GraderError::RemoteError { .. } | GraderError::CommitError { .. } => {
                "The API may be unavailable or rate limiting, try again later".to_string()
            }
            GraderError::EmptyResultError { .. } | GraderError::UnvalidatedChildError { .. } => {
                "The user must validate every pool module before the parent can be graded"
                    .to_string()
            }
            GraderError::MissingProjectsUserError { .. } => {
                "Inspect the parent team on the intranet, it has no registered user".to_string()
            }
            GraderError::PartialUpdateError {
                team_id,
                projects_user_id,
                ..
            } => format!(
                "Team {} already holds the new mark, fix projects_user {} by hand or re-run",
                team_id, projects_user_id
            ),
            GraderError::LoggingError { .. } => {
                "Check the [logging] section and the log file permissions".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid setup: {}", self),
            ErrorCategory::Authentication => format!("Authentication failed: {}", self),
            ErrorCategory::Network => format!("Intranet API error: {}", self),
            ErrorCategory::Eligibility => format!("Cannot grade this pool: {}", self),
            ErrorCategory::Consistency => format!("Inconsistent update: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraderError>;
