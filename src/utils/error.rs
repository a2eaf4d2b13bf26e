use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Missing {what}: {}", path.display())]
    MissingInput { what: String, path: PathBuf },

    #[error("Could not detect version from plugin header or constants in {}", path.display())]
    VersionNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("Fragment archiving failed and was rolled back: {message}")]
    Rollback { message: String },
}

/// 錯誤嚴重程度：Fatal 會中止整個流程，Soft 只記錄並繼續
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Soft,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    FileSystem,
    Network,
    Archive,
    Data,
    VersionControl,
}

impl ReleaseError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReleaseError::HttpError(_)
            | ReleaseError::Fetch { .. }
            | ReleaseError::Git { .. }
            | ReleaseError::SerializationError(_) => ErrorSeverity::Soft,
            _ => ErrorSeverity::Fatal,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::MissingInput { .. } | ReleaseError::VersionNotFound { .. } => {
                ErrorCategory::Input
            }
            ReleaseError::ConfigError { .. }
            | ReleaseError::InvalidConfigValue { .. }
            | ReleaseError::ConfigValidation { .. }
            | ReleaseError::RegexError(_) => ErrorCategory::Configuration,
            ReleaseError::IoError(_) | ReleaseError::Rollback { .. } => ErrorCategory::FileSystem,
            ReleaseError::HttpError(_) | ReleaseError::Fetch { .. } => ErrorCategory::Network,
            ReleaseError::ZipError(_) => ErrorCategory::Archive,
            ReleaseError::SerializationError(_) => ErrorCategory::Data,
            ReleaseError::Git { .. } => ErrorCategory::VersionControl,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReleaseError::MissingInput { .. } => {
                "Run from the repository root or pass the plugin directory explicitly"
            }
            ReleaseError::VersionNotFound { .. } => {
                "Add a 'Version:' line to the plugin header or define a *_VERSION constant"
            }
            ReleaseError::ConfigError { .. }
            | ReleaseError::InvalidConfigValue { .. }
            | ReleaseError::ConfigValidation { .. }
            | ReleaseError::RegexError(_) => "Check the command line flags and the release TOML file",
            ReleaseError::IoError(_) => "Check file permissions and available disk space",
            ReleaseError::Rollback { .. } => {
                "Fragments were restored to unreleased; fix the destination directory and re-run"
            }
            ReleaseError::HttpError(_) | ReleaseError::Fetch { .. } => {
                "Check the memory base URL and network connectivity"
            }
            ReleaseError::ZipError(_) => "Make sure the dist directory is writable",
            ReleaseError::SerializationError(_) => "Check the JSON document for syntax errors",
            ReleaseError::Git { .. } => "Run the git commands manually and inspect their output",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Cannot build release: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::FileSystem => format!("File system problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Archive => format!("Could not write the ZIP archive: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::VersionControl => format!("Tagging problem: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match (self.severity(), self.category()) {
            (ErrorSeverity::Soft, _) => 0,
            (ErrorSeverity::Fatal, ErrorCategory::Configuration) => 2,
            (ErrorSeverity::Fatal, ErrorCategory::FileSystem) => 3,
            (ErrorSeverity::Fatal, _) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
