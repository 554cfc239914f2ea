use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Page interaction failed: {message}")]
    PageError { message: String },

    #[error("Assertion failed: {message}")]
    AssertionFailed { message: String },

    #[error("Report error: {message}")]
    ReportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Page,
    Assertion,
    Report,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HarnessError {
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::PageError { .. } => ErrorCategory::Page,
            Self::AssertionFailed { .. } => ErrorCategory::Assertion,
            Self::ReportError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Report
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Assertion => ErrorSeverity::Low,
            ErrorCategory::Page => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Report => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度對應的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "Check the suite TOML file for syntax errors",
            Self::InvalidConfigValueError { .. } => {
                "Fix the highlighted field in the suite configuration"
            }
            Self::MissingConfigError { .. } => "Add the missing field to the suite configuration",
            Self::PageError { .. } => "Verify the page catalogue matches the scenario steps",
            Self::AssertionFailed { .. } => "Inspect the failure snapshot in the reports directory",
            Self::ReportError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the report directory is writable"
            }
            Self::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Suite configuration problem: {}", self),
            ErrorCategory::Page => format!("Could not interact with the cart page: {}", self),
            ErrorCategory::Assertion => format!("A check did not hold: {}", self),
            ErrorCategory::Report => format!("Could not write reports: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
