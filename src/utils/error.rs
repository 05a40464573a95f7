use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnonError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Action compilation failed: {0}")]
    CompileError(#[from] CompileError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("id column ({column}) out of range, record has {len} columns")]
    IdColumnOutOfRange { column: usize, len: usize },
}

/// 將動作設定編譯成轉換函式時的錯誤，屬於啟動階段的致命錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("can't create an action with name '{name}'")]
    UnknownActionName { name: String },

    #[error("invalid date format '{format}': {reason}")]
    InvalidDateFormat { format: String, reason: String },

    #[error("invalid range spec #{index}: {reason}")]
    InvalidRangeSpec { index: usize, reason: String },

    #[error("action #{position} has no jsonField; every action needs one in JSON mode")]
    MissingFieldKey { position: usize },
}

/// 套用轉換時的錯誤，只影響單筆記錄或單一欄位。
/// 每個變體都保留原始輸入，呼叫端可以原樣寫回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("can't parse '{value}' as a date: {source}")]
    DateParseFailure {
        value: String,
        source: chrono::format::ParseError,
    },

    #[error("can't parse '{value}' as a date: unexpected whitespace")]
    UnexpectedWhitespace { value: String },

    #[error("can't parse '{value}' as a number: {source}")]
    NumberParseFailure {
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error("no range defined for value {value}")]
    NoRangeMatched { value: String },
}

impl ApplyError {
    /// The input that failed, unchanged.
    pub fn unchanged(&self) -> &str {
        match self {
            ApplyError::DateParseFailure { value, .. }
            | ApplyError::UnexpectedWhitespace { value }
            | ApplyError::NumberParseFailure { value, .. }
            | ApplyError::NoRangeMatched { value } => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Output,
}

impl AnonError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnonError::CompileError(_)
            | AnonError::ConfigValidationError { .. }
            | AnonError::InvalidConfigValueError { .. }
            | AnonError::MissingConfigError { .. }
            | AnonError::IdColumnOutOfRange { .. } => ErrorCategory::Configuration,
            AnonError::CsvError(e) if e.is_io_error() => ErrorCategory::Output,
            AnonError::CsvError(_) | AnonError::SerializationError(_) => ErrorCategory::Input,
            AnonError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Output => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AnonError::CompileError(CompileError::UnknownActionName { .. }) => {
                "Use one of: identity, outcode, hash, year, ranges"
            }
            AnonError::CompileError(CompileError::InvalidDateFormat { .. }) => {
                "Use a chrono strftime pattern that includes a year, e.g. %Y%m%d"
            }
            AnonError::CompileError(CompileError::InvalidRangeSpec { .. }) => {
                "Each range needs an output, at least one bound, and at most one of gt/gte and lt/lte"
            }
            AnonError::CompileError(CompileError::MissingFieldKey { .. }) => {
                "Add a jsonField to every action when using json mode"
            }
            AnonError::IdColumnOutOfRange { .. } => {
                "Check csv.idColumn against the number of columns in the input"
            }
            AnonError::ConfigValidationError { .. }
            | AnonError::InvalidConfigValueError { .. }
            | AnonError::MissingConfigError { .. } => {
                "Fix the configuration file and run again"
            }
            AnonError::SerializationError(_) => {
                "Make sure the input (or config) is valid JSON with string values"
            }
            AnonError::CsvError(_) => "Check the input file encoding and the configured delimiter",
            AnonError::IoError(_) => "Check that the input exists and the output path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read the input stream: {}", self),
            ErrorCategory::Output => format!("I/O failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnonError>;
