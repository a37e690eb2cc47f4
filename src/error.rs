use thiserror::Error;

pub type Xls2JsonResult<T> = Result<T, Xls2JsonError>;

#[derive(Error, Debug)]
pub enum Xls2JsonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Sheet '{name}' not found. Available sheets: {}", .available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("Label '{label}' not found in header row. Available labels: {}", .available.join(", "))]
    LabelNotFound { label: String, available: Vec<String> },

    /// A placeholder survived label extraction without a value in the row
    /// context. Indicates a bug, not bad input.
    #[error("Unresolved placeholder '{{{name}}}' (internal error: label extraction missed it)")]
    UnresolvedPlaceholder { name: String },

    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    #[error("Invalid format spec '{spec}': {reason}")]
    FormatSpec { spec: String, reason: String },
}

impl Xls2JsonError {
    pub(crate) fn format_spec(spec: &str, reason: impl Into<String>) -> Self {
        Xls2JsonError::FormatSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}
