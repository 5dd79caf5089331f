use std::fmt;

/// Dataset-level failures. Row-level problems never surface here; they are
/// counted in the normalization report instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Fetch {
        dataset: String,
        reason: String,
    },
    Schema {
        dataset: String,
        reason: String,
        columns: Vec<String>,
    },
    Encoding {
        dataset: String,
        file: String,
        reason: String,
    },
    Io {
        dataset: String,
        reason: String,
    },
}

impl DatasetError {
    pub fn fetch(dataset: &str, reason: impl Into<String>) -> Self {
        DatasetError::Fetch {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn schema(dataset: &str, reason: impl Into<String>, columns: &[String]) -> Self {
        DatasetError::Schema {
            dataset: dataset.to_string(),
            reason: reason.into(),
            columns: columns.to_vec(),
        }
    }

    pub fn io(dataset: &str, reason: impl Into<String>) -> Self {
        DatasetError::Io {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dataset(&self) -> &str {
        match self {
            DatasetError::Fetch { dataset, .. }
            | DatasetError::Schema { dataset, .. }
            | DatasetError::Encoding { dataset, .. }
            | DatasetError::Io { dataset, .. } => dataset,
        }
    }

    /// Fetch failures may succeed on retry or fall back to a cached copy.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DatasetError::Fetch { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DatasetError::Fetch { .. } => "fetch",
            DatasetError::Schema { .. } => "schema",
            DatasetError::Encoding { .. } => "encoding",
            DatasetError::Io { .. } => "io",
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Fetch { dataset, reason } => {
                write!(f, "fetch failed for dataset {dataset}: {reason}")
            }
            DatasetError::Schema {
                dataset,
                reason,
                columns,
            } => write!(
                f,
                "schema error in dataset {dataset}: {reason} (available columns: [{}])",
                columns.join(", ")
            ),
            DatasetError::Encoding {
                dataset,
                file,
                reason,
            } => write!(
                f,
                "dataset {dataset}: file {file} is not valid UTF-8: {reason}"
            ),
            DatasetError::Io { dataset, reason } => write!(f, "dataset {dataset}: {reason}"),
        }
    }
}

impl std::error::Error for DatasetError {}
