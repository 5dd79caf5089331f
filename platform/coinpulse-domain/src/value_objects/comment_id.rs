use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentId {
    Known(String),
    Missing,
}

impl CommentId {
    pub fn from_cell(value: Option<&str>) -> Self {
        match value {
            Some(raw) if !is_null_cell(raw) => CommentId::Known(raw.trim().to_string()),
            _ => CommentId::Missing,
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            CommentId::Known(id) => Some(id.as_str()),
            CommentId::Missing => None,
        }
    }
}

impl Serialize for CommentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CommentId::Known(id) => serializer.serialize_str(id),
            CommentId::Missing => serializer.serialize_str("no_identifier"),
        }
    }
}

/// Empty cells and the null spellings pandas writes into exports.
pub fn is_null_cell(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ["nan", "none", "null", "nat"]
            .iter()
            .any(|null| trimmed.eq_ignore_ascii_case(null))
}
