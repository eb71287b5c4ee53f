#![forbid(unsafe_code)]

use crate::clock::ts_ms_to_label;

const MAX_NAME_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong,
    ContainsControl,
}

impl NameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "name must not be empty",
            Self::TooLong => "name is too long",
            Self::ContainsControl => "name contains control characters",
        }
    }
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Trims and validates a project or checkpoint name.
pub fn normalize_name(value: &str) -> Result<String, NameError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(NameError::ContainsControl);
    }
    Ok(trimmed.to_string())
}

/// Key used when resolving checkpoints by name.
pub fn name_lookup_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn manual_checkpoint_label(created_at_ms: i64) -> String {
    format!("Checkpoint at {}", ts_ms_to_label(created_at_ms))
}

/// `sequence` is the owning branch's capture number; it is never reused on that branch.
pub fn auto_checkpoint_label(trigger_tag: &str, sequence: u64) -> String {
    format!("After {} #{sequence}", trigger_tag.trim())
}
