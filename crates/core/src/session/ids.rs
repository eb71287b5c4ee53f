#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = RowIdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                parse_row_id(value, $label).map(Self)
            }
        }
    };
}

row_id!(
    /// Store-assigned, monotonically increasing project identifier.
    ProjectId,
    "project"
);
row_id!(BranchId, "branch");
row_id!(CheckpointId, "checkpoint");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowIdError {
    Empty,
    NotPositive,
    InvalidDigits,
}

impl RowIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "id must not be empty",
            Self::NotPositive => "id must be a positive integer",
            Self::InvalidDigits => "id must be decimal digits",
        }
    }
}

impl std::fmt::Display for RowIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for RowIdError {}

/// Accepts `42` as well as the display form `checkpoint#42`.
fn parse_row_id(value: &str, label: &str) -> Result<i64, RowIdError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix('#'))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(RowIdError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RowIdError::InvalidDigits);
    }
    let parsed = digits
        .parse::<i64>()
        .map_err(|_| RowIdError::InvalidDigits)?;
    if parsed <= 0 {
        return Err(RowIdError::NotPositive);
    }
    Ok(parsed)
}
