#![forbid(unsafe_code)]

pub mod engine;
pub mod policy;
pub mod session;

pub use session::*;

pub mod ids {
    use serde::{Deserialize, Serialize};

    /// Opaque principal reference handed out by the identity provider.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct OwnerId(String);

    impl OwnerId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
            let value = value.into();
            validate_owner_id(&value)?;
            Ok(Self(value))
        }
    }

    impl std::fmt::Display for OwnerId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl TryFrom<String> for OwnerId {
        type Error = OwnerIdError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_new(value)
        }
    }

    impl From<OwnerId> for String {
        fn from(value: OwnerId) -> Self {
            value.0
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum OwnerIdError {
        Empty,
        TooLong,
        ContainsControl,
    }

    impl OwnerIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "owner id must not be empty",
                Self::TooLong => "owner id is too long",
                Self::ContainsControl => "owner id contains control characters",
            }
        }
    }

    impl std::fmt::Display for OwnerIdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
        if value.trim().is_empty() {
            return Err(OwnerIdError::Empty);
        }
        if value.chars().count() > 128 {
            return Err(OwnerIdError::TooLong);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(OwnerIdError::ContainsControl);
        }
        Ok(())
    }
}

pub mod clock {
    use ::time::OffsetDateTime;
    use ::time::macros::format_description;

    pub fn now_ms() -> i64 {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let ms = nanos / 1_000_000i128;
        if ms <= 0 {
            0
        } else if ms >= i64::MAX as i128 {
            i64::MAX
        } else {
            ms as i64
        }
    }

    /// `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn ts_ms_to_label(ts_ms: i64) -> String {
        let nanos = (ts_ms as i128) * 1_000_000i128;
        let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        dt.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| "1970-01-01 00:00:00".to_string())
    }
}
