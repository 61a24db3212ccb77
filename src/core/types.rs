//! Type aliases and small shared types for domain concepts.
//!
//! Provides semantic names to make function signatures more descriptive.

use std::fmt;

use chrono::{DateTime, Utc};

/// An opaque catalog key (e.g. `config_dev_env`).
///
/// Stable across renames of the underlying file.
pub type CatalogKey = String;

/// A fully qualified remote key (object key, parameter name, secret name).
pub type RemoteKey = String;

/// A backend identity (`s3`, `parameter-store`, `secrets-manager`).
pub type ServiceKey = String;

/// The instant a file was last confirmed in sync.
pub type Synced = DateTime<Utc>;

/// How restrictive a backend is. Lower ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityRating {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl SecurityRating {
    /// Ordinal used for ranking and display.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SecurityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SecurityRating::High => "high",
            SecurityRating::Medium => "medium",
            SecurityRating::Low => "low",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_orders_most_secure_first() {
        let mut ratings = vec![
            SecurityRating::Low,
            SecurityRating::High,
            SecurityRating::Medium,
        ];
        ratings.sort();
        assert_eq!(
            ratings,
            vec![
                SecurityRating::High,
                SecurityRating::Medium,
                SecurityRating::Low
            ]
        );
        assert_eq!(SecurityRating::Medium.rank(), 2);
    }
}
