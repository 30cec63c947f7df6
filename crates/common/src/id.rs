//! ID generation utilities.

use rand::distributions::{Alphanumeric, DistString};
use ulid::Ulid;
use uuid::Uuid;

/// Length of a recipe short code.
pub const SHORT_CODE_LEN: usize = 6;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are lexicographically sortable, so ordering by ID approximates
    /// ordering by creation time.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an API token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component in tokens
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a recipe short code (URL-safe, [`SHORT_CODE_LEN`] characters).
    #[must_use]
    pub fn generate_short_code(&self) -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), SHORT_CODE_LEN)
    }
}
