// ── Profile domain type ──

use serde::{Deserialize, Serialize};

use super::ids::ProfileId;

/// A role a user can hold (e.g. "admin", "user"). Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
}

impl Profile {
    /// Case-insensitive name comparison used by filters and CLI lookups.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}
