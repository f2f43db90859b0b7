//! Logical cache keys.

use std::fmt;

/// Fixed logical name of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(&'static str);

impl QueryKey {
    /// The signed-in user's record.
    pub const USER: QueryKey = QueryKey::new("user");
    /// Paginated people listing.
    pub const PEOPLE: QueryKey = QueryKey::new("sw-people");
    /// Paginated species listing.
    pub const SPECIES: QueryKey = QueryKey::new("sw-species");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
