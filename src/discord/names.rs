//! Guild member display-name cache.

use crate::cache::TtlCache;
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;

/// Remembers member display names per guild for a bounded time.
///
/// Names arrive with invocations; ids with no fresh entry render as
/// Discord mentions, which clients resolve on their own.
pub struct DisplayNameCache<C>
where
    C: Clock + Send + Sync,
{
    names: TtlCache<(String, String), String>,
    clock: Arc<C>,
}

impl<C> DisplayNameCache<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta, clock: Arc<C>) -> Self {
        Self {
            names: TtlCache::new(ttl),
            clock,
        }
    }

    /// Stores the display name of `user_id` in `guild_id`.
    ///
    /// Blank names are ignored.
    pub fn remember(&self, guild_id: &str, user_id: &str, name: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        self.names.insert(
            (guild_id.to_owned(), user_id.to_owned()),
            trimmed.to_owned(),
            self.clock.utc(),
        );
    }

    /// Returns the cached name, if fresh.
    #[must_use]
    pub fn lookup(&self, guild_id: &str, user_id: &str) -> Option<String> {
        self.names.get(
            &(guild_id.to_owned(), user_id.to_owned()),
            self.clock.utc(),
        )
    }

    /// Returns the cached name or a `<@id>` mention.
    #[must_use]
    pub fn display(&self, guild_id: &str, user_id: &str) -> String {
        self.lookup(guild_id, user_id)
            .unwrap_or_else(|| format!("<@{user_id}>"))
    }
}
