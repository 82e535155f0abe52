use serde::{Deserialize, Serialize};

/// Default budget for clean read entries.
pub const DEFAULT_LIMIT_READS: usize = 512 * 1024;

/// Default budget for dirty entries between commits.
pub const DEFAULT_LIMIT_WRITES: usize = 64 * 1024;

/// Budgets for a [`StateCache`](crate::StateCache).
///
/// Both limits count entries, not bytes. The cache allocates
/// `limit_reads + limit_writes` queue slots up front and never grows them:
/// read entries past the read budget are evicted, while staging more than
/// `limit_writes` dirty entries without committing is a caller error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateCacheConfig {
    /// Maximum number of clean read entries to retain.
    pub limit_reads: usize,
    /// Maximum number of dirty entries to accumulate between commits.
    pub limit_writes: usize,
}

impl Default for StateCacheConfig {
    fn default() -> Self {
        Self { limit_reads: DEFAULT_LIMIT_READS, limit_writes: DEFAULT_LIMIT_WRITES }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: StateCacheConfig = serde_json::from_str("{\"limit_writes\": 100}").unwrap();
        assert_eq!(config.limit_reads, DEFAULT_LIMIT_READS);
        assert_eq!(config.limit_writes, 100);

        let config: StateCacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StateCacheConfig::default());
    }
}
