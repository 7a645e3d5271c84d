//! Registry configuration.

/// How the registry mints new session ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// `<prefix>1`, `<prefix>2`, ... from a counter held under the
    /// registry lock. Predictable, easy to read in logs.
    #[default]
    Sequential,

    /// `<prefix>` followed by 16 hex characters (64 random bits). Use this
    /// when session ids should not be guessable from one another.
    Random,
}

/// Configuration for a [`SessionRegistry`](crate::SessionRegistry).
///
/// ```rust
/// use noughts_session::{IdStrategy, RegistryConfig};
///
/// let config = RegistryConfig {
///     id_strategy: IdStrategy::Random,
///     ..RegistryConfig::default()
/// };
/// assert_eq!(config.id_prefix, "game-");
/// ```
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Prepended to every generated id. Default: `"game-"`.
    pub id_prefix: String,

    /// Default: [`IdStrategy::Sequential`].
    pub id_strategy: IdStrategy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_prefix: "game-".to_string(),
            id_strategy: IdStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.id_prefix, "game-");
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
    }
}
