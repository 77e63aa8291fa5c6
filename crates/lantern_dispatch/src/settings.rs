//! Dispatcher configuration.

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatcherSettings {
    /// Stop trying candidates once this many trials have succeeded.
    ///
    /// Zero behaves as one: dispatch always runs the first success.
    pub max_successes: usize,

    /// Prefix of long-form flags and switches.
    pub long_prefix: String,

    /// Prefix of short-form flags and switches.
    pub short_prefix: String,

    /// Treat tokens such as `-5` or `-2.5` as values rather than shorthands.
    pub negative_numbers_are_values: bool,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            max_successes: 5,
            long_prefix: "--".to_string(),
            short_prefix: "-".to_string(),
            negative_numbers_are_values: true,
        }
    }
}

impl DispatcherSettings {
    /// Executes the first candidate that parses, in static rank order.
    #[must_use]
    pub fn first_match() -> Self {
        Self {
            max_successes: 1,
            ..Self::default()
        }
    }

    /// Tries every candidate before ranking.
    #[must_use]
    pub fn exhaustive() -> Self {
        Self {
            max_successes: usize::MAX,
            ..Self::default()
        }
    }

    /// Builder method to set the success cap. Zero is raised to one.
    #[must_use]
    pub fn with_max_successes(mut self, max: usize) -> Self {
        self.max_successes = max.max(1);
        self
    }

    /// Builder method to set the long flag prefix.
    #[must_use]
    pub fn with_long_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.long_prefix = prefix.into();
        self
    }

    /// Builder method to set the short flag prefix.
    #[must_use]
    pub fn with_short_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.short_prefix = prefix.into();
        self
    }

    /// Builder method to control negative number handling.
    #[must_use]
    pub fn with_negative_numbers_are_values(mut self, enabled: bool) -> Self {
        self.negative_numbers_are_values = enabled;
        self
    }
}
