//! Suggestion sources for autocompletion.

use crate::context::ExecutionContext;

/// Produces completion candidates for a parameter.
///
/// `partial` is the word being typed. Implementations may ignore it; the
/// completer filters by prefix afterwards.
pub trait SuggestionProvider: Send + Sync {
    /// Returns candidate completions.
    fn suggest(&self, partial: &str, context: &ExecutionContext<'_>) -> Vec<String>;
}

impl<F> SuggestionProvider for F
where
    F: Fn(&str, &ExecutionContext<'_>) -> Vec<String> + Send + Sync,
{
    fn suggest(&self, partial: &str, context: &ExecutionContext<'_>) -> Vec<String> {
        self(partial, context)
    }
}

/// A fixed list of suggestions.
#[derive(Clone, Debug, Default)]
pub struct StaticSuggestions(Vec<String>);

impl StaticSuggestions {
    /// Creates a provider that always offers `items`.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }
}

impl SuggestionProvider for StaticSuggestions {
    fn suggest(&self, _partial: &str, _context: &ExecutionContext<'_>) -> Vec<String> {
        self.0.clone()
    }
}
