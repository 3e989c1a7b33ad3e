//! Resolver configuration.

/// Settings that shape resolution output.
///
/// Passed by reference to every factory constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Replace constant evaluators with their value at resolution time.
    pub constant_folding: bool,
    /// Wrap memoizable evaluators in a per-row cache.
    pub memoization: bool,
    /// Fractional digits kept when rendering a double as text.
    pub double_to_str_scale: usize,
    /// Fractional digits kept when rendering a float as text.
    pub float_to_str_scale: usize,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.constant_folding = enabled;
        self
    }

    pub fn with_memoization(mut self, enabled: bool) -> Self {
        self.memoization = enabled;
        self
    }

    pub fn with_double_to_str_scale(mut self, scale: usize) -> Self {
        self.double_to_str_scale = scale;
        self
    }

    pub fn with_float_to_str_scale(mut self, scale: usize) -> Self {
        self.float_to_str_scale = scale;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            constant_folding: true,
            memoization: true,
            double_to_str_scale: 12,
            float_to_str_scale: 4,
        }
    }
}
