//! Execution state consulted during resolution.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::bind::BindVariables;

/// Per-execution state the resolver reads and scopes.
///
/// The resolver never shares a context across threads; implementations need
/// no internal locking.
pub trait ExecutionContext {
    /// The bind variable table, when the caller provides one.
    fn bind_variables(&self) -> Option<&BindVariables>;

    /// True while resolving inside a window function clause.
    fn is_window_context(&self) -> bool;

    fn allow_non_deterministic_functions(&self) -> bool;

    /// Scope a new "timestamp required" value. Every push is paired with a
    /// [`pop_timestamp_required`](Self::pop_timestamp_required).
    fn push_timestamp_required(&mut self, required: bool);

    fn pop_timestamp_required(&mut self);

    fn is_timestamp_required(&self) -> bool;

    /// Execution start time in microseconds since the epoch.
    fn now(&self) -> i64;
}

/// Default [`ExecutionContext`].
#[derive(Debug, Clone)]
pub struct SqlExecutionContext {
    bind_variables: Option<BindVariables>,
    window_depth: usize,
    allow_non_deterministic: bool,
    timestamp_required: Vec<bool>,
    now: i64,
}

impl SqlExecutionContext {
    /// A context with an empty bind variable table, non-deterministic
    /// functions allowed, and `now` taken from the system clock.
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_micros() as i64);
        Self {
            bind_variables: Some(BindVariables::new()),
            window_depth: 0,
            allow_non_deterministic: true,
            timestamp_required: Vec::new(),
            now,
        }
    }

    pub fn with_bind_variables(mut self, bind_variables: BindVariables) -> Self {
        self.bind_variables = Some(bind_variables);
        self
    }

    pub fn without_bind_variables(mut self) -> Self {
        self.bind_variables = None;
        self
    }

    pub fn with_non_deterministic_functions(mut self, allow: bool) -> Self {
        self.allow_non_deterministic = allow;
        self
    }

    pub fn with_now(mut self, micros: i64) -> Self {
        self.now = micros;
        self
    }

    /// Enter a window function clause. Clauses nest.
    pub fn enter_window_context(&mut self) {
        self.window_depth += 1;
    }

    pub fn exit_window_context(&mut self) {
        self.window_depth = self.window_depth.saturating_sub(1);
    }

    /// Depth of the timestamp-required scope stack.
    pub fn timestamp_required_depth(&self) -> usize {
        self.timestamp_required.len()
    }
}

impl Default for SqlExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for SqlExecutionContext {
    fn bind_variables(&self) -> Option<&BindVariables> {
        self.bind_variables.as_ref()
    }

    fn is_window_context(&self) -> bool {
        self.window_depth > 0
    }

    fn allow_non_deterministic_functions(&self) -> bool {
        self.allow_non_deterministic
    }

    fn push_timestamp_required(&mut self, required: bool) {
        self.timestamp_required.push(required);
    }

    fn pop_timestamp_required(&mut self) {
        self.timestamp_required.pop();
    }

    fn is_timestamp_required(&self) -> bool {
        self.timestamp_required.last().copied().unwrap_or(false)
    }

    fn now(&self) -> i64 {
        self.now
    }
}
