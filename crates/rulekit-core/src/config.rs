//! Per-parse resource limits.

/// Bounds applied to a single parse.
///
/// Deeply nested grammars recurse on the call stack and ambiguous `any`
/// chains can backtrack exponentially; both are cut off here rather than
/// inside the operators. Exceeding a limit raises a [`Fault`](crate::Fault)
/// that no combinator catches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nested rule applications.
    pub max_depth: Option<usize>,
    /// Maximum number of rule applications for the whole parse.
    pub max_steps: Option<usize>,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// No limits at all. Stack overflow becomes the caller's problem.
    pub const fn unbounded() -> Self {
        Self {
            max_depth: None,
            max_steps: None,
        }
    }

    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub const fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
            max_steps: None,
        }
    }
}
