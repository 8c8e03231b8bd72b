//! Deferred cleanup actions owned by a call frame.

use std::fmt;
use tracing::trace;

type Action = Box<dyn FnOnce() + Send>;

/// A stack of cleanup actions run in reverse registration order.
///
/// Pending actions run exactly once: through [`CleanupStack::run`], or when
/// the stack is dropped (early return, panic unwinding, or a dropped
/// future). [`CleanupStack::dismiss`] discards them without running.
#[derive(Default)]
pub struct CleanupStack {
    actions: Vec<(&'static str, Action)>,
}

impl fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupStack")
            .field(
                "actions",
                &self.actions.iter().map(|(label, _)| *label).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CleanupStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action.
    pub fn defer(&mut self, label: &'static str, action: impl FnOnce() + Send + 'static) {
        self.actions.push((label, Box::new(action)));
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run all pending actions, most recent first.
    pub fn run(mut self) {
        self.run_pending();
    }

    /// Discard all pending actions without running them.
    pub fn dismiss(mut self) {
        let labels: Vec<_> = self.actions.drain(..).map(|(label, _)| label).collect();
        trace!(?labels, "dismissed cleanup actions");
    }

    fn run_pending(&mut self) {
        while let Some((label, action)) = self.actions.pop() {
            trace!(label, "running cleanup action");
            action();
        }
    }
}

impl Drop for CleanupStack {
    fn drop(&mut self) {
        self.run_pending();
    }
}
