//! The `{...}` scope stack.
//!
//! Every `{` pushes a copy of the current formatting state and every `}`
//! pops it, restoring the parent's state. The one exception is paragraph
//! formatting, which AutoCAD does not treat as brace-scoped: if the popped
//! scope changed the paragraph properties, the change overwrites the
//! parent's on exit. The root state is never popped, so a stray `}` is a
//! no-op.

use crate::state::FormattingState;

/// A stack of formatting state snapshots, one per open scope.
///
/// The stack always contains at least the root state.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ScopeStack {
    states: Vec<FormattingState>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        ScopeStack::new(FormattingState::default())
    }
}

impl ScopeStack {
    /// Create a stack whose root is `root`.
    pub fn new(root: FormattingState) -> ScopeStack {
        ScopeStack { states: vec![root] }
    }

    /// Enter a scope: push an independent copy of the current state.
    pub fn push(&mut self) {
        let copy = self.current().clone();
        self.states.push(copy);
    }

    /// Leave a scope: drop the top state and restore the parent, with the
    /// popped scope's paragraph properties propagated upward.
    ///
    /// Popping with only the root on the stack is a no-op.
    pub fn pop(&mut self) {
        if self.states.len() <= 1 {
            return;
        }
        let popped = self.states.pop().unwrap();
        let parent = self.states.last_mut().unwrap();
        if popped.paragraph != parent.paragraph {
            parent.paragraph = popped.paragraph;
        }
    }

    /// The state of the innermost open scope.
    #[inline]
    pub fn current(&self) -> &FormattingState {
        self.states.last().unwrap()
    }

    /// Mutable access to the state of the innermost open scope.
    #[inline]
    pub fn current_mut(&mut self) -> &mut FormattingState {
        self.states.last_mut().unwrap()
    }

    /// Replace the state of the innermost open scope wholesale.
    pub fn replace_current(&mut self, state: FormattingState) {
        *self.states.last_mut().unwrap() = state;
    }

    /// The root state.
    pub fn root(&self) -> &FormattingState {
        self.states.first().unwrap()
    }

    /// Nesting depth: 0 at the root, incremented per open scope.
    #[inline]
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }
}
