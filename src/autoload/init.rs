//! Initialization Dispatch
//!
//! Tracks the single symbol whose initializer is still owed, plus the chain
//! of resolutions currently in flight.
//!
//! # Protocol
//!
//! - `enter` pushes the symbol on the resolution stack and arms the pending
//!   marker with it if the marker is empty (outermost call, or first call
//!   after an initializer released the marker)
//! - `claim` is called after a successful load: it releases the marker only
//!   if it holds exactly that symbol, and reports whether the caller should
//!   run the initializer
//! - `exit` pops the stack and releases the marker if it still holds the
//!   symbol, whether or not resolution succeeded

use tracing::trace;

/// Pending-initialization marker with an explicit resolution stack.
#[derive(Clone, Debug, Default)]
pub struct InitDispatcher {
    /// Symbol whose initializer is still owed.
    pending: Option<String>,

    /// Symbols currently being resolved, outermost first.
    stack: Vec<String>,
}

impl InitDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin resolving `symbol`. Returns `true` if this call armed the marker.
    pub fn enter(&mut self, symbol: &str) -> bool {
        self.stack.push(symbol.to_string());
        if self.pending.is_none() {
            trace!(symbol, depth = self.stack.len(), "armed");
            self.pending = Some(symbol.to_string());
            true
        } else {
            false
        }
    }

    /// Finish resolving `symbol`.
    pub fn exit(&mut self, symbol: &str) {
        if let Some(pos) = self.stack.iter().rposition(|s| s == symbol) {
            self.stack.remove(pos);
        }
        if self.pending.as_deref() == Some(symbol) {
            trace!(symbol, "disarmed");
            self.pending = None;
        }
    }

    /// Release the marker if it holds `symbol`.
    ///
    /// Returns `true` when the initializer for `symbol` should run now.
    pub fn claim(&mut self, symbol: &str) -> bool {
        if self.pending.as_deref() == Some(symbol) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Symbol currently holding the marker.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Number of resolutions in flight.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Resolution chain, outermost first.
    pub fn chain(&self) -> &[String] {
        &self.stack
    }

    pub fn in_progress(&self) -> bool {
        !self.stack.is_empty()
    }
}
