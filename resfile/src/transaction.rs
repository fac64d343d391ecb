//! Pin/unpin scopes that protect touched keywords from eviction
//!
//! A transaction pins every keyword touched through it for as long as the
//! scope lives. Overlapping transactions pin independently: a keyword
//! touched by two scopes stays resident until both have ended. This is what
//! lets a bounded view serve more live keywords than its budget without
//! invalidating data a caller still holds.

use tracing::trace;

use crate::error::Result;
use crate::view::{FileView, KeywordRef};

/// A pin/unpin scope over one view.
///
/// Ends on [`Transaction::end`] or drop; either way every pin it holds is
/// released and the view's residency budget is re-applied.
pub struct Transaction<'v> {
    view: &'v FileView,
    touched: Vec<usize>,
}

impl<'v> Transaction<'v> {
    pub(crate) fn new(view: &'v FileView) -> Self {
        Self {
            view,
            touched: Vec::new(),
        }
    }

    /// Load a keyword through the view and pin it for the life of this scope.
    ///
    /// Touching the same keyword twice in one transaction pins it once.
    pub fn touch(&mut self, name: &str, occurrence: usize) -> Result<KeywordRef> {
        let position = self.view.position_of(name, occurrence)?;
        self.touch_at(position)
    }

    /// [`Self::touch`] by linear position.
    pub fn touch_at(&mut self, position: usize) -> Result<KeywordRef> {
        if self.touched.contains(&position) {
            return self.view.get_at(position);
        }
        let keyword = self.view.pin_at(position)?;
        self.touched.push(position);
        trace!("pinned keyword at position {}", position);
        Ok(keyword)
    }

    /// Number of distinct keywords this transaction has pinned.
    pub fn touched(&self) -> usize {
        self.touched.len()
    }

    /// End the transaction, releasing every pin it holds.
    pub fn end(self) {
        // Drop does the unpinning.
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        for position in self.touched.drain(..) {
            self.view.unpin(position);
        }
    }
}
