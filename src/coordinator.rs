//! Scheduling of layout passes.

use crate::error::Error;
use crate::view::{View, ViewId};
use core::cell::{Cell, RefCell};
use core::fmt;
use core::mem;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

/// Layout coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Upper bound for the passes run by [`LayoutCoordinator::run_until_idle`].
    pub max_passes_per_idle: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            max_passes_per_idle: 16,
        }
    }
}

/// What happened during one layout pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Views whose core was laid out successfully.
    pub laid_out: usize,
    /// Entries whose view was gone or no longer had a core.
    pub skipped: usize,
    /// Views whose layout failed.
    pub failures: Vec<(ViewId, Error)>,
}

/// Clears the in-pass flag when a pass ends, even if a layout panics.
struct PassGuard<'a>(&'a Cell<bool>);

impl<'a> Drop for PassGuard<'a> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Collects views that need layout and lays them out in batches.
///
/// A view is queued at most once per pass. Views queued while a pass runs are laid out in the
/// next pass. The coordinator only keeps weak references; a view that is dropped while queued is
/// skipped.
///
/// The owner (usually the UI provider) decides when passes run, typically whenever the UI thread
/// becomes idle.
pub struct LayoutCoordinator {
    config: CoordinatorConfig,
    pending: RefCell<Vec<Weak<View>>>,
    queued: RefCell<HashSet<ViewId>>,
    in_pass: Cell<bool>,
}

impl LayoutCoordinator {
    pub fn new(config: CoordinatorConfig) -> LayoutCoordinator {
        LayoutCoordinator {
            config,
            pending: RefCell::new(Vec::new()),
            queued: RefCell::new(HashSet::new()),
            in_pass: Cell::new(false),
        }
    }

    /// Queues a view for the next pass. Does nothing if it is already queued.
    pub fn view_needs_layout(&self, view: &Rc<View>) {
        if self.queued.borrow_mut().insert(view.id()) {
            tracing::trace!(view = ?view.id(), "queued for layout");
            self.pending.borrow_mut().push(Rc::downgrade(view));
        }
    }

    pub fn is_pending(&self, view: &View) -> bool {
        self.queued.borrow().contains(&view.id())
    }

    pub fn pending_count(&self) -> usize {
        self.queued.borrow().len()
    }

    pub fn has_pending(&self) -> bool {
        !self.queued.borrow().is_empty()
    }

    /// Lays out every view queued so far, parents before children.
    ///
    /// Calling this from within a pass does nothing.
    pub fn run_pass(&self) -> PassReport {
        let mut report = PassReport::default();
        if self.in_pass.replace(true) {
            tracing::trace!("ignoring nested layout pass");
            return report;
        }
        let _guard = PassGuard(&self.in_pass);

        // anything queued from here on belongs to the next pass
        let batch = mem::replace(&mut *self.pending.borrow_mut(), Vec::new());
        self.queued.borrow_mut().clear();

        let mut views = Vec::with_capacity(batch.len());
        for entry in batch {
            match entry.upgrade() {
                Some(view) => views.push((view.depth(), view)),
                None => report.skipped += 1,
            }
        }
        views.sort_by_key(|(depth, _)| *depth);

        for (_, view) in views {
            let core = match view.core() {
                Some(core) => core,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            match core.layout() {
                Ok(()) => report.laid_out += 1,
                Err(err) => {
                    tracing::error!(view = ?view.id(), error = %err, "layout failed");
                    report.failures.push((view.id(), err));
                }
            }
        }

        tracing::trace!(
            laid_out = report.laid_out,
            skipped = report.skipped,
            failed = report.failures.len(),
            "layout pass finished"
        );
        report
    }

    /// Runs passes until nothing is pending or the configured pass limit is reached.
    ///
    /// Returns the number of passes that were run.
    pub fn run_until_idle(&self) -> usize {
        let mut passes = 0;
        while self.has_pending() {
            if passes == self.config.max_passes_per_idle {
                tracing::warn!(
                    pending = self.pending_count(),
                    passes,
                    "layout did not settle; deferring the remaining views"
                );
                break;
            }
            self.run_pass();
            passes += 1;
        }
        passes
    }
}

impl Default for LayoutCoordinator {
    fn default() -> Self {
        LayoutCoordinator::new(CoordinatorConfig::default())
    }
}

impl fmt::Debug for LayoutCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LayoutCoordinator")
            .field("config", &self.config)
            .field("pending", &self.pending_count())
            .field("in_pass", &self.in_pass.get())
            .finish()
    }
}
