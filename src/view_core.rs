//! The view core interface.

use crate::dip::RoundType;
use crate::error::Result;
use crate::length::{Length, UiMargin};
use crate::rect::{Margin, Rect, Size};
use crate::view::{HorizontalAlignment, VerticalAlignment, View};
use core::any::Any;
use core::fmt;
use std::rc::Rc;

/// Why sizing info or layout was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidateReason {
    /// A standard property of the view changed (padding, visibility, ...).
    PropertyChanged,
    /// A property of a child that only concerns its parent changed (margin, alignment).
    ChildPropertyChanged,
    /// A child was added or removed.
    ChildAddedOrRemoved,
    /// The preferred size of a child may have changed.
    ChildSizingInfoInvalidated,
    /// The view was given bounds of a different size.
    BoundsChanged,
    /// The native widget reported a change.
    NativeChanged,
    /// Something else; used by custom views.
    Custom,
}

/// The native counterpart of a [`View`].
///
/// A core holds a weak reference to its view and never keeps it alive. Every operation must
/// treat an expired view as a normal condition. All methods take `&self`: cores are shared via
/// `Rc` and keep mutable state in cells, so that a core can call back into its view (and from
/// there into other cores) while one of its own methods is running.
///
/// Setters with a default implementation do nothing; the view stores the value and applies it
/// where needed (e.g. alignment is applied by the parent’s layout, size limits by
/// [`ViewCore::calc_preferred_size`]).
pub trait ViewCore: Any + fmt::Debug {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the owning view if it still exists.
    fn view(&self) -> Option<Rc<View>>;

    fn set_visible(&self, visible: bool);

    /// Padding is read from the view when measuring.
    fn set_padding(&self, padding: Option<UiMargin>) {
        let _ = padding;
    }

    /// Margins are applied by the parent’s layout.
    fn set_margin(&self, margin: UiMargin) {
        let _ = margin;
    }

    /// Alignment is applied by the parent’s layout.
    fn set_horizontal_alignment(&self, align: HorizontalAlignment) {
        let _ = align;
    }

    /// Alignment is applied by the parent’s layout.
    fn set_vertical_alignment(&self, align: VerticalAlignment) {
        let _ = align;
    }

    /// Most cores do not use the hint.
    fn set_preferred_size_hint(&self, hint: Size) {
        let _ = hint;
    }

    /// Limits are read from the view when measuring.
    fn set_preferred_size_minimum(&self, limit: Size) {
        let _ = limit;
    }

    /// Limits are read from the view when measuring.
    fn set_preferred_size_maximum(&self, limit: Size) {
        let _ = limit;
    }

    /// Computes the preferred size including padding, clamped to the view’s preferred size
    /// minimum and maximum.
    ///
    /// Infinite components of `available_space` mean the axis is unconstrained. Must not have
    /// side effects; it is called often during layout.
    fn calc_preferred_size(&self, available_space: Size) -> Size;

    /// Projects the requested bounds onto the native pixel grid without changing anything.
    fn adjust_bounds(
        &self,
        requested: Rect,
        position_round: RoundType,
        size_round: RoundType,
    ) -> Result<Rect>;

    /// Like [`ViewCore::adjust_bounds`] (rounding to nearest) and applies the result to the
    /// native widget. Returns the bounds that were actually applied.
    fn adjust_and_set_bounds(&self, requested: Rect) -> Result<Rect>;

    /// Resolves a length relative to this core’s fonts.
    fn ui_length_to_dips(&self, length: Length) -> f64;

    fn ui_margin_to_dip_margin(&self, margin: &UiMargin) -> Margin {
        Margin::new(
            self.ui_length_to_dips(margin.top),
            self.ui_length_to_dips(margin.right),
            self.ui_length_to_dips(margin.bottom),
            self.ui_length_to_dips(margin.left),
        )
    }

    /// Marks cached sizing info as stale. Cores that cache nothing do nothing.
    fn invalidate_sizing_info(&self, reason: InvalidateReason) {
        let _ = reason;
    }

    /// Schedules a layout pass for the view.
    ///
    /// Never lays out synchronously, and does nothing if the view is gone or is not connected
    /// to a UI provider.
    fn need_layout(&self, reason: InvalidateReason) {
        if let Some(view) = self.view() {
            if let Some(provider) = view.ui_provider() {
                tracing::trace!(view = ?view.id(), ?reason, "view needs layout");
                provider.layout_coordinator().view_needs_layout(&view);
            }
        }
    }

    /// Called when the preferred size of a child may have changed.
    fn child_sizing_info_invalidated(&self, child: &View) {
        let _ = child;
        if let Some(view) = self.view() {
            view.invalidate_sizing_info(InvalidateReason::ChildSizingInfoInvalidated);
            view.need_layout(InvalidateReason::ChildSizingInfoInvalidated);
        }
    }

    /// Positions the children. Called by the layout coordinator.
    ///
    /// Cores without children do nothing.
    fn layout(&self) -> Result<()> {
        Ok(())
    }

    fn can_move_to_parent_view(&self, new_parent: &View) -> bool {
        let _ = new_parent;
        true
    }

    /// Moves the native widget to the native widget of the new parent.
    ///
    /// Detaches from the old native parent before attaching; a widget never has two native
    /// parents.
    fn move_to_parent_view(&self, new_parent: &View);

    /// Detaches the native widget and releases native resources.
    ///
    /// Calling this more than once has no further effect.
    fn dispose(&self);
}
