//! Traits for backends.
//!
//! A backend is the binding to a platform’s native widget toolkit. [`NativeCore`] translates
//! view core operations into backend calls, and [`NativeProvider`] turns native events back into
//! invalidation calls.
//!
//! [`NativeCore`]: crate::NativeCore
//! [`NativeProvider`]: crate::NativeProvider

use crate::rect::{Rect, Size};

/// Identifies a native widget within one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(pub u64);

/// Notifications from the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    /// The widget’s natural size may have changed (e.g. its content was edited natively).
    SizingChanged(WidgetId),
    /// The native side asks for the widget to be laid out again.
    LayoutRequested(WidgetId),
}

/// A backend implementation.
///
/// All methods are called on the UI thread.
pub trait Backend: 'static {
    /// An owned handle to a native widget.
    ///
    /// Dropping the handle releases the native widget.
    type Widget;

    /// Creates a new, unattached widget for a core type.
    fn create_widget(&self, core_type: &str) -> Self::Widget;

    /// Returns the id of a widget.
    fn widget_id(&self, widget: &Self::Widget) -> WidgetId;

    /// Shows or hides a widget.
    fn set_hidden(&self, widget: &Self::Widget, hidden: bool);

    /// Sets the frame of a widget, relative to its native parent.
    fn set_frame(&self, widget: &Self::Widget, frame: Rect);

    /// Measures the size the widget wants to have.
    ///
    /// Infinite components of `constraint` mean the axis is unconstrained. The result may be
    /// clipped to finite constraint components.
    fn fitting_size(&self, widget: &Self::Widget, constraint: Size) -> Size;

    /// Attaches a widget to a native parent.
    ///
    /// The child must not be attached to any parent.
    fn add_child(&self, parent: &Self::Widget, child: &Self::Widget);

    /// Detaches a widget from its native parent, if it has one.
    fn remove_from_parent(&self, widget: &Self::Widget);

    /// Physical pixels per DIP.
    fn scale_factor(&self) -> f64;

    /// The system font size in DIPs.
    fn system_font_size(&self) -> f64;

    /// Returns the next event from the queue.
    ///
    /// This method may be called frequently in quick succession.
    fn poll_event(&self) -> Option<NativeEvent>;
}
