//! The platform core: a [`ViewCore`] backed by a native widget of a [`Backend`].

use crate::backend::{Backend, WidgetId};
use crate::dip::{pixel_align, RoundType};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::length::{length_to_dips, Length, LengthUnit};
use crate::provider::{WidgetRegistry, WidgetTraits};
use crate::rect::{Margin, Rect, Size};
use crate::view::{core_type, View, ViewId};
use crate::view_core::ViewCore;
use cgmath::Point2;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

/// A view core that owns a native widget.
///
/// The widget is attached to the native widget of the parent view’s core when the core is
/// created, and detached when the core is disposed (or dropped). Font metrics are looked up the
/// first time they are needed and then kept for the lifetime of the core.
///
/// Container views are measured and laid out by their layout delegate; measuring or laying out
/// a container that has none panics.
pub struct NativeCore<B: Backend> {
    view: Weak<View>,
    backend: Rc<B>,
    /// `None` after disposal.
    widget: RefCell<Option<B::Widget>>,
    widget_id: WidgetId,
    traits: WidgetTraits,
    /// The view whose native widget this widget is attached to.
    native_parent: Cell<Option<ViewId>>,
    registry: RefCell<Weak<WidgetRegistry>>,
    frame: Cell<Rect>,
    em_dips: Cell<Option<f64>>,
    sem_dips: Cell<Option<f64>>,
}

impl<B: Backend> NativeCore<B> {
    /// Creates a core for the view and attaches its widget to the parent’s widget.
    ///
    /// # Panics
    /// - if the view has a parent that does not have a core
    /// - if the parent’s core is not a `NativeCore` of the same backend
    pub fn new(
        view: &Rc<View>,
        backend: Rc<B>,
        widget: B::Widget,
        traits: WidgetTraits,
    ) -> Rc<NativeCore<B>> {
        let widget_id = backend.widget_id(&widget);
        let core = NativeCore {
            view: Rc::downgrade(view),
            backend,
            widget: RefCell::new(Some(widget)),
            widget_id,
            traits,
            native_parent: Cell::new(None),
            registry: RefCell::new(Weak::new()),
            frame: Cell::new(Rect::zero()),
            em_dips: Cell::new(None),
            sem_dips: Cell::new(None),
        };

        if let Some(parent) = view.parent() {
            core.add_to_parent(&parent);
        }
        core.set_visible(view.visible());
        core.set_padding(view.padding());

        Rc::new(core)
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget_id
    }

    pub fn traits(&self) -> &WidgetTraits {
        &self.traits
    }

    pub fn is_disposed(&self) -> bool {
        self.widget.borrow().is_none()
    }

    /// The frame last applied to the native widget.
    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Maps the widget to the view until the core is disposed.
    pub(crate) fn register_widget(&self, view: &Rc<View>, registry: &Rc<WidgetRegistry>) {
        registry.register(self.widget_id, view);
        *self.registry.borrow_mut() = Rc::downgrade(registry);
    }

    /// Runs `f` with the native widget, unless the core has been disposed.
    fn with_widget<R, F: FnOnce(&B::Widget) -> R>(&self, f: F) -> Option<R> {
        self.widget.borrow().as_ref().map(f)
    }

    /// Attaches a child widget to this core’s widget.
    fn add_child_widget(&self, child: &B::Widget) {
        let attached = self.with_widget(|widget| self.backend.add_child(widget, child));
        if attached.is_none() {
            panic!("NativeCore: cannot attach a child widget to a disposed core");
        }
    }

    fn add_to_parent(&self, parent: &View) {
        let parent_core = match parent.core() {
            Some(core) => core,
            None => {
                // The parent MUST have a core, otherwise there is nothing to attach to.
                panic!("NativeCore constructed for a view whose parent does not have a core");
            }
        };
        let parent_core = match parent_core.as_any().downcast_ref::<NativeCore<B>>() {
            Some(core) => core,
            None => panic!("NativeCore: the parent core is not a native core of the same backend"),
        };

        self.with_widget(|widget| parent_core.add_child_widget(widget));
        self.native_parent.set(Some(parent.id()));
    }

    /// Detaches the widget from its native parent, if it has one.
    fn detach(&self) {
        if self.native_parent.take().is_some() {
            self.with_widget(|widget| self.backend.remove_from_parent(widget));
        }
    }

    /// The view’s padding, or the default padding if the view has none (or is gone).
    fn padding_dips(&self) -> Margin {
        match self.view().and_then(|view| view.padding()) {
            Some(padding) => self.ui_margin_to_dip_margin(&padding),
            None => self.traits.default_padding,
        }
    }

    fn font_size(&self) -> f64 {
        match self.traits.font_size {
            Some(size) => size,
            None => self.sem_size_dips(),
        }
    }

    fn em_size_dips(&self) -> f64 {
        match self.em_dips.get() {
            Some(size) => size,
            None => {
                let size = self.font_size();
                self.em_dips.set(Some(size));
                size
            }
        }
    }

    fn sem_size_dips(&self) -> f64 {
        match self.sem_dips.get() {
            Some(size) => size,
            None => {
                let size = self.backend.system_font_size();
                self.sem_dips.set(Some(size));
                size
            }
        }
    }

    /// # Panics
    /// - if the view is a container without a layout delegate
    fn layout_delegate(view: &View) -> Option<Rc<dyn Layout>> {
        let layout = view.layout_delegate();
        if layout.is_none() && view.core_type() == core_type::CONTAINER {
            panic!(
                "NativeCore: container view {:?} has no layout delegate",
                view.id()
            );
        }
        layout
    }

    /// The constraint passed to the native measurement: only axes the widget can adapt to are
    /// constrained.
    fn native_constraint(&self, available: Size, hint: Size, padding: Margin) -> Size {
        let mut constraint = Size::none();
        if self.traits.adapts_width {
            let width = available.width.min(hint.width);
            if width.is_finite() {
                constraint.width = (width - padding.horizontal()).max(0.);
            }
        }
        if self.traits.adapts_height {
            let height = available.height.min(hint.height);
            if height.is_finite() {
                constraint.height = (height - padding.vertical()).max(0.);
            }
        }
        constraint
    }
}

impl<B: Backend> ViewCore for NativeCore<B> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self) -> Option<Rc<View>> {
        self.view.upgrade()
    }

    fn set_visible(&self, visible: bool) {
        self.with_widget(|widget| self.backend.set_hidden(widget, !visible));
    }

    fn calc_preferred_size(&self, available_space: Size) -> Size {
        let view = self.view();
        let padding = self.padding_dips();

        let layout = view.as_deref().and_then(NativeCore::<B>::layout_delegate);
        let mut size = match (&view, layout) {
            (Some(view), Some(layout)) => layout.preferred_size(view, available_space - padding),
            _ => {
                let hint = match &view {
                    Some(view) => view.preferred_size_hint(),
                    None => Size::none(),
                };
                let constraint = self.native_constraint(available_space, hint, padding);
                self.with_widget(|widget| self.backend.fitting_size(widget, constraint))
                    .unwrap_or_else(Size::zero)
            }
        };

        size.clamp_non_negative();
        size += padding;
        size.clamp_non_negative();

        if let Some(view) = view {
            size.apply_minimum(view.preferred_size_minimum());
            size.apply_maximum(view.preferred_size_maximum());
        }
        size
    }

    fn adjust_bounds(
        &self,
        requested: Rect,
        position_round: RoundType,
        size_round: RoundType,
    ) -> Result<Rect> {
        pixel_align(
            requested,
            self.backend.scale_factor(),
            position_round,
            size_round,
        )
    }

    fn adjust_and_set_bounds(&self, requested: Rect) -> Result<Rect> {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        let adjusted = self.adjust_bounds(requested, RoundType::Nearest, RoundType::Nearest)?;
        self.with_widget(|widget| self.backend.set_frame(widget, adjusted));
        self.frame.set(adjusted);
        Ok(adjusted)
    }

    fn ui_length_to_dips(&self, length: Length) -> f64 {
        // only look up the metric the unit needs
        let (em, sem) = match length.unit {
            LengthUnit::Em => (self.em_size_dips(), 0.),
            LengthUnit::Sem => (0., self.sem_size_dips()),
            LengthUnit::None | LengthUnit::Dip => (0., 0.),
        };
        length_to_dips(length, em, sem)
    }

    fn layout(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let view = match self.view() {
            Some(view) => view,
            None => return Ok(()),
        };
        let layout = match NativeCore::<B>::layout_delegate(&view) {
            Some(layout) => layout,
            None => return Ok(()),
        };

        let content = Rect::from_parts(Point2::new(0., 0.), self.frame.get().size)
            .inset(self.padding_dips());
        for (child, bounds) in layout.arrange(&view, content) {
            child.adjust_and_set_bounds(bounds)?;
        }
        Ok(())
    }

    fn can_move_to_parent_view(&self, new_parent: &View) -> bool {
        match new_parent.core() {
            Some(core) => core.as_any().downcast_ref::<NativeCore<B>>().is_some(),
            None => false,
        }
    }

    fn move_to_parent_view(&self, new_parent: &View) {
        if self.is_disposed() || self.native_parent.get() == Some(new_parent.id()) {
            return;
        }
        tracing::debug!(widget = ?self.widget_id, parent = ?new_parent.id(), "moving native widget");
        self.detach();
        self.add_to_parent(new_parent);
    }

    fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.detach();
        let registry = self.registry.replace(Weak::new());
        if let Some(registry) = registry.upgrade() {
            registry.unregister(self.widget_id);
        }
        let widget = self.widget.borrow_mut().take();
        drop(widget);
        tracing::debug!(widget = ?self.widget_id, "disposed native core");
    }
}

impl<B: Backend> Drop for NativeCore<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<B: Backend> fmt::Debug for NativeCore<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeCore")
            .field("widget", &self.widget_id)
            .field("traits", &self.traits)
            .field("native_parent", &self.native_parent.get())
            .field("frame", &self.frame.get())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
