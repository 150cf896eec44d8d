//! UI providers: per-platform core factories.

use crate::backend::{Backend, NativeEvent, WidgetId};
use crate::coordinator::{CoordinatorConfig, LayoutCoordinator};
use crate::error::{Error, Result};
use crate::native::NativeCore;
use crate::rect::Margin;
use crate::view::View;
use crate::view_core::{InvalidateReason, ViewCore};
use core::cell::RefCell;
use core::fmt;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Creates cores for views and owns the layout coordinator of its views.
pub trait UiProvider: fmt::Debug {
    /// A short name for diagnostics.
    fn name(&self) -> &str;

    /// Creates a core for the view.
    ///
    /// # Panics
    /// - if the view has a parent without a core
    fn create_core_for_view(&self, view: &Rc<View>) -> Result<Rc<dyn ViewCore>>;

    /// The system font size in DIPs.
    fn sem_size_dips(&self) -> f64;

    fn layout_coordinator(&self) -> &LayoutCoordinator;
}

/// Platform behavior of a core type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetTraits {
    /// Used when the view has no explicit padding.
    pub default_padding: Margin,
    /// Whether the native widget can adapt to a constrained width (e.g. by wrapping text).
    pub adapts_width: bool,
    /// Whether the native widget can adapt to a constrained height.
    pub adapts_height: bool,
    /// The font size of the widget in DIPs. Defaults to the system font size.
    pub font_size: Option<f64>,
}

impl WidgetTraits {
    pub fn with_default_padding(mut self, padding: Margin) -> Self {
        self.default_padding = padding;
        self
    }

    pub fn adapting_width(mut self) -> Self {
        self.adapts_width = true;
        self
    }

    pub fn adapting_height(mut self) -> Self {
        self.adapts_height = true;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }
}

/// Maps the widgets of live native cores back to their views, for native events.
///
/// Cores unregister their widget when they are disposed.
#[derive(Debug, Default)]
pub(crate) struct WidgetRegistry {
    views: RefCell<HashMap<WidgetId, Weak<View>>>,
}

impl WidgetRegistry {
    pub(crate) fn register(&self, widget: WidgetId, view: &Rc<View>) {
        self.views.borrow_mut().insert(widget, Rc::downgrade(view));
    }

    pub(crate) fn unregister(&self, widget: WidgetId) {
        self.views.borrow_mut().remove(&widget);
    }

    fn view(&self, widget: WidgetId) -> Option<Rc<View>> {
        self.views.borrow().get(&widget).and_then(Weak::upgrade)
    }

    fn len(&self) -> usize {
        self.views.borrow().len()
    }
}

/// A UI provider that creates [`NativeCore`]s on a [`Backend`].
pub struct NativeProvider<B: Backend> {
    name: String,
    backend: Rc<B>,
    coordinator: LayoutCoordinator,
    core_types: RefCell<HashMap<String, WidgetTraits>>,
    widgets: Rc<WidgetRegistry>,
}

impl<B: Backend> NativeProvider<B> {
    pub fn new(name: &str, backend: B, config: CoordinatorConfig) -> NativeProvider<B> {
        NativeProvider {
            name: name.to_string(),
            backend: Rc::new(backend),
            coordinator: LayoutCoordinator::new(config),
            core_types: RefCell::new(HashMap::new()),
            widgets: Rc::new(WidgetRegistry::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Registers (or replaces) a core type.
    pub fn register_core_type(&self, core_type: &str, traits: WidgetTraits) {
        self.core_types
            .borrow_mut()
            .insert(core_type.to_string(), traits);
    }

    pub fn supports(&self, core_type: &str) -> bool {
        self.core_types.borrow().contains_key(core_type)
    }

    /// Number of native widgets that currently map to a view.
    pub fn registered_widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Drains the backend’s native events and turns them into invalidations.
    ///
    /// Returns the number of events that reached a view.
    pub fn dispatch_native_events(&self) -> usize {
        let mut dispatched = 0;
        while let Some(event) = self.backend.poll_event() {
            let (widget, sizing_changed) = match event {
                NativeEvent::SizingChanged(widget) => (widget, true),
                NativeEvent::LayoutRequested(widget) => (widget, false),
            };

            match self.widgets.view(widget) {
                Some(view) => {
                    if sizing_changed {
                        view.invalidate_sizing_info(InvalidateReason::NativeChanged);
                    }
                    view.need_layout(InvalidateReason::NativeChanged);
                    dispatched += 1;
                }
                None => {
                    tracing::trace!(?widget, ?event, "dropping event for a widget without a view");
                }
            }
        }
        dispatched
    }
}

impl<B: Backend> UiProvider for NativeProvider<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_core_for_view(&self, view: &Rc<View>) -> Result<Rc<dyn ViewCore>> {
        let traits = self
            .core_types
            .borrow()
            .get(view.core_type())
            .cloned()
            .ok_or_else(|| Error::UnsupportedCoreType(view.core_type().to_string()))?;

        let widget = self.backend.create_widget(view.core_type());
        let core = NativeCore::new(view, Rc::clone(&self.backend), widget, traits);
        core.register_widget(view, &self.widgets);
        let core: Rc<dyn ViewCore> = core;
        Ok(core)
    }

    fn sem_size_dips(&self) -> f64 {
        self.backend.system_font_size()
    }

    fn layout_coordinator(&self) -> &LayoutCoordinator {
        &self.coordinator
    }
}

impl<B: Backend> fmt::Debug for NativeProvider<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut core_types: Vec<_> = self.core_types.borrow().keys().cloned().collect();
        core_types.sort();
        f.debug_struct("NativeProvider")
            .field("name", &self.name)
            .field("core_types", &core_types)
            .field("widgets", &self.widgets.len())
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
