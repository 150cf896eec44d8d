//! An in-memory widget toolkit for perch.
//!
//! Widgets live in an arena owned by the backend. Nothing is drawn; the toolkit only keeps the
//! state a real toolkit would (hierarchy, frames, visibility, natural sizes) and lets it be
//! inspected, which makes it useful for running view trees without a display.

use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use perch::{
    core_type, Backend, CoordinatorConfig, Margin, NativeCore, NativeEvent, NativeProvider, Rect,
    Size, View, WidgetId, WidgetTraits,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Headless platform settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessConfig {
    /// Physical pixels per DIP.
    pub scale_factor: f64,
    /// The system font size in DIPs.
    pub system_font_size: f64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        HeadlessConfig {
            scale_factor: 2.,
            system_font_size: 14.,
        }
    }
}

#[derive(Debug)]
struct Node {
    core_type: String,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    frame: Rect,
    hidden: bool,
    natural_size: Size,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: HashMap<WidgetId, Node>,
    next_id: u64,
    detach_count: usize,
}

impl Arena {
    fn detach(&mut self, id: WidgetId) {
        let parent = match self.nodes.get_mut(&id).and_then(|node| node.parent.take()) {
            Some(parent) => parent,
            None => return,
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }
        self.detach_count += 1;
    }

    fn release(&mut self, id: WidgetId) {
        self.detach(id);
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                if let Some(child) = self.nodes.get_mut(&child) {
                    child.parent = None;
                }
            }
        }
    }
}

/// An owned headless widget. Dropping it releases the widget.
#[derive(Debug)]
pub struct HeadlessWidget {
    id: WidgetId,
    arena: Weak<RefCell<Arena>>,
}

impl Drop for HeadlessWidget {
    fn drop(&mut self) {
        if let Some(arena) = self.arena.upgrade() {
            arena.borrow_mut().release(self.id);
            tracing::trace!(widget = ?self.id, "released headless widget");
        }
    }
}

/// The headless backend.
pub struct HeadlessBackend {
    config: HeadlessConfig,
    arena: Rc<RefCell<Arena>>,
    event_sender: Sender<NativeEvent>,
    event_recv: Receiver<NativeEvent>,
    font_queries: Cell<usize>,
}

impl HeadlessBackend {
    pub fn new(config: HeadlessConfig) -> HeadlessBackend {
        let (event_sender, event_recv) = channel::unbounded();
        HeadlessBackend {
            config,
            arena: Rc::new(RefCell::new(Arena::default())),
            event_sender,
            event_recv,
            font_queries: Cell::new(0),
        }
    }

    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Returns a sender for posting native events, e.g. from another thread.
    pub fn event_sender(&self) -> Sender<NativeEvent> {
        self.event_sender.clone()
    }

    fn post(&self, event: NativeEvent) {
        // the receiver lives as long as the backend
        let _ = self.event_sender.send(event);
    }

    pub fn is_alive(&self, widget: WidgetId) -> bool {
        self.arena.borrow().nodes.contains_key(&widget)
    }

    /// Number of live widgets.
    pub fn widget_count(&self) -> usize {
        self.arena.borrow().nodes.len()
    }

    /// Number of times a widget was detached from a parent.
    pub fn detach_count(&self) -> usize {
        self.arena.borrow().detach_count
    }

    /// Number of times the system font size was asked for.
    pub fn font_size_queries(&self) -> usize {
        self.font_queries.get()
    }

    pub fn core_type_of(&self, widget: WidgetId) -> Option<String> {
        self.arena
            .borrow()
            .nodes
            .get(&widget)
            .map(|node| node.core_type.clone())
    }

    pub fn parent_of(&self, widget: WidgetId) -> Option<WidgetId> {
        self.arena
            .borrow()
            .nodes
            .get(&widget)
            .and_then(|node| node.parent)
    }

    pub fn children_of(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.arena
            .borrow()
            .nodes
            .get(&widget)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// The frame of a widget, relative to its parent.
    pub fn frame_of(&self, widget: WidgetId) -> Option<Rect> {
        self.arena.borrow().nodes.get(&widget).map(|node| node.frame)
    }

    /// The origin of a widget relative to its top-level widget.
    pub fn absolute_origin(&self, widget: WidgetId) -> Option<Point2<f64>> {
        let arena = self.arena.borrow();
        let mut node = arena.nodes.get(&widget)?;
        let mut origin = node.frame.origin;
        while let Some(parent) = node.parent.and_then(|parent| arena.nodes.get(&parent)) {
            origin = origin + Vector2::new(parent.frame.origin.x, parent.frame.origin.y);
            node = parent;
        }
        Some(origin)
    }

    pub fn is_hidden(&self, widget: WidgetId) -> Option<bool> {
        self.arena.borrow().nodes.get(&widget).map(|node| node.hidden)
    }

    /// Changes the natural size of a widget, as if its content had changed natively.
    pub fn set_natural_size(&self, widget: WidgetId, size: Size) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(&widget) {
            node.natural_size = size;
        }
        self.post(NativeEvent::SizingChanged(widget));
    }

    /// Asks for a widget to be laid out again, as a native toolkit would after e.g. a theme
    /// change.
    pub fn request_layout(&self, widget: WidgetId) {
        self.post(NativeEvent::LayoutRequested(widget));
    }
}

impl Backend for HeadlessBackend {
    type Widget = HeadlessWidget;

    fn create_widget(&self, core_type: &str) -> HeadlessWidget {
        let mut arena = self.arena.borrow_mut();
        arena.next_id += 1;
        let id = WidgetId(arena.next_id);
        arena.nodes.insert(
            id,
            Node {
                core_type: core_type.to_string(),
                parent: None,
                children: Vec::new(),
                frame: Rect::zero(),
                hidden: false,
                natural_size: Size::zero(),
            },
        );
        HeadlessWidget {
            id,
            arena: Rc::downgrade(&self.arena),
        }
    }

    fn widget_id(&self, widget: &HeadlessWidget) -> WidgetId {
        widget.id
    }

    fn set_hidden(&self, widget: &HeadlessWidget, hidden: bool) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(&widget.id) {
            node.hidden = hidden;
        }
    }

    fn set_frame(&self, widget: &HeadlessWidget, frame: Rect) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(&widget.id) {
            node.frame = frame;
        }
    }

    /// Widgets report their natural size. Text wraps onto more lines if the width is
    /// constrained; the result is clipped to finite constraint components.
    fn fitting_size(&self, widget: &HeadlessWidget, constraint: Size) -> Size {
        let natural = match self.arena.borrow().nodes.get(&widget.id) {
            Some(node) => node.natural_size,
            None => return Size::zero(),
        };

        let mut size = natural;
        if constraint.width.is_finite() && natural.width > constraint.width && constraint.width > 0.
        {
            let lines = (natural.width / constraint.width).ceil();
            size = Size::new(constraint.width, natural.height * lines);
        }
        size.apply_maximum(constraint);
        size
    }

    /// # Panics
    /// - if the child already has a parent
    fn add_child(&self, parent: &HeadlessWidget, child: &HeadlessWidget) {
        let mut arena = self.arena.borrow_mut();
        match arena.nodes.get_mut(&child.id) {
            Some(node) => {
                if let Some(current) = node.parent {
                    panic!(
                        "headless widget {:?} is already attached to {:?}",
                        child.id, current
                    );
                }
                node.parent = Some(parent.id);
            }
            None => return,
        }
        if let Some(node) = arena.nodes.get_mut(&parent.id) {
            node.children.push(child.id);
        }
    }

    fn remove_from_parent(&self, widget: &HeadlessWidget) {
        self.arena.borrow_mut().detach(widget.id);
    }

    fn scale_factor(&self) -> f64 {
        self.config.scale_factor
    }

    fn system_font_size(&self) -> f64 {
        self.font_queries.set(self.font_queries.get() + 1);
        self.config.system_font_size
    }

    fn poll_event(&self) -> Option<NativeEvent> {
        match self.event_recv.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("native event channel has been disconnected");
                None
            }
        }
    }
}

/// The widget traits of the headless core types.
pub fn widget_traits(core_type: &str) -> Option<WidgetTraits> {
    let traits = match core_type {
        core_type::CONTAINER => WidgetTraits::default(),
        core_type::LABEL => WidgetTraits::default().adapting_width(),
        core_type::BUTTON => WidgetTraits::default()
            .with_default_padding(Margin::new(4., 12., 4., 12.))
            .with_font_size(13.),
        core_type::TEXT_FIELD => {
            WidgetTraits::default().with_default_padding(Margin::new(2., 4., 2., 4.))
        }
        _ => return None,
    };
    Some(traits)
}

pub type HeadlessProvider = NativeProvider<HeadlessBackend>;

/// Creates a provider for the headless platform with all headless core types registered.
pub fn provider(config: HeadlessConfig, coordinator: CoordinatorConfig) -> Rc<HeadlessProvider> {
    let provider = NativeProvider::new("headless", HeadlessBackend::new(config), coordinator);
    for name in &[
        core_type::CONTAINER,
        core_type::LABEL,
        core_type::BUTTON,
        core_type::TEXT_FIELD,
    ] {
        if let Some(traits) = widget_traits(name) {
            provider.register_core_type(name, traits);
        }
    }
    Rc::new(provider)
}

/// Returns the native widget of a view realized by a headless provider.
pub fn widget_of(view: &View) -> Option<WidgetId> {
    let core = view.core()?;
    let core = core.as_any().downcast_ref::<NativeCore<HeadlessBackend>>()?;
    Some(core.widget_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HeadlessBackend {
        HeadlessBackend::new(HeadlessConfig::default())
    }

    #[test]
    fn widgets_are_released_on_drop() {
        let backend = backend();
        let parent = backend.create_widget(core_type::CONTAINER);
        let child = backend.create_widget(core_type::LABEL);
        backend.add_child(&parent, &child);
        assert_eq!(backend.children_of(parent.id), vec![child.id]);

        let child_id = child.id;
        drop(child);
        assert!(!backend.is_alive(child_id));
        assert!(backend.children_of(parent.id).is_empty());
        assert_eq!(backend.widget_count(), 1);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn double_parenting_panics() {
        let backend = backend();
        let a = backend.create_widget(core_type::CONTAINER);
        let b = backend.create_widget(core_type::CONTAINER);
        let child = backend.create_widget(core_type::LABEL);
        backend.add_child(&a, &child);
        backend.add_child(&b, &child);
    }

    #[test]
    fn text_wraps_when_width_is_constrained() {
        let backend = backend();
        let label = backend.create_widget(core_type::LABEL);
        backend.set_natural_size(label.id, Size::new(120., 16.));

        assert_eq!(
            backend.fitting_size(&label, Size::none()),
            Size::new(120., 16.)
        );
        assert_eq!(
            backend.fitting_size(&label, Size::new(50., f64::INFINITY)),
            Size::new(50., 48.)
        );
        assert_eq!(
            backend.fitting_size(&label, Size::new(50., 20.)),
            Size::new(50., 20.)
        );
    }

    #[test]
    fn events_are_polled_in_order() {
        let backend = backend();
        let widget = backend.create_widget(core_type::LABEL);
        backend.set_natural_size(widget.id, Size::new(1., 1.));
        backend.request_layout(widget.id);

        assert_eq!(
            backend.poll_event(),
            Some(NativeEvent::SizingChanged(widget.id))
        );
        assert_eq!(
            backend.poll_event(),
            Some(NativeEvent::LayoutRequested(widget.id))
        );
        assert_eq!(backend.poll_event(), None);
    }

    #[test]
    fn absolute_origin_sums_parent_frames() {
        let backend = backend();
        let outer = backend.create_widget(core_type::CONTAINER);
        let inner = backend.create_widget(core_type::CONTAINER);
        let label = backend.create_widget(core_type::LABEL);
        backend.add_child(&outer, &inner);
        backend.add_child(&inner, &label);
        backend.set_frame(&outer, Rect::new(100., 100., 50., 50.));
        backend.set_frame(&inner, Rect::new(10., 5., 20., 20.));
        backend.set_frame(&label, Rect::new(1., 2., 3., 4.));

        assert_eq!(
            backend.absolute_origin(label.id),
            Some(Point2::new(111., 107.))
        );
    }
}
