//! A mock provider and core for unit tests.

use crate::coordinator::{CoordinatorConfig, LayoutCoordinator};
use crate::dip::{pixel_align, RoundType};
use crate::error::{Error, Result};
use crate::length::{length_to_dips, Length};
use crate::provider::UiProvider;
use crate::rect::{Margin, Rect, Size};
use crate::view::{View, ViewId};
use crate::view_core::ViewCore;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

const EM: f64 = 16.;
const SEM: f64 = 14.;

/// A core type [`MockProvider`] refuses to create cores for.
pub const UNSUPPORTED: &str = "unsupported";

/// A core that records what was done to it.
pub struct MockCore {
    view: Weak<View>,
    visible: Cell<bool>,
    natural_size: Cell<Size>,
    frame: Cell<Rect>,
    dispose_count: Cell<usize>,
    layout_count: Cell<usize>,
    moves: RefCell<Vec<ViewId>>,
    on_layout: RefCell<Option<Box<dyn FnMut()>>>,
}

impl MockCore {
    pub fn set_natural_size(&self, size: Size) {
        self.natural_size.set(size);
    }

    pub fn dispose_count(&self) -> usize {
        self.dispose_count.get()
    }

    pub fn layout_count(&self) -> usize {
        self.layout_count.get()
    }

    /// Parents this core was moved to, in order.
    pub fn moves(&self) -> Vec<ViewId> {
        self.moves.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Runs `f` every time the core is laid out.
    pub fn on_layout<F: FnMut() + 'static>(&self, f: F) {
        *self.on_layout.borrow_mut() = Some(Box::new(f));
    }
}

impl ViewCore for MockCore {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self) -> Option<Rc<View>> {
        self.view.upgrade()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn calc_preferred_size(&self, _available_space: Size) -> Size {
        let view = self.view();
        let padding = match view.as_ref().and_then(|view| view.padding()) {
            Some(padding) => self.ui_margin_to_dip_margin(&padding),
            None => Margin::zero(),
        };
        let mut size = self.natural_size.get() + padding;
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
        pixel_align(requested, 1., position_round, size_round)
    }

    fn adjust_and_set_bounds(&self, requested: Rect) -> Result<Rect> {
        let adjusted = self.adjust_bounds(requested, RoundType::Nearest, RoundType::Nearest)?;
        self.frame.set(adjusted);
        Ok(adjusted)
    }

    fn ui_length_to_dips(&self, length: Length) -> f64 {
        length_to_dips(length, EM, SEM)
    }

    fn layout(&self) -> Result<()> {
        self.layout_count.set(self.layout_count.get() + 1);
        if let Some(hook) = self.on_layout.borrow_mut().as_mut() {
            hook();
        }
        Ok(())
    }

    fn move_to_parent_view(&self, new_parent: &View) {
        self.moves.borrow_mut().push(new_parent.id());
    }

    fn dispose(&self) {
        self.dispose_count.set(self.dispose_count.get() + 1);
    }
}

impl fmt::Debug for MockCore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MockCore")
            .field("natural_size", &self.natural_size.get())
            .field("dispose_count", &self.dispose_count.get())
            .field("layout_count", &self.layout_count.get())
            .finish()
    }
}

/// A provider that creates [`MockCore`]s for every core type but [`UNSUPPORTED`].
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    coordinator: LayoutCoordinator,
    cores: RefCell<Vec<(ViewId, Rc<MockCore>)>>,
}

impl MockProvider {
    pub fn new(name: &str) -> Rc<MockProvider> {
        MockProvider::with_config(name, CoordinatorConfig::default())
    }

    pub fn with_config(name: &str, config: CoordinatorConfig) -> Rc<MockProvider> {
        Rc::new(MockProvider {
            name: name.to_string(),
            coordinator: LayoutCoordinator::new(config),
            cores: RefCell::new(Vec::new()),
        })
    }

    /// Number of cores created so far.
    pub fn created(&self) -> usize {
        self.cores.borrow().len()
    }

    /// The most recent core created for the view.
    pub fn mock_core(&self, view: &View) -> Option<Rc<MockCore>> {
        self.cores
            .borrow()
            .iter()
            .rev()
            .find(|(id, _)| *id == view.id())
            .map(|(_, core)| Rc::clone(core))
    }
}

impl UiProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_core_for_view(&self, view: &Rc<View>) -> Result<Rc<dyn ViewCore>> {
        if view.core_type() == UNSUPPORTED {
            return Err(Error::UnsupportedCoreType(UNSUPPORTED.to_string()));
        }
        if let Some(parent) = view.parent() {
            if parent.core().is_none() {
                panic!("MockProvider: parent view does not have a core");
            }
        }
        let core = Rc::new(MockCore {
            view: Rc::downgrade(view),
            visible: Cell::new(view.visible()),
            natural_size: Cell::new(Size::new(10., 10.)),
            frame: Cell::new(Rect::zero()),
            dispose_count: Cell::new(0),
            layout_count: Cell::new(0),
            moves: RefCell::new(Vec::new()),
            on_layout: RefCell::new(None),
        });
        self.cores.borrow_mut().push((view.id(), Rc::clone(&core)));
        let core: Rc<dyn ViewCore> = core;
        Ok(core)
    }

    fn sem_size_dips(&self) -> f64 {
        SEM
    }

    fn layout_coordinator(&self) -> &LayoutCoordinator {
        &self.coordinator
    }
}
