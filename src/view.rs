use crate::dip::RoundType;
use crate::error::Result;
use crate::layout::Layout;
use crate::length::UiMargin;
use crate::provider::UiProvider;
use crate::rect::{Margin, Rect, Size};
use crate::view_core::{InvalidateReason, ViewCore};
use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Core type names understood by the bundled providers.
pub mod core_type {
    pub const CONTAINER: &str = "container";
    pub const LABEL: &str = "label";
    pub const BUTTON: &str = "button";
    pub const TEXT_FIELD: &str = "text_field";
}

/// A unique identifier for a view.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub(crate) fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

/// Horizontal placement of a view within the space its parent gives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    /// Use the full width.
    Expand,
}

impl Default for HorizontalAlignment {
    fn default() -> Self {
        HorizontalAlignment::Left
    }
}

/// Vertical placement of a view within the space its parent gives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
    /// Use the full height.
    Expand,
}

impl Default for VerticalAlignment {
    fn default() -> Self {
        VerticalAlignment::Top
    }
}

/// A realized core, with the provider that created it.
struct Realized {
    core: Rc<dyn ViewCore>,
    provider: Rc<dyn UiProvider>,
}

/// A platform-independent node in the view tree.
///
/// Views own their children and their core. Parents and cores only ever refer to a view
/// weakly. A view gets a core once it is part of a tree whose top-level view has a UI provider,
/// and every ancestor has a core; cores are disposed when the view leaves the tree or is dropped.
///
/// All views live on the UI thread.
pub struct View {
    id: ViewId,
    core_type: &'static str,
    this: Weak<View>,
    parent: RefCell<Weak<View>>,
    children: RefCell<Vec<Rc<View>>>,
    /// Set only on top-level views.
    provider: RefCell<Option<Rc<dyn UiProvider>>>,
    realized: RefCell<Option<Realized>>,
    layout: RefCell<Option<Rc<dyn Layout>>>,

    visible: Cell<bool>,
    padding: Cell<Option<UiMargin>>,
    margin: Cell<UiMargin>,
    horizontal_alignment: Cell<HorizontalAlignment>,
    vertical_alignment: Cell<VerticalAlignment>,
    preferred_size_hint: Cell<Size>,
    preferred_size_minimum: Cell<Size>,
    preferred_size_maximum: Cell<Size>,
    bounds: Cell<Rect>,
}

impl View {
    /// Creates a view that will be backed by a core of the given type.
    pub fn new(core_type: &'static str) -> Rc<View> {
        Rc::new_cyclic(|this| View {
            id: ViewId::new(),
            core_type,
            this: this.clone(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            provider: RefCell::new(None),
            realized: RefCell::new(None),
            layout: RefCell::new(None),
            visible: Cell::new(true),
            padding: Cell::new(None),
            margin: Cell::new(UiMargin::default()),
            horizontal_alignment: Cell::new(HorizontalAlignment::default()),
            vertical_alignment: Cell::new(VerticalAlignment::default()),
            preferred_size_hint: Cell::new(Size::none()),
            preferred_size_minimum: Cell::new(Size::none()),
            preferred_size_maximum: Cell::new(Size::none()),
            bounds: Cell::new(Rect::zero()),
        })
    }

    /// Creates a container view that positions its children with the given layout.
    pub fn container<L: Layout + 'static>(layout: L) -> Rc<View> {
        let view = View::new(core_type::CONTAINER);
        *view.layout.borrow_mut() = Some(Rc::new(layout));
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn core_type(&self) -> &'static str {
        self.core_type
    }

    /// Returns the core, if the view is realized.
    pub fn core(&self) -> Option<Rc<dyn ViewCore>> {
        self.realized
            .borrow()
            .as_ref()
            .map(|realized| Rc::clone(&realized.core))
    }

    pub fn parent(&self) -> Option<Rc<View>> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<Rc<View>> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(view) = current {
            depth += 1;
            current = view.parent();
        }
        depth
    }

    /// Returns true if `view` is this view or one of its descendants.
    pub fn contains(&self, view: &View) -> bool {
        if self.id == view.id {
            return true;
        }
        let mut current = view.parent();
        while let Some(ancestor) = current {
            if ancestor.id == self.id {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// The UI provider of the tree this view belongs to.
    pub fn ui_provider(&self) -> Option<Rc<dyn UiProvider>> {
        if let Some(provider) = self.provider.borrow().as_ref() {
            return Some(Rc::clone(provider));
        }
        self.parent().and_then(|parent| parent.ui_provider())
    }

    /// Connects a top-level view (and with it, its subtree) to a UI provider, replacing all
    /// cores.
    ///
    /// Views that cannot be realized stay without a core (and so do their descendants); the rest
    /// of the tree is realized regardless. The first error is returned.
    ///
    /// # Panics
    /// - if the view has a parent
    pub fn set_ui_provider(&self, provider: Option<Rc<dyn UiProvider>>) -> Result<()> {
        if self.parent().is_some() {
            panic!("View::set_ui_provider: only top-level views can have their own UI provider");
        }
        *self.provider.borrow_mut() = provider;
        self.reinit_core()
    }

    /// The layout delegate of a container view.
    pub fn layout_delegate(&self) -> Option<Rc<dyn Layout>> {
        self.layout.borrow().clone()
    }

    pub fn set_layout_delegate(&self, layout: Option<Rc<dyn Layout>>) {
        *self.layout.borrow_mut() = layout;
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
        self.need_layout(InvalidateReason::PropertyChanged);
    }

    pub fn visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }
        if let Some(core) = self.core() {
            core.set_visible(visible);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
        self.parent_need_layout();
    }

    /// Explicit padding. If there is none, the core’s default padding applies.
    pub fn padding(&self) -> Option<UiMargin> {
        self.padding.get()
    }

    pub fn set_padding(&self, padding: Option<UiMargin>) {
        if self.padding.replace(padding) == padding {
            return;
        }
        if let Some(core) = self.core() {
            core.set_padding(padding);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
        self.need_layout(InvalidateReason::PropertyChanged);
    }

    pub fn margin(&self) -> UiMargin {
        self.margin.get()
    }

    pub fn set_margin(&self, margin: UiMargin) {
        if self.margin.replace(margin) == margin {
            return;
        }
        if let Some(core) = self.core() {
            core.set_margin(margin);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
        self.parent_need_layout();
    }

    /// The margin resolved to DIPs by the core; zero if the view is not realized.
    pub fn margin_dips(&self) -> Margin {
        match self.core() {
            Some(core) => core.ui_margin_to_dip_margin(&self.margin()),
            None => Margin::zero(),
        }
    }

    pub fn horizontal_alignment(&self) -> HorizontalAlignment {
        self.horizontal_alignment.get()
    }

    pub fn set_horizontal_alignment(&self, align: HorizontalAlignment) {
        if self.horizontal_alignment.replace(align) == align {
            return;
        }
        if let Some(core) = self.core() {
            core.set_horizontal_alignment(align);
        }
        self.parent_need_layout();
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment.get()
    }

    pub fn set_vertical_alignment(&self, align: VerticalAlignment) {
        if self.vertical_alignment.replace(align) == align {
            return;
        }
        if let Some(core) = self.core() {
            core.set_vertical_alignment(align);
        }
        self.parent_need_layout();
    }

    pub fn preferred_size_hint(&self) -> Size {
        self.preferred_size_hint.get()
    }

    pub fn set_preferred_size_hint(&self, hint: Size) {
        if self.preferred_size_hint.replace(hint) == hint {
            return;
        }
        if let Some(core) = self.core() {
            core.set_preferred_size_hint(hint);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
    }

    pub fn preferred_size_minimum(&self) -> Size {
        self.preferred_size_minimum.get()
    }

    pub fn set_preferred_size_minimum(&self, limit: Size) {
        if self.preferred_size_minimum.replace(limit) == limit {
            return;
        }
        if let Some(core) = self.core() {
            core.set_preferred_size_minimum(limit);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
    }

    pub fn preferred_size_maximum(&self) -> Size {
        self.preferred_size_maximum.get()
    }

    pub fn set_preferred_size_maximum(&self, limit: Size) {
        if self.preferred_size_maximum.replace(limit) == limit {
            return;
        }
        if let Some(core) = self.core() {
            core.set_preferred_size_maximum(limit);
        }
        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
    }

    /// The bounds last applied to this view, relative to its parent.
    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    /// Computes the preferred size. Unrealized views have a preferred size of zero.
    pub fn calc_preferred_size(&self, available_space: Size) -> Size {
        match self.core() {
            Some(core) => core.calc_preferred_size(available_space),
            None => Size::zero(),
        }
    }

    /// Returns the bounds the core would apply for the requested bounds.
    pub fn adjust_bounds(
        &self,
        requested: Rect,
        position_round: RoundType,
        size_round: RoundType,
    ) -> Result<Rect> {
        match self.core() {
            Some(core) => core.adjust_bounds(requested, position_round, size_round),
            None => Ok(requested),
        }
    }

    /// Applies bounds through the core and records what was actually applied.
    ///
    /// A container whose size changes schedules its own layout.
    pub fn adjust_and_set_bounds(&self, requested: Rect) -> Result<Rect> {
        let applied = match self.core() {
            Some(core) => core.adjust_and_set_bounds(requested)?,
            None => requested,
        };
        let previous = self.bounds.replace(applied);
        if previous.size != applied.size && self.layout.borrow().is_some() {
            self.need_layout(InvalidateReason::BoundsChanged);
        }
        Ok(applied)
    }

    /// Invalidates cached sizing info and notifies the parent.
    pub fn invalidate_sizing_info(&self, reason: InvalidateReason) {
        if let Some(core) = self.core() {
            core.invalidate_sizing_info(reason);
        }
        if let Some(parent_core) = self.parent().and_then(|parent| parent.core()) {
            parent_core.child_sizing_info_invalidated(self);
        }
    }

    /// Requests a layout pass for this view.
    pub fn need_layout(&self, reason: InvalidateReason) {
        if let Some(core) = self.core() {
            core.need_layout(reason);
        }
    }

    fn parent_need_layout(&self) {
        if let Some(parent) = self.parent() {
            parent.need_layout(InvalidateReason::ChildPropertyChanged);
        }
    }

    /// Appends a child, moving it from its current parent if it has one.
    ///
    /// If the child (or one of its descendants) cannot be realized, it is not added and ends up
    /// without a parent.
    ///
    /// # Panics
    /// - if the child is this view or one of its ancestors
    pub fn add_child(&self, child: Rc<View>) -> Result<()> {
        if child.contains(self) {
            panic!("View::add_child: a view cannot become its own descendant");
        }

        if let Some(old_parent) = child.parent() {
            old_parent.take_child(&child);
            if old_parent.id != self.id {
                old_parent.invalidate_sizing_info(InvalidateReason::ChildAddedOrRemoved);
                old_parent.need_layout(InvalidateReason::ChildAddedOrRemoved);
            }
        }

        self.children.borrow_mut().push(Rc::clone(&child));
        *child.parent.borrow_mut() = self.this.clone();
        // a former top-level view now uses the provider of its new tree
        *child.provider.borrow_mut() = None;
        if let Err(err) = child.parent_changed(self) {
            // leave the tree as if the child had never been added
            self.take_child(&child);
            *child.parent.borrow_mut() = Weak::new();
            child.deinit_core();
            return Err(err);
        }

        self.invalidate_sizing_info(InvalidateReason::ChildAddedOrRemoved);
        self.need_layout(InvalidateReason::ChildAddedOrRemoved);
        Ok(())
    }

    /// Removes a child and disposes the cores of its subtree.
    ///
    /// Returns false if `child` is not a child of this view.
    pub fn remove_child(&self, child: &View) -> bool {
        let removed = match self.take_child(child) {
            Some(removed) => removed,
            None => return false,
        };
        *removed.parent.borrow_mut() = Weak::new();
        removed.deinit_core();

        self.invalidate_sizing_info(InvalidateReason::ChildAddedOrRemoved);
        self.need_layout(InvalidateReason::ChildAddedOrRemoved);
        true
    }

    pub fn remove_all_children(&self) {
        for child in self.children() {
            self.remove_child(&child);
        }
    }

    pub fn remove_from_parent(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Disposes the cores of this view and its subtree.
    ///
    /// The view stays in the tree but is no longer realized.
    pub fn dispose(&self) {
        self.deinit_core();
    }

    /// Removes the child from the children list without touching its core.
    fn take_child(&self, child: &View) -> Option<Rc<View>> {
        let mut children = self.children.borrow_mut();
        let pos = children.iter().position(|c| c.id == child.id)?;
        Some(children.remove(pos))
    }

    /// Moves the existing core if possible; recreates the cores otherwise.
    fn parent_changed(&self, new_parent: &View) -> Result<()> {
        let provider = self.ui_provider();
        let current = self
            .realized
            .borrow()
            .as_ref()
            .map(|realized| (Rc::clone(&realized.core), Rc::clone(&realized.provider)));

        if let (Some((core, core_provider)), Some(provider)) = (current, provider) {
            let same_provider =
                Rc::as_ptr(&core_provider) as *const () == Rc::as_ptr(&provider) as *const ();
            if same_provider
                && new_parent.core().is_some()
                && core.can_move_to_parent_view(new_parent)
            {
                tracing::debug!(view = ?self.id, parent = ?new_parent.id, "moving core to new parent");
                core.move_to_parent_view(new_parent);
                return Ok(());
            }
        }

        self.reinit_core()
    }

    /// Disposes the cores of the subtree and creates new ones where possible.
    fn reinit_core(&self) -> Result<()> {
        self.deinit_core();

        let this = match self.this.upgrade() {
            Some(this) => this,
            None => return Ok(()),
        };
        let provider = match self.ui_provider() {
            Some(provider) => provider,
            None => return Ok(()),
        };
        if let Some(parent) = self.parent() {
            if parent.core().is_none() {
                // will be realized together with the parent
                return Ok(());
            }
        }

        let core = provider.create_core_for_view(&this)?;
        tracing::debug!(view = ?self.id, core_type = self.core_type, provider = provider.name(), "created core");
        *self.realized.borrow_mut() = Some(Realized { core, provider });

        // realize as much of the subtree as possible and report the first failure
        let mut result = Ok(());
        for child in self.children() {
            if let Err(err) = child.reinit_core() {
                tracing::warn!(view = ?child.id, error = %err, "could not realize view");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        self.invalidate_sizing_info(InvalidateReason::PropertyChanged);
        self.need_layout(InvalidateReason::PropertyChanged);
        result
    }

    /// Disposes the cores of the subtree, children first.
    fn deinit_core(&self) {
        for child in self.children() {
            child.deinit_core();
        }
        let realized = self.realized.borrow_mut().take();
        if let Some(realized) = realized {
            tracing::debug!(view = ?self.id, "disposing core");
            realized.core.dispose();
        }
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.deinit_core();
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("core_type", &self.core_type)
            .field("realized", &self.realized.borrow().is_some())
            .field("visible", &self.visible.get())
            .field("bounds", &self.bounds.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
