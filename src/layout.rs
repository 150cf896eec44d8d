//! Container layout delegates.

use crate::rect::{Margin, Rect, Size};
use crate::view::{HorizontalAlignment, VerticalAlignment, View};
use core::fmt;
use std::f64;
use std::rc::Rc;

/// A layout delegate for a container view.
///
/// The container’s core calls `arrange` during a layout pass and applies the resulting bounds
/// to the children; `preferred_size` is used when the container itself is measured.
pub trait Layout: fmt::Debug {
    /// Computes the size of the container’s content (excluding the container’s padding).
    ///
    /// - `available`: the space available to the content; infinite components are unconstrained.
    fn preferred_size(&self, container: &View, available: Size) -> Size;

    /// Computes bounds for the children.
    ///
    /// - `content`: the content area, relative to the container and excluding its padding.
    fn arrange(&self, container: &View, content: Rect) -> Vec<(Rc<View>, Rect)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Placement along the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossAlign {
    Start,
    Center,
    End,
    Expand,
}

impl From<HorizontalAlignment> for CrossAlign {
    fn from(align: HorizontalAlignment) -> Self {
        match align {
            HorizontalAlignment::Left => CrossAlign::Start,
            HorizontalAlignment::Center => CrossAlign::Center,
            HorizontalAlignment::Right => CrossAlign::End,
            HorizontalAlignment::Expand => CrossAlign::Expand,
        }
    }
}

impl From<VerticalAlignment> for CrossAlign {
    fn from(align: VerticalAlignment) -> Self {
        match align {
            VerticalAlignment::Top => CrossAlign::Start,
            VerticalAlignment::Middle => CrossAlign::Center,
            VerticalAlignment::Bottom => CrossAlign::End,
            VerticalAlignment::Expand => CrossAlign::Expand,
        }
    }
}

/// Stacks visible children one after another, each at its preferred length along the stack
/// axis. Children are placed on the cross axis according to their alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackLayout {
    pub orientation: Orientation,
}

impl StackLayout {
    pub fn vertical() -> StackLayout {
        StackLayout {
            orientation: Orientation::Vertical,
        }
    }

    pub fn horizontal() -> StackLayout {
        StackLayout {
            orientation: Orientation::Horizontal,
        }
    }

    /// (main, cross)
    fn split(&self, size: Size) -> (f64, f64) {
        match self.orientation {
            Orientation::Vertical => (size.height, size.width),
            Orientation::Horizontal => (size.width, size.height),
        }
    }

    fn join(&self, main: f64, cross: f64) -> Size {
        match self.orientation {
            Orientation::Vertical => Size::new(cross, main),
            Orientation::Horizontal => Size::new(main, cross),
        }
    }

    /// ((main before, main after), (cross before, cross after))
    fn margin_sides(&self, m: Margin) -> ((f64, f64), (f64, f64)) {
        match self.orientation {
            Orientation::Vertical => ((m.top, m.bottom), (m.left, m.right)),
            Orientation::Horizontal => ((m.left, m.right), (m.top, m.bottom)),
        }
    }

    fn cross_align(&self, child: &View) -> CrossAlign {
        match self.orientation {
            Orientation::Vertical => child.horizontal_alignment().into(),
            Orientation::Horizontal => child.vertical_alignment().into(),
        }
    }

    /// Measures a child given the cross-axis space available to it (after its margins).
    fn measure(&self, child: &View, cross_available: f64) -> (f64, f64) {
        let pref = child.calc_preferred_size(self.join(f64::INFINITY, cross_available));
        self.split(pref)
    }
}

fn visible_children(container: &View) -> impl Iterator<Item = Rc<View>> {
    container.children().into_iter().filter(|child| child.visible())
}

impl Layout for StackLayout {
    fn preferred_size(&self, container: &View, available: Size) -> Size {
        let (_, cross_available) = self.split(available);
        let mut main_total: f64 = 0.;
        let mut cross_max: f64 = 0.;

        for child in visible_children(container) {
            let ((main_before, main_after), (cross_before, cross_after)) =
                self.margin_sides(child.margin_dips());
            let cross_space = (cross_available - cross_before - cross_after).max(0.);
            let (main, cross) = self.measure(&child, cross_space);

            main_total += main_before + main + main_after;
            cross_max = cross_max.max(cross_before + cross + cross_after);
        }

        self.join(main_total, cross_max)
    }

    fn arrange(&self, container: &View, content: Rect) -> Vec<(Rc<View>, Rect)> {
        let (_, cross_available) = self.split(content.size);
        let (mut cursor, cross_origin) = match self.orientation {
            Orientation::Vertical => (content.origin.y, content.origin.x),
            Orientation::Horizontal => (content.origin.x, content.origin.y),
        };

        let mut placed = Vec::new();
        for child in visible_children(container) {
            let ((main_before, main_after), (cross_before, cross_after)) =
                self.margin_sides(child.margin_dips());
            let cross_space = (cross_available - cross_before - cross_after).max(0.);
            let (main, cross) = self.measure(&child, cross_space);

            let cross = cross.min(cross_space);
            let (cross_offset, cross) = match self.cross_align(&child) {
                CrossAlign::Start => (0., cross),
                CrossAlign::Center => ((cross_space - cross) / 2., cross),
                CrossAlign::End => (cross_space - cross, cross),
                CrossAlign::Expand => (0., cross_space),
            };

            let main_pos = cursor + main_before;
            let cross_pos = cross_origin + cross_before + cross_offset;
            let bounds = match self.orientation {
                Orientation::Vertical => Rect::new(cross_pos, main_pos, cross, main),
                Orientation::Horizontal => Rect::new(main_pos, cross_pos, main, cross),
            };
            cursor = main_pos + main + main_after;
            placed.push((child, bounds));
        }
        placed
    }
}
