//! Portable views backed by native widgets.
//!
//! A [`View`] tree is platform independent. When the top-level view is connected to a
//! [`UiProvider`], every view gets a [`ViewCore`] that owns its native counterpart; the
//! [`LayoutCoordinator`] of the provider batches layout requests and runs them when asked to.
//! [`NativeProvider`] and [`NativeCore`] implement this on top of any [`Backend`].

mod backend;
mod coordinator;
mod dip;
mod error;
pub mod foreign;
mod layout;
mod length;
mod native;
mod provider;
mod rect;
#[cfg(test)]
mod test_support;
mod view;
mod view_core;

pub use backend::{Backend, NativeEvent, WidgetId};
pub use coordinator::{CoordinatorConfig, LayoutCoordinator, PassReport};
pub use dip::{pixel_align, pixel_align_value, RoundType};
pub use error::{Error, Result};
pub use layout::{Layout, Orientation, StackLayout};
pub use length::{length_to_dips, margin_to_dip_margin, Length, LengthUnit, UiMargin};
pub use native::NativeCore;
pub use provider::{NativeProvider, UiProvider, WidgetTraits};
pub use rect::{Margin, Rect, Size};
pub use view::{core_type, HorizontalAlignment, VerticalAlignment, View, ViewId};
pub use view_core::{InvalidateReason, ViewCore};
