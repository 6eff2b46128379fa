//! ChartInk Render Library
//!
//! Render primitives for ChartInk drawings and the overlay pass that paints
//! a store through them. The default painter uses Vello.

mod overlay;
pub mod primitives;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use overlay::OverlayRenderer;
pub use primitives::{DrawingPrimitive, primitive_for};
pub use renderer::{OverlayStyle, Painter, RenderResult, RendererError, TextAlign, TextLabel};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloPainter;
