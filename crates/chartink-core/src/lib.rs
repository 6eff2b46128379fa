//! ChartInk Core Library
//!
//! Interaction engine for chart annotation drawings: the drawing model, the
//! coordinate bridge to the host chart, magnet snapping, one interaction
//! service per drawing kind and the manager that arbitrates between them.

pub mod bridge;
pub mod chart;
pub mod config;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod magnet;
pub mod manager;
pub mod pointer;
pub mod services;
pub mod store;
pub mod timeframe;
pub mod timezone;
pub mod viewport;

pub use bridge::CoordinateBridge;
pub use chart::{Candle, ChartHost, PriceScale, TimeScale, Timestamp};
pub use config::InteractionConfig;
pub use drawing::{
    Bracket, Drawing, DrawingId, DrawingKind, DrawingPatch, DrawingPoint, DrawingShape,
    DrawingStyle, FibLevel, LineStyle, SerializableColor,
};
pub use error::{ChartInkError, ChartInkResult};
pub use geometry::{DrawingFlags, ProjectedDrawing, project};
pub use magnet::{MagnetResolver, MagnetResult, OhlcField};
pub use manager::DrawingManager;
pub use pointer::PointerState;
pub use services::{Hit, InteractionService};
pub use store::DrawingStore;
pub use timeframe::Timeframe;
pub use viewport::ChartViewport;
