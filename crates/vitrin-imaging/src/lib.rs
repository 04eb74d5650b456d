//! Deterministic raster operations for the catalog authoring pipeline.
//!
//! The only consumer-facing operation is watermark compositing. The same
//! arithmetic runs wherever the compositing happens (a client device or a
//! server process), so everything in this crate is a pure function of its
//! byte inputs.

pub mod watermark;

pub use watermark::{ImagingError, Placement, WatermarkSpec, anchor, composite_watermark};
