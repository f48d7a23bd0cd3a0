#![forbid(unsafe_code)]
//! Animated maps of geotagged points that accumulate and fade over time.
//!
//! A run loads point records (and optional background coverage records), builds a daily
//! [`Timeline`], then walks it with a [`FrameSequence`] that yields one [`FramePayload`] per day.
//! Payloads are plain data; [`Rasterizer`] turns them into pixels and [`RenderJob`] wires the
//! whole thing to PNG or MP4 output.

pub mod config;
pub mod data;
pub mod encode;
pub mod engine;
pub mod foundation;
pub mod geo;
pub mod render;

pub use config::RenderConfig;
pub use data::{
    load::Dataset,
    record::{BackgroundRecord, Dated, PointRecord},
    summary::{YearRange, YearRanges, year_ranges},
};
pub use engine::{
    accumulator::PointAccumulator,
    background::{BackgroundTracker, CoverageRecord},
    color::{ColorScale, Gradient},
    frame::{FramePayload, FrameRenderer, LayerPayload},
    opacity::AgeDecay,
    sequence::{EngineSettings, FrameSequence, RenderMode},
    timeline::{Frame, Timeline, TimelineBuilder},
};
pub use foundation::{
    core::{Canvas, FrameIndex, LatLng, Point, Rgb8},
    error::{GeoFadeError, GeoFadeResult},
};
pub use geo::{projection::AlbersProjection, region::RegionGeometry, viewport::Viewport};
pub use render::{
    pipeline::{RenderJob, RenderStats},
    raster::{FrameRGBA, RasterStyle, Rasterizer},
};
