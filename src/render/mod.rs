pub mod gradient;
pub mod pipeline;
pub mod raster;
pub mod svg;
