pub mod accumulator;
pub mod background;
pub mod color;
pub mod frame;
pub mod opacity;
pub mod sequence;
pub mod timeline;
