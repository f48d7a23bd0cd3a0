pub mod projection;
pub mod region;
pub mod viewport;
