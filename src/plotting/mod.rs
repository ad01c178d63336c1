pub mod chart;
pub mod error;
pub mod plot;
pub mod render;
