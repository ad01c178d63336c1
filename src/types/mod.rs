pub mod dataset;
pub mod schema;
