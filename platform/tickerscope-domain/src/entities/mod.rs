pub mod derived_series;
pub mod summary;
