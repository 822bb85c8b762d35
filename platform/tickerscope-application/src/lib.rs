pub mod cache;
pub mod config;
pub mod dashboard;
pub mod meta;
pub mod reporting;
pub mod request;
pub mod validation;
