pub mod admin;
pub mod documents;
pub mod pmdc;
pub mod registration;
pub mod scoring;
