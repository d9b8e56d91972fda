pub mod candidate;
pub mod config;
pub mod formula;
pub mod request;
pub mod result;
