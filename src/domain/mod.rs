pub mod config;
pub mod error;
pub mod lifecycle;
pub mod page;

// CSV decoding module
pub mod csv;
