// Test modules

mod analysis_handler_test;
pub mod common;
