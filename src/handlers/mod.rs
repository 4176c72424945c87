pub mod analysis;
pub mod system;
pub mod web;
