//! Business logic for yatube-rs.

pub mod services;

pub use services::*;
