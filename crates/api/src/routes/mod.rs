//! API route handlers

pub mod analyze;
pub mod board;
pub mod simulate;
pub mod topology;
