//! Utility functions and helpers.

pub mod qr;
pub mod templates;
