//! Shared constants for poqt.

pub mod app;
pub mod defaults;
pub mod theme;
