//! State management module
//!
//! Keeps continuation tokens between runs so a manually paged or
//! budget-limited fetch can pick up where it stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `ResumeState` - Per-operation token entries
//! - `ResumeStore` - File-based persistence with atomic writes

mod manager;
mod types;

pub use manager::ResumeStore;
pub use types::{ResumeEntry, ResumeState};
