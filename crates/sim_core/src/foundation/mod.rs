//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the core:
//! - Math types and operations
//! - Handle-based collections
//! - Time management and the fixed-step accumulator
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
