//! Utility functions for query-parameter and string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{days_before, format_coordinate, format_iso_date, truncate_string};
