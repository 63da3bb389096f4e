//! Arrow data handling utilities
//!
//! Column access, batch reshaping and the normalised key strings used to
//! compare columns of different physical types.

pub mod array_utils;
pub mod keys;

pub use array_utils::{get_column_by_name, get_string_column};
pub use keys::key_strings;
