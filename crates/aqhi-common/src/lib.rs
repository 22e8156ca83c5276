//! Common types and utilities shared across the AQHI mapping crates.

pub mod bbox;
pub mod error;
pub mod scale;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{AqhiError, AqhiResult};
pub use scale::{aqhi_color, AqhiCategory, NO_DATA, NO_DATA_COLOR};
pub use time::{format_timestamp, parse_timestamp, truncate_to_hour};
