//! Pattern rules for page-level fields.

pub mod address;
pub mod dates;
pub mod patterns;

pub use address::extract_address;
pub use dates::parse_test_date;
pub use patterns::*;
