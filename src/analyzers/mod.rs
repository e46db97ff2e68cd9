//! Weekly aggregation and week-over-week comparison.
//!
//! Records are bucketed into Monday-to-Sunday weeks, checked for missing
//! days, grouped per [`dimension::Dimension`], and compared pair by pair.
//! [`analyzer::run`] drives the whole pipeline for every configured dimension.

pub mod aggregate;
pub mod analyzer;
pub mod compare;
pub mod dimension;
pub mod highlight;
pub mod types;
pub mod utility;
pub mod week;
