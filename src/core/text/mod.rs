//! Text width helpers.
//!
//! These helpers are pure (string in, number or slice out) and are what the default
//! [`crate::core::measure::CellMeasure`] uses to size items.

pub mod width;
