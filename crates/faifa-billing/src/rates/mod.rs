//! Rate model
//!
//! Typed tariff coefficients and the lookup table that maps
//! (provider, tier, structure, voltage) to them:
//! - [`RateEntry`]: service charge + energy shape + optional demand shape
//! - [`RateTable`]: validated, read-only table with JSON loading
//! - `reference`: built-in MEA/PEA coefficients

pub mod entry;
mod reference;
pub mod table;

pub use entry::{DemandCharge, EnergyCharge, EnergyTier, RateEntry, RateRecord};
pub use table::RateTable;
