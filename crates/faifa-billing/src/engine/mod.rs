//! Billing engine
//!
//! Pure functions from (tier, structure, rate row, usage, parameters) to an
//! itemized [`faifa_common::BillResult`]. No I/O and no shared state; safe to
//! call from any number of threads.

pub mod calculator;
pub mod demand;
pub mod energy;

pub use calculator::{compute_bill, ensure_supported};
