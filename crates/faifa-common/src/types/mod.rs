//! Core data types for the Faifa billing engine

pub mod bill;
pub mod tariff;
pub mod usage;
