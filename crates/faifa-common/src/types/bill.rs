//! Bill Types - itemized output of one engine invocation
//!
//! Two shapes exist:
//! - [`SimpleBill`]: Type 2 customers (energy + service + Ft + VAT)
//! - [`DemandBill`]: Types 3/4/5 (adds demand, minimum-bill floor and power factor)
//!
//! Monetary fields are rounded per field with a fixed, asymmetric precision
//! (see [`BillPrecision`]). Aggregates are summed from already-rounded line
//! items, so every total on a bill adds up exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places used for each kind of bill field
pub struct BillPrecision;

impl BillPrecision {
    /// Energy charge, base tariff, subtotals, power-factor charge
    pub const CHARGE_SCALE: u32 = 3;

    /// Demand charges and fuel adjustment charge
    pub const DEMAND_SCALE: u32 = 1;

    /// VAT and grand totals
    pub const TOTAL_SCALE: u32 = 5;

    /// Half-up rounding to `scale` places.
    ///
    /// All bill amounts are non-negative, where this matches the half-up
    /// behaviour billing clerks expect (banker's rounding would not).
    pub fn round(value: Decimal, scale: u32) -> Decimal {
        value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn round_charge(value: Decimal) -> Decimal {
        Self::round(value, Self::CHARGE_SCALE)
    }

    pub fn round_demand(value: Decimal) -> Decimal {
        Self::round(value, Self::DEMAND_SCALE)
    }

    pub fn round_total(value: Decimal) -> Decimal {
        Self::round(value, Self::TOTAL_SCALE)
    }

    /// Nearest whole unit, used for excess kVAR
    pub fn round_whole(value: Decimal) -> Decimal {
        Self::round(value, 0)
    }
}

/// Bill for a customer without demand metering (Type 2)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleBill {
    pub energy_charge: Decimal,
    pub service_charge: Decimal,
    /// energy charge + service charge
    pub base_tariff: Decimal,
    pub fuel_adjustment_charge: Decimal,
    pub vat: Decimal,
    pub total_bill: Decimal,
}

impl SimpleBill {
    /// Amount VAT is levied on
    pub fn pre_vat_total(&self) -> Decimal {
        self.base_tariff + self.fuel_adjustment_charge
    }
}

/// Bill for a demand-metered customer (Types 3, 4, 5)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandBill {
    /// Demand charge from this period's readings
    pub calculated_demand_charge: Decimal,
    pub energy_charge: Decimal,
    /// Demand charge after the minimum-bill floor
    pub effective_demand_charge: Decimal,
    pub power_factor_charge: Decimal,
    pub service_charge: Decimal,
    pub fuel_adjustment_charge: Decimal,
    /// Everything before VAT, fuel adjustment included
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub grand_total: Decimal,
}

impl DemandBill {
    /// Subtotal before the fuel adjustment charge is added
    pub fn base_subtotal(&self) -> Decimal {
        self.subtotal - self.fuel_adjustment_charge
    }

    /// Whether the minimum-bill floor raised the demand charge
    pub fn floor_applied(&self) -> bool {
        self.effective_demand_charge > self.calculated_demand_charge
    }
}

/// Output of the billing engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BillResult {
    Simple(SimpleBill),
    Full(DemandBill),
}

impl BillResult {
    /// Amount payable, VAT included
    pub fn total(&self) -> Decimal {
        match self {
            BillResult::Simple(bill) => bill.total_bill,
            BillResult::Full(bill) => bill.grand_total,
        }
    }

    pub fn vat(&self) -> Decimal {
        match self {
            BillResult::Simple(bill) => bill.vat,
            BillResult::Full(bill) => bill.vat,
        }
    }

    pub fn energy_charge(&self) -> Decimal {
        match self {
            BillResult::Simple(bill) => bill.energy_charge,
            BillResult::Full(bill) => bill.energy_charge,
        }
    }

    pub fn fuel_adjustment_charge(&self) -> Decimal {
        match self {
            BillResult::Simple(bill) => bill.fuel_adjustment_charge,
            BillResult::Full(bill) => bill.fuel_adjustment_charge,
        }
    }

    /// Amount VAT is levied on
    pub fn pre_vat_total(&self) -> Decimal {
        match self {
            BillResult::Simple(bill) => bill.pre_vat_total(),
            BillResult::Full(bill) => bill.subtotal,
        }
    }

    /// Every monetary line item with its wire name, in bill order
    pub fn line_items(&self) -> Vec<(&'static str, Decimal)> {
        match self {
            BillResult::Simple(bill) => vec![
                ("energyCharge", bill.energy_charge),
                ("serviceCharge", bill.service_charge),
                ("baseTariff", bill.base_tariff),
                ("fuelAdjustmentCharge", bill.fuel_adjustment_charge),
                ("vat", bill.vat),
                ("totalBill", bill.total_bill),
            ],
            BillResult::Full(bill) => vec![
                ("calculatedDemandCharge", bill.calculated_demand_charge),
                ("energyCharge", bill.energy_charge),
                ("effectiveDemandCharge", bill.effective_demand_charge),
                ("powerFactorCharge", bill.power_factor_charge),
                ("serviceCharge", bill.service_charge),
                ("fuelAdjustmentCharge", bill.fuel_adjustment_charge),
                ("subtotal", bill.subtotal),
                ("vat", bill.vat),
                ("grandTotal", bill.grand_total),
            ],
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleBill> {
        match self {
            BillResult::Simple(bill) => Some(bill),
            BillResult::Full(_) => None,
        }
    }

    pub fn as_full(&self) -> Option<&DemandBill> {
        match self {
            BillResult::Full(bill) => Some(bill),
            BillResult::Simple(_) => None,
        }
    }
}
