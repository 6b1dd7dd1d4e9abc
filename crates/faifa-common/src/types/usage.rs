//! Normalized metered usage and per-invocation billing parameters

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metered consumption and demand for one billing period, after normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageReading {
    /// Total energy (kWh), derived from the period split when not metered directly
    pub total_kwh: Decimal,
    /// On-peak energy (kWh)
    pub on_peak_kwh: Option<Decimal>,
    /// Off-peak energy (kWh)
    pub off_peak_kwh: Option<Decimal>,
    /// Highest demand (kW) across whichever periods were metered
    pub overall_peak_kw: Decimal,
    /// On-peak demand (kW)
    pub on_peak_kw: Option<Decimal>,
    /// Off-peak demand (kW)
    pub off_peak_kw: Option<Decimal>,
    /// Partial-peak demand (kW), time-of-day tariffs only
    pub partial_peak_kw: Option<Decimal>,
}

impl UsageReading {
    /// Flat consumption with no demand reading
    pub fn energy_only(total_kwh: Decimal) -> Self {
        Self {
            total_kwh,
            ..Default::default()
        }
    }

    /// Flat consumption with a single peak demand reading
    pub fn with_peak(total_kwh: Decimal, peak_kw: Decimal) -> Self {
        Self {
            total_kwh,
            overall_peak_kw: peak_kw,
            ..Default::default()
        }
    }

    /// On/off-peak energy split; total is the sum of both periods
    pub fn time_of_use(on_peak_kwh: Decimal, off_peak_kwh: Decimal) -> Self {
        Self {
            total_kwh: on_peak_kwh + off_peak_kwh,
            on_peak_kwh: Some(on_peak_kwh),
            off_peak_kwh: Some(off_peak_kwh),
            ..Default::default()
        }
    }

    /// Set on-peak demand and refresh the overall peak
    pub fn with_on_peak_kw(mut self, kw: Decimal) -> Self {
        self.on_peak_kw = Some(kw);
        self.refresh_overall_peak();
        self
    }

    /// Set partial-peak demand and refresh the overall peak
    pub fn with_partial_peak_kw(mut self, kw: Decimal) -> Self {
        self.partial_peak_kw = Some(kw);
        self.refresh_overall_peak();
        self
    }

    /// Set off-peak demand and refresh the overall peak
    pub fn with_off_peak_kw(mut self, kw: Decimal) -> Self {
        self.off_peak_kw = Some(kw);
        self.refresh_overall_peak();
        self
    }

    /// Energy billed for fuel adjustment under time-of-use: both periods summed
    pub fn period_kwh(&self) -> Option<Decimal> {
        Some(self.on_peak_kwh? + self.off_peak_kwh?)
    }

    fn refresh_overall_peak(&mut self) {
        self.overall_peak_kw = [self.on_peak_kw, self.partial_peak_kw, self.off_peak_kw]
            .into_iter()
            .flatten()
            .fold(self.overall_peak_kw, Decimal::max);
    }

    /// Every populated numeric field with its request-facing name
    pub fn populated_fields(&self) -> Vec<(&'static str, Decimal)> {
        let mut fields = vec![
            ("total_kwh", self.total_kwh),
            ("peak_kw", self.overall_peak_kw),
        ];
        let optional = [
            ("on_peak_kwh", self.on_peak_kwh),
            ("off_peak_kwh", self.off_peak_kwh),
            ("on_peak_kw", self.on_peak_kw),
            ("off_peak_kw", self.off_peak_kw),
            ("partial_peak_kw", self.partial_peak_kw),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );
        fields
    }
}

/// Scalar inputs supplied per bill, outside the meter reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingParameters {
    /// Fuel adjustment (Ft) rate in satang per kWh
    pub ft_rate_satang: Decimal,
    /// Highest reactive power (kVAR) in the period; demand tiers only
    pub peak_kvar: Decimal,
    /// Highest demand charge billed in the trailing 12 months; demand tiers only
    pub highest_demand_charge: Decimal,
}

impl BillingParameters {
    pub fn new(ft_rate_satang: Decimal) -> Self {
        Self {
            ft_rate_satang,
            ..Default::default()
        }
    }

    pub fn with_peak_kvar(mut self, kvar: Decimal) -> Self {
        self.peak_kvar = kvar;
        self
    }

    pub fn with_highest_demand_charge(mut self, charge: Decimal) -> Self {
        self.highest_demand_charge = charge;
        self
    }
}
