//! Tariff vocabulary: who supplies, what size of customer, which time model,
//! and at what service voltage.
//!
//! Every enum parses leniently from the spellings seen in requests and rate
//! files (`FromStr`) and displays in the form used in bills and errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Distribution utility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Metropolitan Electricity Authority (Bangkok, Nonthaburi, Samut Prakan)
    Mea,
    /// Provincial Electricity Authority (rest of the country)
    Pea,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Mea, Provider::Pea];

    /// Voltage bands this utility publishes rate rows for
    pub fn voltage_bands(&self) -> [VoltageBand; 3] {
        match self {
            Provider::Mea => [
                VoltageBand::Below12Kv,
                VoltageBand::From12To24Kv,
                VoltageBand::AtLeast69Kv,
            ],
            Provider::Pea => [
                VoltageBand::Below22Kv,
                VoltageBand::From22To33Kv,
                VoltageBand::AtLeast69Kv,
            ],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Mea => f.write_str("MEA"),
            Provider::Pea => f.write_str("PEA"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mea" => Ok(Provider::Mea),
            "pea" => Ok(Provider::Pea),
            other => Err(format!("unknown provider '{}', expected 'mea' or 'pea'", other)),
        }
    }
}

/// Customer-size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomerTier {
    /// Small general service, no demand charge
    #[serde(rename = "type_2")]
    Type2,
    /// Medium general service
    #[serde(rename = "type_3")]
    Type3,
    /// Large general service
    #[serde(rename = "type_4")]
    Type4,
    /// Specific business service
    #[serde(rename = "type_5")]
    Type5,
}

impl CustomerTier {
    pub const ALL: [CustomerTier; 4] = [
        CustomerTier::Type2,
        CustomerTier::Type3,
        CustomerTier::Type4,
        CustomerTier::Type5,
    ];

    pub fn number(&self) -> u8 {
        match self {
            CustomerTier::Type2 => 2,
            CustomerTier::Type3 => 3,
            CustomerTier::Type4 => 4,
            CustomerTier::Type5 => 5,
        }
    }

    pub fn from_number(n: u64) -> Option<Self> {
        match n {
            2 => Some(CustomerTier::Type2),
            3 => Some(CustomerTier::Type3),
            4 => Some(CustomerTier::Type4),
            5 => Some(CustomerTier::Type5),
            _ => None,
        }
    }

    /// Whether bills for this tier carry demand, power-factor and floor charges
    pub fn has_demand_charge(&self) -> bool {
        !matches!(self, CustomerTier::Type2)
    }

    /// Tariff structures this tier may be billed under
    pub fn supported_structures(&self) -> &'static [TariffStructure] {
        match self {
            CustomerTier::Type4 => &[TariffStructure::Tod, TariffStructure::Tou],
            _ => &[TariffStructure::Normal, TariffStructure::Tou],
        }
    }

    pub fn supports(&self, structure: TariffStructure) -> bool {
        self.supported_structures().contains(&structure)
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type {}", self.number())
    }
}

impl FromStr for CustomerTier {
    type Err = String;

    /// Accepts `3`, `type3`, `type_3`, `type-3` and `Type 3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let digits = lowered
            .strip_prefix("type")
            .unwrap_or(&lowered)
            .trim_start_matches(['_', '-', ' ']);
        digits
            .parse::<u64>()
            .ok()
            .and_then(CustomerTier::from_number)
            .ok_or_else(|| format!("unknown customer type '{}', expected 2, 3, 4 or 5", s.trim()))
    }
}

/// Billing time model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffStructure {
    /// No time differentiation (flat or progressive energy rate)
    Normal,
    /// Time of use: on-peak / off-peak
    Tou,
    /// Time of day: on / partial / off-peak demand periods
    Tod,
}

impl TariffStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffStructure::Normal => "normal",
            TariffStructure::Tou => "tou",
            TariffStructure::Tod => "tod",
        }
    }
}

impl fmt::Display for TariffStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(TariffStructure::Normal),
            "tou" => Ok(TariffStructure::Tou),
            "tod" => Ok(TariffStructure::Tod),
            other => Err(format!(
                "unknown tariff structure '{}', expected 'normal', 'tou' or 'tod'",
                other
            )),
        }
    }
}

/// Service voltage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoltageBand {
    /// MEA low voltage
    #[serde(rename = "<12kV")]
    Below12Kv,
    /// MEA medium voltage
    #[serde(rename = "12-24kV")]
    From12To24Kv,
    /// PEA low voltage
    #[serde(rename = "<22kV")]
    Below22Kv,
    /// PEA medium voltage
    #[serde(rename = "22-33kV")]
    From22To33Kv,
    /// High voltage, both utilities
    #[serde(rename = ">=69kV")]
    AtLeast69Kv,
}

impl VoltageBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoltageBand::Below12Kv => "<12kV",
            VoltageBand::From12To24Kv => "12-24kV",
            VoltageBand::Below22Kv => "<22kV",
            VoltageBand::From22To33Kv => "22-33kV",
            VoltageBand::AtLeast69Kv => ">=69kV",
        }
    }
}

impl fmt::Display for VoltageBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoltageBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "<12kv" | "below_12kv" | "below12kv" => Ok(VoltageBand::Below12Kv),
            "12-24kv" | "12_24kv" => Ok(VoltageBand::From12To24Kv),
            "<22kv" | "below_22kv" | "below22kv" => Ok(VoltageBand::Below22Kv),
            "22-33kv" | "22_33kv" => Ok(VoltageBand::From22To33Kv),
            ">=69kv" | ">69kv" | "69kv" | "69kv+" | "at_least_69kv" => Ok(VoltageBand::AtLeast69Kv),
            _ => Err(format!(
                "unknown voltage band '{}', expected one of <12kV, 12-24kV, <22kV, 22-33kV, >=69kV",
                s.trim()
            )),
        }
    }
}

/// Composite lookup key of a rate row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateKey {
    pub provider: Provider,
    pub tier: CustomerTier,
    pub structure: TariffStructure,
    pub voltage: VoltageBand,
}

impl RateKey {
    pub fn new(
        provider: Provider,
        tier: CustomerTier,
        structure: TariffStructure,
        voltage: VoltageBand,
    ) -> Self {
        Self {
            provider,
            tier,
            structure,
            voltage,
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.provider, self.tier, self.structure, self.voltage
        )
    }
}
