//! Reference MEA/PEA rate rows for commercial and industrial customers.
//!
//! Both utilities publish the same coefficients; they differ only in the
//! names of their low and medium voltage bands and in which Type 5
//! structures they offer.

use faifa_common::{CustomerTier, Provider, RateKey, TariffStructure};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::entry::{DemandCharge, EnergyTier, RateEntry, RateRecord};

const SMALL_SERVICE_CHARGE: Decimal = dec!(33.29);
const SERVICE_CHARGE: Decimal = dec!(312.24);

/// Flat energy rate per voltage level: high, medium, low
const FLAT_ENERGY: [Decimal; 3] = [dec!(3.1097), dec!(3.1471), dec!(3.1751)];

/// Time-of-use rows per voltage level: (demand, on-peak energy, off-peak energy)
const TOU: [(Decimal, Decimal, Decimal); 3] = [
    (dec!(74.14), dec!(4.1025), dec!(2.5849)),
    (dec!(132.93), dec!(4.1839), dec!(2.6037)),
    (dec!(210.00), dec!(4.3297), dec!(2.6369)),
];

/// Type 3 normal demand rate per voltage level
const MEDIUM_DEMAND: [Decimal; 3] = [dec!(175.70), dec!(196.26), dec!(221.50)];

/// Type 5 normal demand rate per voltage level
const SPECIFIC_DEMAND: [Decimal; 3] = [dec!(220.56), dec!(256.07), dec!(276.64)];

/// Type 4 time-of-day demand rates per voltage level: (on, partial, off)
const TOD_DEMAND: [(Decimal, Decimal, Decimal); 3] = [
    (dec!(224.30), dec!(29.91), dec!(0)),
    (dec!(285.05), dec!(58.88), dec!(0)),
    (dec!(332.71), dec!(68.22), dec!(0)),
];

/// Rows for both utilities
pub fn records() -> Vec<RateRecord> {
    let mut records = provider_records(Provider::Mea);
    records.extend(provider_records(Provider::Pea));
    records
}

fn provider_records(provider: Provider) -> Vec<RateRecord> {
    // Provider::voltage_bands lists low, medium, high
    let [low, medium, high] = provider.voltage_bands();
    let levels = [high, medium, low];
    let row = |tier, structure, voltage, entry| {
        RateRecord::new(RateKey::new(provider, tier, structure, voltage), entry)
    };

    let mut records = vec![
        row(
            CustomerTier::Type2,
            TariffStructure::Normal,
            low,
            RateEntry::tiered(
                SMALL_SERVICE_CHARGE,
                vec![
                    EnergyTier::new(dec!(0), dec!(3.2484)),
                    EnergyTier::new(dec!(150), dec!(4.2218)),
                    EnergyTier::new(dec!(400), dec!(4.4217)),
                ],
            ),
        ),
        row(
            CustomerTier::Type2,
            TariffStructure::Normal,
            medium,
            RateEntry::flat(SERVICE_CHARGE, dec!(3.9086)),
        ),
        row(
            CustomerTier::Type2,
            TariffStructure::Tou,
            low,
            RateEntry::time_of_use(SMALL_SERVICE_CHARGE, dec!(5.7982), dec!(2.6369)),
        ),
        row(
            CustomerTier::Type2,
            TariffStructure::Tou,
            medium,
            RateEntry::time_of_use(SERVICE_CHARGE, dec!(5.1135), dec!(2.6037)),
        ),
    ];

    for (i, voltage) in levels.into_iter().enumerate() {
        let (tou_demand, on_peak, off_peak) = TOU[i];
        let tou = RateEntry::time_of_use(SERVICE_CHARGE, on_peak, off_peak)
            .with_demand(DemandCharge::TimeOfUse { rate: tou_demand });
        let (tod_on, tod_partial, tod_off) = TOD_DEMAND[i];

        records.push(row(
            CustomerTier::Type3,
            TariffStructure::Normal,
            voltage,
            RateEntry::flat(SERVICE_CHARGE, FLAT_ENERGY[i])
                .with_demand(DemandCharge::Flat { rate: MEDIUM_DEMAND[i] }),
        ));
        records.push(row(CustomerTier::Type3, TariffStructure::Tou, voltage, tou.clone()));
        records.push(row(
            CustomerTier::Type4,
            TariffStructure::Tod,
            voltage,
            RateEntry::flat(SERVICE_CHARGE, FLAT_ENERGY[i]).with_demand(DemandCharge::TimeOfDay {
                on_peak_rate: tod_on,
                partial_peak_rate: tod_partial,
                off_peak_rate: tod_off,
            }),
        ));
        records.push(row(CustomerTier::Type4, TariffStructure::Tou, voltage, tou.clone()));
        if provider == Provider::Mea {
            records.push(row(
                CustomerTier::Type5,
                TariffStructure::Normal,
                voltage,
                RateEntry::flat(SERVICE_CHARGE, FLAT_ENERGY[i])
                    .with_demand(DemandCharge::Flat { rate: SPECIFIC_DEMAND[i] }),
            ));
        }
        records.push(row(CustomerTier::Type5, TariffStructure::Tou, voltage, tou));
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_counts() {
        assert_eq!(provider_records(Provider::Mea).len(), 22);
        // PEA offers Type 5 on time-of-use only
        assert_eq!(provider_records(Provider::Pea).len(), 19);
    }

    #[test]
    fn test_every_row_is_well_shaped() {
        for record in records() {
            record
                .entry
                .validate_shape(record.key.tier, record.key.structure)
                .unwrap();
        }
    }

    #[test]
    fn test_rows_use_provider_bands() {
        for record in provider_records(Provider::Pea) {
            assert!(Provider::Pea.voltage_bands().contains(&record.key.voltage));
        }
    }
}
