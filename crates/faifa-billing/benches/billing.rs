//! Billing benchmarks
//!
//! - Engine arithmetic per tariff shape
//! - Full request path: JSON parse, validation, rate lookup, computation
//! - Cache hit path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal_macros::dec;

use faifa_billing::{compute_bill, BillCache, BillRequest, BillingService, RateTable};
use faifa_common::{
    BillingParameters, CustomerTier, Provider, RateKey, TariffStructure, UsageReading,
    VoltageBand,
};

// ============ ENGINE BENCHMARKS ============

fn bench_compute_bill(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let table = RateTable::reference().unwrap();

    let cases = [
        (
            "type2_normal",
            CustomerTier::Type2,
            TariffStructure::Normal,
            UsageReading::energy_only(dec!(1234.5)),
        ),
        (
            "type3_normal",
            CustomerTier::Type3,
            TariffStructure::Normal,
            UsageReading::with_peak(dec!(1500), dec!(75)),
        ),
        (
            "type4_tod",
            CustomerTier::Type4,
            TariffStructure::Tod,
            UsageReading::energy_only(dec!(50000))
                .with_on_peak_kw(dec!(100))
                .with_partial_peak_kw(dec!(80))
                .with_off_peak_kw(dec!(120)),
        ),
    ];
    let params = BillingParameters::new(dec!(39.72))
        .with_peak_kvar(dec!(60))
        .with_highest_demand_charge(dec!(10000));

    for (name, tier, structure, usage) in cases.iter() {
        let key = RateKey::new(Provider::Mea, *tier, *structure, VoltageBand::Below12Kv);
        let rate = table.resolve(&key).unwrap();

        group.bench_with_input(BenchmarkId::new("compute_bill", name), usage, |b, usage| {
            b.iter(|| compute_bill(*tier, *structure, black_box(rate), black_box(usage), &params))
        });
    }

    group.finish();
}

// ============ SERVICE BENCHMARKS ============

fn request() -> BillRequest {
    BillRequest::from_json(
        r#"{
            "provider": "mea",
            "tier": 3,
            "tariff_structure": "normal",
            "voltage_band": "<12kV",
            "usage": {"total_kwh": "1500", "peak_kw": 75},
            "ft_rate_satang": 39.72,
            "peak_kvar": 60,
            "highest_demand_charge": 10000
        }"#,
    )
    .unwrap()
}

fn bench_service(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");
    let request = request();

    let uncached = BillingService::reference().unwrap();
    group.bench_function("calculate", |b| {
        b.iter(|| uncached.calculate(black_box(&request)))
    });

    let cached = BillingService::reference()
        .unwrap()
        .with_cache(BillCache::new(1024));
    group.bench_function("calculate_cached", |b| {
        b.iter(|| cached.calculate(black_box(&request)))
    });

    group.bench_function("parse_request", |b| {
        b.iter(|| {
            BillRequest::from_json(black_box(
                r#"{"provider":"pea","tier":2,"tariff_structure":"tou","voltage_band":"<22kV","usage":{"on_peak_kwh":300,"off_peak_kwh":700},"ft_rate_satang":0}"#,
            ))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_compute_bill, bench_service);
criterion_main!(benches);
