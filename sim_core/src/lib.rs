//! Shared simulation types and metric generators for a BESS fleet.
//! Keep this crate free of HTTP/runtime deps: every generator is a plain
//! function of its inputs plus an explicit `Rng`, so seeded runs repeat.

pub mod alerts;
pub mod catalog;
pub mod grid;
pub mod health;
pub mod models;
pub mod power;
pub mod safety;
pub mod telemetry;

use rand::Rng;

pub use grid::OperatingPoint;
pub use models::*;

/// Maps a configured probability onto `[0, 1]`; NaN counts as never.
pub fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Per-tick derived groups that are rebuilt from scratch every time.
#[derive(Clone, Debug)]
pub struct DerivedMetrics {
    pub telemetry: Telemetry,
    pub enhanced: EnhancedMetrics,
    pub demand_response: DemandResponseState,
    pub ancillary_services: AncillaryServices,
    pub revenue: RevenueTracking,
    pub safety: SafetyStatus,
}

pub fn derive_metrics(
    asset: &Asset,
    point: OperatingPoint,
    alerts: &[Alert],
    rng: &mut impl Rng,
) -> DerivedMetrics {
    let model = &asset.model;
    let telemetry = telemetry::telemetry(point.power_kw, point.timestamp, rng);
    let enhanced = telemetry::enhanced_metrics(model, point.power_kw, point.soc_pct, rng);
    let demand_response = grid::demand_response(model, point, rng);
    let ancillary_services = grid::ancillary_services(model, point, rng);
    let revenue = grid::revenue(model, point, &ancillary_services, &demand_response, rng);
    let safety = safety::safety_status(
        enhanced.cell_temperature.max_c,
        alerts,
        asset.configuration.install_date,
        point.timestamp,
        rng,
    );
    DerivedMetrics {
        telemetry,
        enhanced,
        demand_response,
        ancillary_services,
        revenue,
        safety,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn derived_metrics_serialize_with_all_groups() {
        let asset = Asset::new(
            "bess-t",
            "Test",
            Location {
                latitude: 34.0,
                longitude: -118.0,
                label: "LA".into(),
            },
            BatteryModel::custom("T", 1000.0, 500.0),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        );
        // Feb 29 + 10 years has no such day; warranty falls back to install date
        assert_eq!(asset.configuration.warranty_expiry, asset.configuration.install_date);

        let point = OperatingPoint {
            power_kw: 200.0,
            soc_pct: 55.0,
            timestamp: Utc::now(),
            hour: 18,
        };
        let mut rng = StdRng::seed_from_u64(60);
        let d = derive_metrics(&asset, point, &[], &mut rng);
        let json = serde_json::to_value(&d.ancillary_services).unwrap();
        for key in [
            "frequency_regulation",
            "spinning_reserve",
            "non_spinning_reserve",
            "load_following",
            "voltage_support",
            "black_start",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(d.demand_response.programs.len(), 3);
    }

    #[test]
    fn probability_clamps_and_treats_nan_as_zero() {
        assert_eq!(probability(f64::NAN), 0.0);
        assert_eq!(probability(-0.5), 0.0);
        assert_eq!(probability(0.25), 0.25);
        assert_eq!(probability(3.0), 1.0);
        assert_eq!(probability(f64::INFINITY), 1.0);
    }
}
