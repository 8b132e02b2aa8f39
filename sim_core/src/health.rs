//! Slow-moving degradation state.
//!
//! State of health only ever goes down: a regeneration starts from the
//! previous value and subtracts per-cycle wear plus, occasionally, a small
//! random decrement. Temperatures, impedance and balance are free to jitter.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use crate::models::{BatteryModel, HealthSnapshot, TemperatureBand};

/// Capacity fade per full equivalent cycle.
pub const SOH_LOSS_PER_CYCLE_PCT: f64 = 0.004;
/// Lower bound for a freshly seeded asset; generators never go below zero.
pub const MIN_INITIAL_SOH_PCT: f64 = 70.0;
const RANDOM_FADE_PROBABILITY: f64 = 0.2;

/// Seeds health for an asset that has been in service since `install_date`.
pub fn initial_health(
    model: &BatteryModel,
    install_date: NaiveDate,
    cycle_count: u32,
    load_ratio: f64,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> HealthSnapshot {
    let age_years = ((now.date_naive() - install_date).num_days().max(0) as f64) / 365.25;
    let calendar_fade = age_years * rng.random_range(0.8..1.4);
    let cycle_fade = cycle_count as f64 * SOH_LOSS_PER_CYCLE_PCT;
    let soh = (100.0 - calendar_fade - cycle_fade).clamp(MIN_INITIAL_SOH_PCT, 100.0);
    health_at(model, soh, load_ratio, now, rng)
}

/// Regenerates health after `cycles_elapsed` full cycles since `previous`.
/// The returned `soh_pct` is never greater than `previous.soh_pct`.
pub fn degrade_health(
    previous: &HealthSnapshot,
    model: &BatteryModel,
    cycles_elapsed: u32,
    load_ratio: f64,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> HealthSnapshot {
    let mut soh = previous.soh_pct - cycles_elapsed as f64 * SOH_LOSS_PER_CYCLE_PCT;
    if rng.random_bool(RANDOM_FADE_PROBABILITY) {
        soh -= rng.random_range(0.0..0.01);
    }
    let soh = soh.min(previous.soh_pct).max(0.0);
    health_at(model, soh, load_ratio, now, rng)
}

/// Builds a health snapshot around a given SOH. `load_ratio` is
/// |power| / nameplate power and drives the temperature band.
pub fn health_at(
    model: &BatteryModel,
    soh_pct: f64,
    load_ratio: f64,
    timestamp: DateTime<Utc>,
    rng: &mut impl Rng,
) -> HealthSnapshot {
    let load = load_ratio.clamp(0.0, 1.0);
    let avg_c = 24.0 + 9.0 * load + rng.random_range(-1.0..1.0);
    let min_c = avg_c - rng.random_range(1.0..3.0);
    let max_c = avg_c + rng.random_range(1.5..4.5);
    let wear = (100.0 - soh_pct).max(0.0);
    HealthSnapshot {
        timestamp,
        soh_pct,
        cell_balance_pct: rng.random_range(97.0..99.8) - wear * 0.05,
        temperature: TemperatureBand { avg_c, min_c, max_c },
        internal_impedance_mohm: (0.8 + wear * 0.03) * rng.random_range(0.97..1.03),
        usable_capacity_kwh: model.capacity_kwh * soh_pct / 100.0,
        degradation_rate_pct_per_year: rng.random_range(1.5..2.8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn model() -> BatteryModel {
        BatteryModel::custom("T", 1000.0, 500.0)
    }

    #[test]
    fn new_asset_is_close_to_full_health() {
        let mut rng = StdRng::seed_from_u64(10);
        let now = Utc::now();
        let h = initial_health(&model(), now.date_naive(), 0, 0.0, now, &mut rng);
        assert_eq!(h.soh_pct, 100.0);
        assert!((h.usable_capacity_kwh - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn older_assets_start_lower_but_not_below_floor() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Utc::now();
        let install = now.date_naive() - chrono::Duration::days(365 * 4);
        let h = initial_health(&model(), install, 600, 0.2, now, &mut rng);
        assert!(h.soh_pct < 97.0);
        assert!(h.soh_pct >= MIN_INITIAL_SOH_PCT);
        let h = initial_health(&model(), install, 100_000, 0.2, now, &mut rng);
        assert_eq!(h.soh_pct, MIN_INITIAL_SOH_PCT);
    }

    #[test]
    fn degradation_never_increases_soh() {
        let mut rng = StdRng::seed_from_u64(12);
        let now = Utc::now();
        let mut h = health_at(&model(), 92.0, 0.5, now, &mut rng);
        for i in 0..2_000 {
            let next = degrade_health(&h, &model(), (i % 3) as u32, 0.5, now, &mut rng);
            assert!(next.soh_pct <= h.soh_pct);
            h = next;
        }
        assert!(h.soh_pct < 92.0);
    }

    #[test]
    fn cycles_subtract_fixed_wear() {
        let mut rng = StdRng::seed_from_u64(13);
        let now = Utc::now();
        let h = health_at(&model(), 90.0, 0.0, now, &mut rng);
        let next = degrade_health(&h, &model(), 10, 0.0, now, &mut rng);
        let expected = 90.0 - 10.0 * SOH_LOSS_PER_CYCLE_PCT;
        assert!(next.soh_pct <= expected + 1e-12);
        assert!(next.soh_pct >= expected - 0.01);
    }

    #[test]
    fn temperature_band_is_ordered() {
        let mut rng = StdRng::seed_from_u64(14);
        for _ in 0..200 {
            let h = health_at(&model(), 95.0, 1.0, Utc::now(), &mut rng);
            assert!(h.temperature.min_c < h.temperature.avg_c);
            assert!(h.temperature.avg_c < h.temperature.max_c);
        }
    }
}
