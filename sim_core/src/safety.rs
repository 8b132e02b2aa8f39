//! Site safety systems: gas detection, fire suppression, interlocks.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;

use crate::models::{
    Alert, AlertCategory, AlertSeverity, FireSuppression, GasDetection, RiskLevel, SafetyLevel,
    SafetyStatus,
};

const CAUTION_CELL_TEMP_C: f64 = 45.0;
const ALARM_CELL_TEMP_C: f64 = 55.0;
const HYDROGEN_ALARM_PPM: f64 = 25.0;
/// Chance per reading of an off-gas excursion past the hydrogen alarm.
pub const HYDROGEN_EXCURSION_PROBABILITY: f64 = 0.002;

pub fn thermal_runaway_risk(max_cell_temp_c: f64) -> RiskLevel {
    if max_cell_temp_c >= ALARM_CELL_TEMP_C {
        RiskLevel::High
    } else if max_cell_temp_c >= CAUTION_CELL_TEMP_C {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Background sensor readings with an occasional hydrogen excursion.
pub fn gas_detection(excursion_probability: f64, rng: &mut impl Rng) -> GasDetection {
    let hydrogen_ppm = if rng.random_bool(crate::probability(excursion_probability)) {
        rng.random_range(HYDROGEN_ALARM_PPM..HYDROGEN_ALARM_PPM * 1.6)
    } else {
        rng.random_range(0.0..5.0)
    };
    GasDetection {
        hydrogen_ppm,
        carbon_monoxide_ppm: rng.random_range(0.0..9.0),
        voc_ppm: rng.random_range(0.0..40.0),
        alarm: hydrogen_ppm >= HYDROGEN_ALARM_PPM,
    }
}

pub fn overall_level(
    risk: RiskLevel,
    worst_safety_alert: Option<AlertSeverity>,
    gas_alarm: bool,
) -> SafetyLevel {
    match (risk, worst_safety_alert) {
        (RiskLevel::High, _) | (_, Some(AlertSeverity::Critical)) => SafetyLevel::Alarm,
        _ if gas_alarm => SafetyLevel::Alarm,
        (RiskLevel::Moderate, _) | (_, Some(AlertSeverity::High)) => SafetyLevel::Caution,
        _ => SafetyLevel::Normal,
    }
}

/// `max_cell_temp_c` comes from the BMS metrics of the same tick; active
/// safety alerts and a gas alarm lift the overall level.
pub fn safety_status(
    max_cell_temp_c: f64,
    alerts: &[Alert],
    install_date: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> SafetyStatus {
    let gas_detection = gas_detection(HYDROGEN_EXCURSION_PROBABILITY, rng);
    let risk = thermal_runaway_risk(max_cell_temp_c);
    let worst_safety_alert = alerts
        .iter()
        .filter(|a| a.category == AlertCategory::Safety)
        .map(|a| a.severity)
        .max();
    let overall = overall_level(risk, worst_safety_alert, gas_detection.alarm);

    let today = now.date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);
    let last_inspection = today
        .with_month0((today.month0() / 6) * 6)
        .and_then(|d| d.with_day(1))
        .map(|d| d.max(install_date))
        .unwrap_or(install_date);

    SafetyStatus {
        overall,
        thermal_runaway_risk: risk,
        gas_detection,
        fire_suppression: FireSuppression {
            armed: true,
            agent_pressure_bar: rng.random_range(24.0..26.0),
            last_test: first_of_month,
        },
        smoke_detected: false,
        emergency_stop_engaged: false,
        door_interlocks_closed: true,
        ventilation_active: max_cell_temp_c >= CAUTION_CELL_TEMP_C - 10.0,
        ground_fault_detected: false,
        last_inspection,
    }
}
