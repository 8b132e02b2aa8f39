//! Alert templates and the per-tick raise/clear roll.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::{Builder, Uuid};

use crate::models::{Alert, AlertCategory, AlertSeverity};
use crate::probability;

const TEMPLATES: &[(AlertCategory, AlertSeverity, &str, &str)] = &[
    (AlertCategory::Temperature, AlertSeverity::Medium, "TMP-101", "Module temperature above 40 C"),
    (AlertCategory::Temperature, AlertSeverity::High, "TMP-204", "Cell temperature differential exceeds 8 C"),
    (AlertCategory::Voltage, AlertSeverity::Medium, "VLT-110", "Cell voltage imbalance detected"),
    (AlertCategory::Voltage, AlertSeverity::High, "VLT-302", "DC bus overvoltage warning"),
    (AlertCategory::Current, AlertSeverity::Medium, "CUR-120", "String current deviation above 5%"),
    (AlertCategory::StateOfCharge, AlertSeverity::Low, "SOC-010", "SOC estimate recalibration pending"),
    (AlertCategory::Maintenance, AlertSeverity::Low, "MNT-001", "Scheduled inspection due within 14 days"),
    (AlertCategory::Maintenance, AlertSeverity::Medium, "MNT-017", "HVAC filter replacement required"),
    (AlertCategory::Communication, AlertSeverity::Medium, "COM-404", "BMS heartbeat delayed"),
    (AlertCategory::Communication, AlertSeverity::Low, "COM-220", "Site controller link degraded"),
    (AlertCategory::Safety, AlertSeverity::Critical, "SAF-900", "Off-gas sensor threshold exceeded"),
];

/// Random v4-layout UUID drawn from `rng`, so seeded runs stay reproducible.
pub fn alert_id(rng: &mut impl Rng) -> Uuid {
    Builder::from_random_bytes(rng.random::<u128>().to_le_bytes()).into_uuid()
}

pub fn alert(
    category: AlertCategory,
    severity: AlertSeverity,
    code: &str,
    message: &str,
    timestamp: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Alert {
    Alert {
        id: alert_id(rng),
        category,
        severity,
        message: message.to_string(),
        timestamp,
        code: code.to_string(),
    }
}

pub fn random_alert(timestamp: DateTime<Utc>, rng: &mut impl Rng) -> Alert {
    let (category, severity, code, message) = TEMPLATES[rng.random_range(0..TEMPLATES.len())];
    alert(category, severity, code, message, timestamp, rng)
}

pub fn emergency_discharge_alert(timestamp: DateTime<Utc>, rng: &mut impl Rng) -> Alert {
    alert(
        AlertCategory::Safety,
        AlertSeverity::High,
        "SAF-501",
        "Emergency discharge initiated",
        timestamp,
        rng,
    )
}

pub fn maintenance_mode_alert(timestamp: DateTime<Utc>, rng: &mut impl Rng) -> Alert {
    alert(
        AlertCategory::Maintenance,
        AlertSeverity::Low,
        "MNT-100",
        "Asset placed in maintenance mode",
        timestamp,
        rng,
    )
}

/// Sparse alerts used when synthesizing history.
pub fn historical_maintenance_alert(timestamp: DateTime<Utc>, rng: &mut impl Rng) -> Alert {
    const HISTORY: &[(AlertSeverity, &str, &str)] = &[
        (AlertSeverity::Low, "MNT-001", "Routine inspection completed"),
        (AlertSeverity::Low, "MNT-012", "Firmware update applied"),
        (AlertSeverity::Medium, "MNT-017", "HVAC filter replaced"),
        (AlertSeverity::Medium, "MNT-031", "Module rebalancing performed"),
    ];
    let (severity, code, message) = HISTORY[rng.random_range(0..HISTORY.len())];
    alert(AlertCategory::Maintenance, severity, code, message, timestamp, rng)
}

/// One roll per tick: maybe raise a new alert, otherwise maybe clear all.
/// Returns true when the list changed.
pub fn roll_alerts(
    alerts: &mut Vec<Alert>,
    raise_probability: f64,
    clear_probability: f64,
    timestamp: DateTime<Utc>,
    rng: &mut impl Rng,
) -> bool {
    if rng.random_bool(probability(raise_probability)) {
        alerts.push(random_alert(timestamp, rng));
        true
    } else if !alerts.is_empty() && rng.random_bool(probability(clear_probability)) {
        alerts.clear();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn ids_are_reproducible_for_a_seed() {
        let a = alert_id(&mut StdRng::seed_from_u64(40));
        let b = alert_id(&mut StdRng::seed_from_u64(40));
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn emergency_alert_is_high_severity_safety() {
        let a = emergency_discharge_alert(Utc::now(), &mut StdRng::seed_from_u64(41));
        assert_eq!(a.category, AlertCategory::Safety);
        assert_eq!(a.severity, AlertSeverity::High);
    }

    #[test]
    fn certain_raise_appends_and_certain_clear_empties() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut alerts = Vec::new();
        assert!(roll_alerts(&mut alerts, 1.0, 0.0, Utc::now(), &mut rng));
        assert!(roll_alerts(&mut alerts, 1.0, 0.0, Utc::now(), &mut rng));
        assert_eq!(alerts.len(), 2);
        assert!(roll_alerts(&mut alerts, 0.0, 1.0, Utc::now(), &mut rng));
        assert!(alerts.is_empty());
        assert!(!roll_alerts(&mut alerts, 0.0, 1.0, Utc::now(), &mut rng));
    }

    #[test]
    fn nan_probabilities_never_fire() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut alerts = vec![random_alert(Utc::now(), &mut rng)];
        for _ in 0..100 {
            assert!(!roll_alerts(&mut alerts, f64::NAN, f64::NAN, Utc::now(), &mut rng));
        }
        assert_eq!(alerts.len(), 1);
    }
}
