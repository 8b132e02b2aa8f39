//! Market-facing state: demand-response programs, ancillary services and
//! revenue. Regenerated in full on every tick from power, SOC and nameplate.

use chrono::{DateTime, Datelike, Duration, DurationRound, Utc};
use rand::Rng;

use crate::models::{
    AncillaryServices, BatteryModel, DemandResponseState, DrEvent, DrEventStatus, DrProgram,
    DrProgramKind, DrProgramStatus, RevenueTracking, ServiceParticipation,
};
use crate::telemetry::available_power;

/// Local hours (inclusive) of the evening peak dispatch window.
pub const PEAK_START_HOUR: u32 = 17;
pub const PEAK_END_HOUR: u32 = 21;

/// Where the asset is right now; shared input of the market generators.
#[derive(Clone, Copy, Debug)]
pub struct OperatingPoint {
    pub power_kw: f64,
    pub soc_pct: f64,
    pub timestamp: DateTime<Utc>,
    /// Local hour of day, 0-23.
    pub hour: u32,
}

fn hour_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::hours(1)).unwrap_or(ts)
}

fn programs_for(model: &BatteryModel, peak_active: bool) -> Vec<DrProgram> {
    let status = if peak_active {
        DrProgramStatus::Active
    } else {
        DrProgramStatus::Enrolled
    };
    vec![
        DrProgram {
            id: "cbp".to_string(),
            name: "Capacity Bidding Program".to_string(),
            kind: DrProgramKind::CapacityBidding,
            status,
            committed_kw: model.power_kw * 0.5,
            payment_per_kw_month: 8.5,
            penalty_per_kwh: 0.6,
        },
        DrProgram {
            id: "elrp".to_string(),
            name: "Emergency Load Reduction".to_string(),
            kind: DrProgramKind::EmergencyLoadReduction,
            status: DrProgramStatus::Enrolled,
            committed_kw: model.power_kw * 0.3,
            payment_per_kw_month: 2.0,
            penalty_per_kwh: 1.0,
        },
        DrProgram {
            id: "ptr".to_string(),
            name: "Peak Time Rebate".to_string(),
            kind: DrProgramKind::PeakTimeRebate,
            status: DrProgramStatus::Enrolled,
            committed_kw: model.power_kw * 0.2,
            payment_per_kw_month: 1.2,
            penalty_per_kwh: 0.0,
        },
    ]
}

fn event_id(program_id: &str, start: DateTime<Utc>) -> String {
    format!("{program_id}-{}", start.format("%Y%m%d"))
}

pub fn demand_response(
    model: &BatteryModel,
    point: OperatingPoint,
    rng: &mut impl Rng,
) -> DemandResponseState {
    let peak_active = (PEAK_START_HOUR..=PEAK_END_HOUR).contains(&point.hour);
    let programs = programs_for(model, peak_active);
    let capacity_program = &programs[0];
    let requested_kw = capacity_program.committed_kw;

    // Today's peak window, expressed relative to the current hour.
    let this_hour = hour_floor(point.timestamp);
    let window_start = this_hour + Duration::hours(PEAK_START_HOUR as i64 - point.hour as i64);
    let window_len = Duration::hours((PEAK_END_HOUR - PEAK_START_HOUR + 1) as i64);

    let mut events = Vec::new();
    for days_ago in [6_i64, 3] {
        let start = window_start - Duration::days(days_ago);
        let performance_pct = rng.random_range(85.0..110.0);
        events.push(DrEvent {
            id: event_id(&capacity_program.id, start),
            program_id: capacity_program.id.clone(),
            start,
            end: start + window_len,
            requested_kw,
            delivered_kw: requested_kw * performance_pct / 100.0,
            performance_pct,
            status: DrEventStatus::Completed,
        });
    }

    let curtailment_kw = if peak_active { point.power_kw.max(0.0) } else { 0.0 };
    let today = if peak_active {
        let performance_pct = if requested_kw > 0.0 {
            (curtailment_kw / requested_kw * 100.0).min(120.0)
        } else {
            0.0
        };
        DrEvent {
            id: event_id(&capacity_program.id, window_start),
            program_id: capacity_program.id.clone(),
            start: window_start,
            end: window_start + window_len,
            requested_kw,
            delivered_kw: curtailment_kw,
            performance_pct,
            status: DrEventStatus::Active,
        }
    } else if point.hour < PEAK_START_HOUR {
        DrEvent {
            id: event_id(&capacity_program.id, window_start),
            program_id: capacity_program.id.clone(),
            start: window_start,
            end: window_start + window_len,
            requested_kw,
            delivered_kw: 0.0,
            performance_pct: 0.0,
            status: DrEventStatus::Scheduled,
        }
    } else {
        let performance_pct = rng.random_range(90.0..110.0);
        DrEvent {
            id: event_id(&capacity_program.id, window_start),
            program_id: capacity_program.id.clone(),
            start: window_start,
            end: window_start + window_len,
            requested_kw,
            delivered_kw: requested_kw * performance_pct / 100.0,
            performance_pct,
            status: DrEventStatus::Completed,
        }
    };
    events.push(today);

    let completed: Vec<&DrEvent> = events
        .iter()
        .filter(|e| e.status == DrEventStatus::Completed)
        .collect();
    let performance_score = if completed.is_empty() {
        100.0
    } else {
        completed.iter().map(|e| e.performance_pct.min(100.0)).sum::<f64>() / completed.len() as f64
    };
    let window_hours = (PEAK_END_HOUR - PEAK_START_HOUR + 1) as f64;
    let penalties_month = completed
        .iter()
        .map(|e| (e.requested_kw - e.delivered_kw).max(0.0) * window_hours)
        .sum::<f64>()
        * capacity_program.penalty_per_kwh;

    let month_fraction = point.timestamp.day() as f64 / 30.0;
    let revenue_month = programs
        .iter()
        .map(|p| p.committed_kw * p.payment_per_kw_month)
        .sum::<f64>()
        * month_fraction;

    let (_, available_discharge_kw) = available_power(model, point.soc_pct);
    DemandResponseState {
        programs,
        events,
        available_kw: available_discharge_kw,
        baseline_kw: model.power_kw * rng.random_range(0.05..0.12),
        curtailment_kw,
        performance_score,
        revenue_month,
        penalties_month,
    }
}

fn participation(
    enabled: bool,
    capacity_kw: f64,
    price_per_mw_hour: f64,
    point: OperatingPoint,
    rng: &mut impl Rng,
) -> ServiceParticipation {
    if !enabled {
        return ServiceParticipation {
            enabled,
            capacity_kw: 0.0,
            events_today: 0,
            events_month: 0,
            performance_score: 0.0,
            revenue_today: 0.0,
            revenue_month: 0.0,
        };
    }
    let day = point.timestamp.day();
    let events_today = rng.random_range(0..=point.hour / 3 + 1);
    let events_month = events_today + rng.random_range(0..=(day - 1) * 3);
    let performance_score = rng.random_range(88.0..100.0);
    let capacity_mw = capacity_kw / 1000.0;
    let revenue_today =
        capacity_mw * price_per_mw_hour * (point.hour + 1) as f64 * performance_score / 100.0;
    let revenue_month = revenue_today
        + capacity_mw
            * price_per_mw_hour
            * 24.0
            * (day - 1) as f64
            * rng.random_range(0.9..1.1)
            * performance_score
            / 100.0;
    ServiceParticipation {
        enabled,
        capacity_kw,
        events_today,
        events_month,
        performance_score,
        revenue_today,
        revenue_month,
    }
}

pub fn ancillary_services(
    model: &BatteryModel,
    point: OperatingPoint,
    rng: &mut impl Rng,
) -> AncillaryServices {
    let p = model.power_kw;
    let duration_hours = if p > 0.0 { model.capacity_kwh / p } else { 0.0 };
    let frequency_regulation = participation(true, p * 0.30, 32.0, point, rng);
    let spinning_reserve = participation(true, p * 0.25, 11.0, point, rng);
    let non_spinning_reserve = participation(true, p * 0.20, 5.5, point, rng);
    let load_following = participation(duration_hours >= 2.0, p * 0.15, 8.0, point, rng);
    let voltage_support = participation(true, p * 0.10, 2.5, point, rng);
    let black_start = participation(model.capacity_kwh >= 2000.0, p * 0.50, 4.0, point, rng);

    let mut services = AncillaryServices {
        frequency_regulation,
        spinning_reserve,
        non_spinning_reserve,
        load_following,
        voltage_support,
        black_start,
        total_revenue_today: 0.0,
        total_revenue_month: 0.0,
    };
    let (today, month) = services
        .services()
        .iter()
        .fold((0.0, 0.0), |(t, m), (_, s)| (t + s.revenue_today, m + s.revenue_month));
    services.total_revenue_today = today;
    services.total_revenue_month = month;
    services
}

pub fn revenue(
    model: &BatteryModel,
    point: OperatingPoint,
    ancillary: &AncillaryServices,
    demand_response: &DemandResponseState,
    rng: &mut impl Rng,
) -> RevenueTracking {
    let day = point.timestamp.day() as f64;
    let month = point.timestamp.month() as f64;
    let spread_per_kwh = rng.random_range(0.04..0.12);
    let energy_arbitrage = model.capacity_kwh * rng.random_range(0.6..0.9) * spread_per_kwh;
    let demand_charge_savings = model.power_kw * 0.3 * 15.0 / 30.0;
    let ancillary_today = ancillary.total_revenue_today;
    let dr_today = (demand_response.revenue_month - demand_response.penalties_month).max(0.0)
        / day.max(1.0);
    let capacity_payments = model.power_kw * 5.0 / 30.0;

    let total_today =
        energy_arbitrage + demand_charge_savings + ancillary_today + dr_today + capacity_payments;
    let total_month = total_today * day * rng.random_range(0.9..1.1);
    let total_year_to_date = total_month + total_today * 30.0 * (month - 1.0);
    let revenue_per_kwh = if model.capacity_kwh > 0.0 {
        total_month / (model.capacity_kwh * day)
    } else {
        0.0
    };

    RevenueTracking {
        energy_arbitrage,
        demand_charge_savings,
        ancillary_services: ancillary_today,
        demand_response: dr_today,
        capacity_payments,
        total_today,
        total_month,
        total_year_to_date,
        revenue_per_kwh,
        projected_annual: total_today * 365.0,
    }
}
