//! Point-in-time electrical readings and BMS detail.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::{
    BatteryModel, CellVoltageStats, CoolingType, EnhancedMetrics, Telemetry, TemperatureBand,
    ThermalManagement,
};
use crate::power::{CHARGE_CUTOFF_PCT, DISCHARGE_DERATE_PCT, SOC_FLOOR_PCT, pack_voltage};

/// Point of common coupling line-to-line voltage.
const GRID_VOLTAGE_V: f64 = 480.0;
const GRID_FREQUENCY_HZ: f64 = 60.0;

/// Grid-side readings. Independent of the performance snapshot apart from
/// using the same power value for current.
pub fn telemetry(power_kw: f64, timestamp: DateTime<Utc>, rng: &mut impl Rng) -> Telemetry {
    let voltage_v = GRID_VOLTAGE_V * rng.random_range(0.98..1.02);
    let power_factor = rng.random_range(0.95..1.0);
    let current_a = power_kw.abs() * 1000.0 / (3f64.sqrt() * voltage_v * power_factor);
    Telemetry {
        timestamp,
        voltage_v,
        current_a,
        frequency_hz: GRID_FREQUENCY_HZ + rng.random_range(-0.05..0.05),
        power_factor,
        temperature_c: rng.random_range(20.0..35.0),
        humidity_pct: rng.random_range(30.0..60.0),
    }
}

/// Power the BMS would accept right now in each direction.
pub fn available_power(model: &BatteryModel, soc_pct: f64) -> (f64, f64) {
    let charge = if soc_pct >= CHARGE_CUTOFF_PCT {
        0.0
    } else {
        model.power_kw
    };
    let discharge = if soc_pct <= SOC_FLOOR_PCT {
        0.0
    } else if soc_pct <= DISCHARGE_DERATE_PCT {
        model.power_kw * 0.5
    } else {
        model.power_kw
    };
    (charge, discharge)
}

pub fn enhanced_metrics(
    model: &BatteryModel,
    power_kw: f64,
    soc_pct: f64,
    rng: &mut impl Rng,
) -> EnhancedMetrics {
    let load = if model.power_kw > 0.0 {
        (power_kw.abs() / model.power_kw).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (v_empty, v_full) = model.chemistry.cell_voltage_window();
    let avg_v = v_empty + (v_full - v_empty) * soc_pct.clamp(0.0, 100.0) / 100.0;
    let spread_mv = rng.random_range(8.0..35.0) * (1.0 + load);
    let cell_voltage = CellVoltageStats {
        min_v: avg_v - spread_mv / 2000.0,
        max_v: avg_v + spread_mv / 2000.0,
        avg_v,
        spread_mv,
    };

    let cell_avg_c = 25.0 + 10.0 * load + rng.random_range(-1.5..1.5);
    let cell_temperature = TemperatureBand {
        avg_c: cell_avg_c,
        min_c: cell_avg_c - rng.random_range(1.0..3.0),
        max_c: cell_avg_c + rng.random_range(2.0..5.0),
    };

    let dc_bus_voltage_v = pack_voltage(model, soc_pct);
    let dc_bus_current_a = if dc_bus_voltage_v > 0.0 {
        power_kw * 1000.0 / dc_bus_voltage_v
    } else {
        0.0
    };
    let strings = model.strings.max(1);
    let per_string = dc_bus_current_a / strings as f64;
    let string_currents_a = (0..strings)
        .map(|_| per_string * rng.random_range(0.97..1.03))
        .collect();

    let (available_charge_kw, available_discharge_kw) = available_power(model, soc_pct);

    let inlet = rng.random_range(18.0..24.0);
    let thermal = ThermalManagement {
        cooling: model.cooling,
        coolant_inlet_c: inlet,
        coolant_outlet_c: inlet + 2.0 + 6.0 * load,
        hvac_load_kw: model.power_kw * (0.005 + 0.015 * load),
        fan_speed_pct: match model.cooling {
            CoolingType::Air => (30.0 + 60.0 * load).min(100.0),
            CoolingType::Liquid => (15.0 + 40.0 * load).min(100.0),
        },
    };

    EnhancedMetrics {
        cell_voltage,
        cell_temperature,
        dc_bus_voltage_v,
        dc_bus_current_a,
        insulation_resistance_kohm: rng.random_range(800.0..2500.0),
        available_charge_kw,
        available_discharge_kw,
        auxiliary_load_kw: model.power_kw * rng.random_range(0.002..0.006),
        string_currents_a,
        thermal,
    }
}
