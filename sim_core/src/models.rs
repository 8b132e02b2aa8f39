//! Plain data records for a simulated battery fleet.
//! Everything here is `Serialize` so snapshots can be handed straight to the
//! rendering layer as JSON.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chemistry {
    Lfp,
    Nmc,
    Nca,
}

impl Chemistry {
    /// Cell voltage window (empty, full) in volts.
    pub fn cell_voltage_window(self) -> (f64, f64) {
        match self {
            Chemistry::Lfp => (2.9, 3.45),
            Chemistry::Nmc => (3.3, 4.15),
            Chemistry::Nca => (3.2, 4.2),
        }
    }

    /// Typical round-trip efficiency band in percent.
    pub fn efficiency_band(self) -> (f64, f64) {
        match self {
            Chemistry::Lfp => (88.0, 93.0),
            Chemistry::Nmc => (86.0, 91.0),
            Chemistry::Nca => (85.0, 90.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingType {
    Air,
    Liquid,
}

/// Nameplate specification fixed by a model designator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatteryModel {
    pub designator: String,
    pub manufacturer: String,
    pub capacity_kwh: f64,
    pub power_kw: f64,
    pub chemistry: Chemistry,
    pub nominal_voltage_v: f64,
    pub modules: u32,
    pub strings: u32,
    pub cells_per_module: u32,
    pub cooling: CoolingType,
    pub warranty_years: u32,
}

impl BatteryModel {
    /// Ad-hoc LFP model with the given nameplate; physical layout is generic.
    pub fn custom(designator: impl Into<String>, capacity_kwh: f64, power_kw: f64) -> Self {
        Self {
            designator: designator.into(),
            manufacturer: "Generic".to_string(),
            capacity_kwh,
            power_kw,
            chemistry: Chemistry::Lfp,
            nominal_voltage_v: 1000.0,
            modules: 16,
            strings: 4,
            cells_per_module: 312,
            cooling: CoolingType::Liquid,
            warranty_years: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConfiguration {
    pub modules: u32,
    pub strings: u32,
    pub cells_per_module: u32,
    pub cooling: CoolingType,
    pub install_date: NaiveDate,
    pub warranty_expiry: NaiveDate,
}

/// Identity and nameplate data. Never mutated once the registry is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    /// Stable UUID derived from `id`, handy for systems keyed by UUID.
    pub uid: Uuid,
    pub name: String,
    pub location: Location,
    pub model: BatteryModel,
    pub configuration: PhysicalConfiguration,
}

impl Asset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Location,
        model: BatteryModel,
        install_date: NaiveDate,
    ) -> Self {
        let id = id.into();
        let warranty_expiry = install_date
            .with_year(install_date.year() + model.warranty_years as i32)
            .unwrap_or(install_date);
        let configuration = PhysicalConfiguration {
            modules: model.modules,
            strings: model.strings,
            cells_per_module: model.cells_per_module,
            cooling: model.cooling,
            install_date,
            warranty_expiry,
        };
        Self {
            uid: Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()),
            id,
            name: name.into(),
            location,
            model,
            configuration,
        }
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.model.capacity_kwh
    }

    pub fn power_kw(&self) -> f64 {
        self.model.power_kw
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Idle,
    Charging,
    Discharging,
    Maintenance,
}

/// Instantaneous operating state. Positive power = discharging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub power_kw: f64,
    pub soc_pct: f64,
    pub energy_kwh: f64,
    pub voltage_v: f64,
    pub current_a: f64,
    pub efficiency_pct: f64,
    pub cycle_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureBand {
    pub avg_c: f64,
    pub min_c: f64,
    pub max_c: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub soh_pct: f64,
    pub cell_balance_pct: f64,
    pub temperature: TemperatureBand,
    pub internal_impedance_mohm: f64,
    pub usable_capacity_kwh: f64,
    pub degradation_rate_pct_per_year: f64,
}

/// Grid-side electrical readings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub timestamp: DateTime<Utc>,
    pub voltage_v: f64,
    pub current_a: f64,
    pub frequency_hz: f64,
    pub power_factor: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Temperature,
    Voltage,
    Current,
    StateOfCharge,
    Maintenance,
    Communication,
    Safety,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellVoltageStats {
    pub min_v: f64,
    pub max_v: f64,
    pub avg_v: f64,
    pub spread_mv: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThermalManagement {
    pub cooling: CoolingType,
    pub coolant_inlet_c: f64,
    pub coolant_outlet_c: f64,
    pub hvac_load_kw: f64,
    pub fan_speed_pct: f64,
}

/// BMS-level detail beyond the headline performance numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMetrics {
    pub cell_voltage: CellVoltageStats,
    pub cell_temperature: TemperatureBand,
    pub dc_bus_voltage_v: f64,
    pub dc_bus_current_a: f64,
    pub insulation_resistance_kohm: f64,
    pub available_charge_kw: f64,
    pub available_discharge_kw: f64,
    pub auxiliary_load_kw: f64,
    pub string_currents_a: Vec<f64>,
    pub thermal: ThermalManagement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrProgramKind {
    CapacityBidding,
    EmergencyLoadReduction,
    PeakTimeRebate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrProgramStatus {
    Enrolled,
    Active,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrProgram {
    pub id: String,
    pub name: String,
    pub kind: DrProgramKind,
    pub status: DrProgramStatus,
    pub committed_kw: f64,
    pub payment_per_kw_month: f64,
    pub penalty_per_kwh: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrEventStatus {
    Scheduled,
    Active,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrEvent {
    pub id: String,
    pub program_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub requested_kw: f64,
    pub delivered_kw: f64,
    pub performance_pct: f64,
    pub status: DrEventStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandResponseState {
    pub programs: Vec<DrProgram>,
    pub events: Vec<DrEvent>,
    pub available_kw: f64,
    pub baseline_kw: f64,
    pub curtailment_kw: f64,
    pub performance_score: f64,
    pub revenue_month: f64,
    pub penalties_month: f64,
}

/// Participation state of one ancillary service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceParticipation {
    pub enabled: bool,
    pub capacity_kw: f64,
    pub events_today: u32,
    pub events_month: u32,
    pub performance_score: f64,
    pub revenue_today: f64,
    pub revenue_month: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AncillaryServices {
    pub frequency_regulation: ServiceParticipation,
    pub spinning_reserve: ServiceParticipation,
    pub non_spinning_reserve: ServiceParticipation,
    pub load_following: ServiceParticipation,
    pub voltage_support: ServiceParticipation,
    pub black_start: ServiceParticipation,
    pub total_revenue_today: f64,
    pub total_revenue_month: f64,
}

impl AncillaryServices {
    /// All six services in a fixed order, with their wire names.
    pub fn services(&self) -> [(&'static str, &ServiceParticipation); 6] {
        [
            ("frequency_regulation", &self.frequency_regulation),
            ("spinning_reserve", &self.spinning_reserve),
            ("non_spinning_reserve", &self.non_spinning_reserve),
            ("load_following", &self.load_following),
            ("voltage_support", &self.voltage_support),
            ("black_start", &self.black_start),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueTracking {
    pub energy_arbitrage: f64,
    pub demand_charge_savings: f64,
    pub ancillary_services: f64,
    pub demand_response: f64,
    pub capacity_payments: f64,
    pub total_today: f64,
    pub total_month: f64,
    pub total_year_to_date: f64,
    pub revenue_per_kwh: f64,
    pub projected_annual: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Normal,
    Caution,
    Alarm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasDetection {
    pub hydrogen_ppm: f64,
    pub carbon_monoxide_ppm: f64,
    pub voc_ppm: f64,
    pub alarm: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FireSuppression {
    pub armed: bool,
    pub agent_pressure_bar: f64,
    pub last_test: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafetyStatus {
    pub overall: SafetyLevel,
    pub thermal_runaway_risk: RiskLevel,
    pub gas_detection: GasDetection,
    pub fire_suppression: FireSuppression,
    pub smoke_detected: bool,
    pub emergency_stop_engaged: bool,
    pub door_interlocks_closed: bool,
    pub ventilation_active: bool,
    pub ground_fault_detected: bool,
    pub last_inspection: NaiveDate,
}

/// Everything the dashboard renders for one asset. Every nested group is
/// always populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset: Asset,
    pub status: AssetStatus,
    pub performance: PerformanceSnapshot,
    pub health: HealthSnapshot,
    pub telemetry: Telemetry,
    pub alerts: Vec<Alert>,
    pub enhanced: EnhancedMetrics,
    pub demand_response: DemandResponseState,
    pub ancillary_services: AncillaryServices,
    pub revenue: RevenueTracking,
    pub safety: SafetyStatus,
    pub last_updated: DateTime<Utc>,
}
