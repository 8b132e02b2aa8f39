//! Built-in battery model catalog. Asset configs reference models by designator.

use crate::models::{BatteryModel, Chemistry, CoolingType};

struct ModelSpec {
    designator: &'static str,
    manufacturer: &'static str,
    capacity_kwh: f64,
    power_kw: f64,
    chemistry: Chemistry,
    nominal_voltage_v: f64,
    modules: u32,
    strings: u32,
    cells_per_module: u32,
    cooling: CoolingType,
    warranty_years: u32,
}

const MODELS: &[ModelSpec] = &[
    ModelSpec {
        designator: "Megapack 2",
        manufacturer: "Tesla",
        capacity_kwh: 3916.0,
        power_kw: 1927.0,
        chemistry: Chemistry::Lfp,
        nominal_voltage_v: 1150.0,
        modules: 24,
        strings: 4,
        cells_per_module: 432,
        cooling: CoolingType::Liquid,
        warranty_years: 15,
    },
    ModelSpec {
        designator: "Megapack 2 XL",
        manufacturer: "Tesla",
        capacity_kwh: 3916.0,
        power_kw: 979.0,
        chemistry: Chemistry::Lfp,
        nominal_voltage_v: 1150.0,
        modules: 24,
        strings: 4,
        cells_per_module: 432,
        cooling: CoolingType::Liquid,
        warranty_years: 15,
    },
    ModelSpec {
        designator: "Gridstack Pro 2000",
        manufacturer: "Fluence",
        capacity_kwh: 4000.0,
        power_kw: 2000.0,
        chemistry: Chemistry::Nmc,
        nominal_voltage_v: 1300.0,
        modules: 32,
        strings: 8,
        cells_per_module: 320,
        cooling: CoolingType::Liquid,
        warranty_years: 10,
    },
    ModelSpec {
        designator: "MC Cube-T",
        manufacturer: "BYD",
        capacity_kwh: 2752.0,
        power_kw: 1376.0,
        chemistry: Chemistry::Lfp,
        nominal_voltage_v: 1200.0,
        modules: 20,
        strings: 5,
        cells_per_module: 416,
        cooling: CoolingType::Liquid,
        warranty_years: 12,
    },
    ModelSpec {
        designator: "EnerOne 372",
        manufacturer: "CATL",
        capacity_kwh: 372.0,
        power_kw: 186.0,
        chemistry: Chemistry::Lfp,
        nominal_voltage_v: 1331.0,
        modules: 8,
        strings: 1,
        cells_per_module: 52,
        cooling: CoolingType::Liquid,
        warranty_years: 10,
    },
    ModelSpec {
        designator: "PowerBlock 1000",
        manufacturer: "Samsung SDI",
        capacity_kwh: 1000.0,
        power_kw: 500.0,
        chemistry: Chemistry::Nca,
        nominal_voltage_v: 950.0,
        modules: 16,
        strings: 4,
        cells_per_module: 288,
        cooling: CoolingType::Air,
        warranty_years: 10,
    },
];

impl ModelSpec {
    fn to_model(&self) -> BatteryModel {
        BatteryModel {
            designator: self.designator.to_string(),
            manufacturer: self.manufacturer.to_string(),
            capacity_kwh: self.capacity_kwh,
            power_kw: self.power_kw,
            chemistry: self.chemistry,
            nominal_voltage_v: self.nominal_voltage_v,
            modules: self.modules,
            strings: self.strings,
            cells_per_module: self.cells_per_module,
            cooling: self.cooling,
            warranty_years: self.warranty_years,
        }
    }
}

pub fn catalog() -> Vec<BatteryModel> {
    MODELS.iter().map(ModelSpec::to_model).collect()
}

/// Case-insensitive lookup by designator.
pub fn find_model(designator: &str) -> Option<BatteryModel> {
    MODELS
        .iter()
        .find(|m| m.designator.eq_ignore_ascii_case(designator.trim()))
        .map(ModelSpec::to_model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let model = find_model("  megapack 2 xl ").expect("model should resolve");
        assert_eq!(model.designator, "Megapack 2 XL");
        assert_eq!(model.power_kw, 979.0);
    }

    #[test]
    fn unknown_designator_is_none() {
        assert!(find_model("Flux Capacitor").is_none());
    }

    #[test]
    fn every_model_has_positive_nameplate_and_unique_name() {
        let models = catalog();
        for m in &models {
            assert!(m.capacity_kwh > 0.0 && m.power_kw > 0.0, "{}", m.designator);
            assert!(m.strings > 0 && m.modules >= m.strings, "{}", m.designator);
        }
        let mut names: Vec<_> = models.iter().map(|m| m.designator.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), models.len());
    }
}
