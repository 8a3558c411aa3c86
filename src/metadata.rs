use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::error::{InputError, MetadataError};
use crate::features::{is_integer, RawInputs};

/// Range and category tables used to constrain and default form inputs.
///
/// Keys are schema column names (`Delivery_person_Age`, `City`, ...). The
/// feature assembler never reads these; only the input layers do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMetadata {
    ranges: BTreeMap<String, (f64, f64)>,
    categories: BTreeMap<String, Vec<String>>,
}

impl FeatureMetadata {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&txt)
    }

    pub fn from_json(txt: &str) -> Result<Self, MetadataError> {
        let meta: FeatureMetadata = serde_json::from_str(txt)?;
        meta.check()?;
        Ok(meta)
    }

    pub fn new(
        ranges: BTreeMap<String, (f64, f64)>,
        categories: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, MetadataError> {
        let meta = Self { ranges, categories };
        meta.check()?;
        Ok(meta)
    }

    fn check(&self) -> Result<(), MetadataError> {
        for (field, &(min, max)) in &self.ranges {
            if !(min <= max) {
                return Err(MetadataError::InvalidRange {
                    field: field.clone(),
                    min,
                    max,
                });
            }
        }
        if let Some((field, _)) = self.categories.iter().find(|(_, v)| v.is_empty()) {
            return Err(MetadataError::EmptyCategory(field.clone()));
        }
        Ok(())
    }

    pub fn ranges(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.ranges
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }

    /// Bounds for a numeric column; integer columns are truncated toward zero.
    pub fn range(&self, field: &str) -> Result<(f64, f64), InputError> {
        let &(min, max) = self
            .ranges
            .get(field)
            .ok_or_else(|| InputError::MissingField(field.to_string()))?;
        if is_integer(field) {
            Ok((min.trunc(), max.trunc()))
        } else {
            Ok((min, max))
        }
    }

    pub fn choices(&self, field: &str) -> Result<&[String], InputError> {
        self.categories
            .get(field)
            .map(Vec::as_slice)
            .ok_or_else(|| InputError::MissingField(field.to_string()))
    }

    /// Midpoint of the raw range, truncated for integer columns.
    pub fn default_value(&self, field: &str) -> Result<f64, InputError> {
        let &(min, max) = self
            .ranges
            .get(field)
            .ok_or_else(|| InputError::MissingField(field.to_string()))?;
        let mid = (min + max) / 2.0;
        Ok(if is_integer(field) { mid.trunc() } else { mid })
    }

    pub fn default_choice(&self, field: &str) -> Result<&str, InputError> {
        self.choices(field)?
            .first()
            .map(String::as_str)
            .ok_or_else(|| InputError::MissingField(field.to_string()))
    }

    pub fn step(&self, field: &str) -> f64 {
        if is_integer(field) {
            1.0
        } else {
            0.1
        }
    }

    /// Moves a value onto the form's step grid, which starts at the range minimum.
    pub fn snap(&self, field: &str, value: f64) -> Result<f64, InputError> {
        let (min, max) = self.range(field)?;
        let step = self.step(field);
        let snapped = min + ((value - min) / step).round() * step;
        // strip the binary noise left by the step multiply
        Ok(((snapped * 1e9).round() / 1e9).clamp(min, max))
    }

    pub fn check_number(&self, field: &str, value: f64) -> Result<(), InputError> {
        let (min, max) = self.range(field)?;
        if value < min || value > max || value.is_nan() {
            return Err(InputError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    pub fn check_category(&self, field: &str, value: &str) -> Result<(), InputError> {
        let allowed = self.choices(field)?;
        if allowed.iter().any(|c| c == value) {
            Ok(())
        } else {
            Err(InputError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
                allowed: allowed.join(", "),
            })
        }
    }

    /// Applies every range and category constraint to a set of inputs.
    pub fn validate(&self, raw: &RawInputs) -> Result<(), InputError> {
        self.check_number("Delivery_person_Age", raw.courier_age as f64)?;
        self.check_number("Delivery_person_Ratings", raw.courier_rating)?;
        self.check_number("Vehicle_condition", raw.vehicle_condition as f64)?;
        self.check_number("multiple_deliveries", raw.multiple_deliveries as f64)?;
        self.check_number("distance_km", raw.distance_km)?;
        self.check_number("Hour_Placed", raw.hour_placed as f64)?;
        self.check_category("Weatherconditions", &raw.weather_condition)?;
        self.check_category("Road_traffic_density", &raw.road_traffic_density)?;
        self.check_category("Type_of_vehicle", &raw.vehicle_type)?;
        self.check_category("Festival", &raw.festival)?;
        self.check_category("City", &raw.city)?;
        Ok(())
    }

    /// The inputs a freshly opened form starts with.
    pub fn defaults(&self) -> Result<RawInputs, InputError> {
        Ok(RawInputs {
            courier_age: self.default_value("Delivery_person_Age")? as i64,
            courier_rating: self.default_value("Delivery_person_Ratings")?,
            vehicle_condition: self.default_value("Vehicle_condition")? as i64,
            multiple_deliveries: self.default_value("multiple_deliveries")? as i64,
            distance_km: self.default_value("distance_km")?,
            hour_placed: self.default_value("Hour_Placed")? as i64,
            weather_condition: self.default_choice("Weatherconditions")?.to_string(),
            road_traffic_density: self.default_choice("Road_traffic_density")?.to_string(),
            vehicle_type: self.default_choice("Type_of_vehicle")?.to_string(),
            festival: self.default_choice("Festival")?.to_string(),
            city: self.default_choice("City")?.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn sample_metadata() -> FeatureMetadata {
        FeatureMetadata::from_json(include_str!("../assets/metadata.json")).unwrap()
    }

    #[test]
    fn defaults_use_midpoints_and_first_choice() {
        let meta = sample_metadata();
        let raw = meta.defaults().unwrap();
        // (15 + 50) / 2 = 32.5, truncated
        assert_eq!(raw.courier_age, 32);
        assert!((raw.courier_rating - 3.5).abs() < 1e-9);
        assert_eq!(raw.hour_placed, 11);
        assert_eq!(raw.weather_condition, "Sunny");
        assert_eq!(raw.city, "Urban");
        assert!(meta.validate(&raw).is_ok());
    }

    #[test]
    fn steps_follow_column_kind() {
        let meta = sample_metadata();
        assert_eq!(meta.step("Hour_Placed"), 1.0);
        assert_eq!(meta.step("distance_km"), 0.1);
    }

    #[test]
    fn snap_moves_values_onto_the_step_grid() {
        let meta = sample_metadata();
        assert_eq!(meta.snap("Delivery_person_Ratings", 4.537).unwrap(), 4.5);
        assert_eq!(meta.snap("Delivery_person_Ratings", 4.5).unwrap(), 4.5);
        // the distance grid starts at 1.47
        assert_eq!(meta.snap("distance_km", 5.0).unwrap(), 4.97);
        assert_eq!(meta.snap("distance_km", 20.96).unwrap(), 20.97);
        assert_eq!(meta.snap("Hour_Placed", 14.0).unwrap(), 14.0);
    }

    #[test]
    fn integer_ranges_truncate() {
        let meta = sample_metadata();
        assert_eq!(meta.range("distance_km").unwrap(), (1.47, 20.97));
        let mut ranges = BTreeMap::new();
        ranges.insert("Delivery_person_Age".to_string(), (15.9, 38.7));
        let meta = FeatureMetadata::new(ranges, BTreeMap::new()).unwrap();
        assert_eq!(meta.range("Delivery_person_Age").unwrap(), (15.0, 38.0));
    }

    #[test]
    fn validate_rejects_out_of_range_and_unknown_category() {
        let meta = sample_metadata();
        let mut raw = meta.defaults().unwrap();
        raw.hour_placed = 24;
        assert!(matches!(
            meta.validate(&raw),
            Err(InputError::OutOfRange { ref field, .. }) if field == "Hour_Placed"
        ));

        let mut raw = meta.defaults().unwrap();
        raw.city = "Atlantis".to_string();
        assert!(matches!(
            meta.validate(&raw),
            Err(InputError::UnknownCategory { ref field, .. }) if field == "City"
        ));
    }

    #[test]
    fn missing_field_is_reported() {
        let meta = FeatureMetadata::new(BTreeMap::new(), BTreeMap::new()).unwrap();
        assert_eq!(
            meta.choices("City"),
            Err(InputError::MissingField("City".to_string()))
        );
        assert!(meta.defaults().is_err());
    }

    #[test]
    fn rejects_inverted_range_and_empty_category() {
        let err = FeatureMetadata::from_json(
            r#"{"ranges": {"distance_km": [5.0, 1.0]}, "categories": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidRange { .. }));

        let err =
            FeatureMetadata::from_json(r#"{"ranges": {}, "categories": {"City": []}}"#).unwrap_err();
        assert!(matches!(err, MetadataError::EmptyCategory(ref f) if f == "City"));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(include_bytes!("../assets/metadata.json"))
            .unwrap();
        let meta = FeatureMetadata::load(file.path()).unwrap();
        assert_eq!(meta, sample_metadata());

        let err = FeatureMetadata::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }
}
