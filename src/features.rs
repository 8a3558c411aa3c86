use serde::{Deserialize, Serialize};

use crate::part_of_day::{classify, PartOfDay};

/// Column names, in the order the model was fit against.
pub const FEATURE_SCHEMA: [&str; 12] = [
    "Delivery_person_Age",
    "Delivery_person_Ratings",
    "Vehicle_condition",
    "multiple_deliveries",
    "distance_km",
    "Hour_Placed",
    "Weatherconditions",
    "Road_traffic_density",
    "Type_of_vehicle",
    "Festival",
    "City",
    "Part_Of_Day",
];

/// Columns that carry a category label rather than a number.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "Weatherconditions",
    "Road_traffic_density",
    "Type_of_vehicle",
    "Festival",
    "City",
    "Part_Of_Day",
];

/// Numeric columns collected as whole numbers.
pub const INTEGER_COLUMNS: [&str; 4] = [
    "Delivery_person_Age",
    "Vehicle_condition",
    "multiple_deliveries",
    "Hour_Placed",
];

pub fn is_integer(column: &str) -> bool {
    INTEGER_COLUMNS.contains(&column)
}

pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

/// Trip attributes as collected from a user, before any derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub courier_age: i64,
    pub courier_rating: f64,
    pub vehicle_condition: i64,
    pub multiple_deliveries: i64,
    pub distance_km: f64,
    pub hour_placed: i64,
    pub weather_condition: String,
    pub road_traffic_density: String,
    pub vehicle_type: String,
    pub festival: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Fixed-schema record handed to a predictor. Only `assemble` builds one, so
/// `part_of_day` always agrees with `hour_placed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripFeatures {
    #[serde(rename = "Delivery_person_Age")]
    courier_age: i64,
    #[serde(rename = "Delivery_person_Ratings")]
    courier_rating: f64,
    #[serde(rename = "Vehicle_condition")]
    vehicle_condition: i64,
    #[serde(rename = "multiple_deliveries")]
    multiple_deliveries: i64,
    #[serde(rename = "distance_km")]
    distance_km: f64,
    #[serde(rename = "Hour_Placed")]
    hour_placed: i64,
    #[serde(rename = "Weatherconditions")]
    weather_condition: String,
    #[serde(rename = "Road_traffic_density")]
    road_traffic_density: String,
    #[serde(rename = "Type_of_vehicle")]
    vehicle_type: String,
    #[serde(rename = "Festival")]
    festival: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Part_Of_Day")]
    part_of_day: PartOfDay,
}

/// Derives the part of day and builds the record. Trusts its caller: no range
/// or category checks happen here.
pub fn assemble(raw: RawInputs) -> TripFeatures {
    TripFeatures {
        part_of_day: classify(raw.hour_placed),
        courier_age: raw.courier_age,
        courier_rating: raw.courier_rating,
        vehicle_condition: raw.vehicle_condition,
        multiple_deliveries: raw.multiple_deliveries,
        distance_km: raw.distance_km,
        hour_placed: raw.hour_placed,
        weather_condition: raw.weather_condition,
        road_traffic_density: raw.road_traffic_density,
        vehicle_type: raw.vehicle_type,
        festival: raw.festival,
        city: raw.city,
    }
}

impl TripFeatures {
    pub fn courier_age(&self) -> i64 {
        self.courier_age
    }

    pub fn courier_rating(&self) -> f64 {
        self.courier_rating
    }

    pub fn vehicle_condition(&self) -> i64 {
        self.vehicle_condition
    }

    pub fn multiple_deliveries(&self) -> i64 {
        self.multiple_deliveries
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn hour_placed(&self) -> i64 {
        self.hour_placed
    }

    pub fn weather_condition(&self) -> &str {
        &self.weather_condition
    }

    pub fn road_traffic_density(&self) -> &str {
        &self.road_traffic_density
    }

    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    pub fn festival(&self) -> &str {
        &self.festival
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn part_of_day(&self) -> PartOfDay {
        self.part_of_day
    }

    /// `(column, value)` pairs in `FEATURE_SCHEMA` order.
    pub fn columns(&self) -> Vec<(&'static str, FeatureValue)> {
        let values = [
            FeatureValue::Int(self.courier_age),
            FeatureValue::Float(self.courier_rating),
            FeatureValue::Int(self.vehicle_condition),
            FeatureValue::Int(self.multiple_deliveries),
            FeatureValue::Float(self.distance_km),
            FeatureValue::Int(self.hour_placed),
            FeatureValue::Text(self.weather_condition.clone()),
            FeatureValue::Text(self.road_traffic_density.clone()),
            FeatureValue::Text(self.vehicle_type.clone()),
            FeatureValue::Text(self.festival.clone()),
            FeatureValue::Text(self.city.clone()),
            FeatureValue::Text(self.part_of_day.as_str().to_string()),
        ];
        FEATURE_SCHEMA.into_iter().zip(values).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_inputs() -> RawInputs {
        RawInputs {
            courier_age: 30,
            courier_rating: 4.5,
            vehicle_condition: 1,
            multiple_deliveries: 1,
            distance_km: 5.0,
            hour_placed: 14,
            weather_condition: "Sunny".to_string(),
            road_traffic_density: "Low".to_string(),
            vehicle_type: "motorcycle".to_string(),
            festival: "No".to_string(),
            city: "Urban".to_string(),
        }
    }

    #[test]
    fn assemble_derives_part_of_day() {
        let features = assemble(sample_inputs());
        assert_eq!(features.part_of_day(), PartOfDay::Afternoon);
        assert_eq!(features.hour_placed(), 14);
        assert_eq!(features.city(), "Urban");
    }

    #[test]
    fn assemble_is_idempotent() {
        assert_eq!(assemble(sample_inputs()), assemble(sample_inputs()));
    }

    #[test]
    fn part_of_day_depends_only_on_hour() {
        for hour in 0..24 {
            let mut a = sample_inputs();
            a.hour_placed = hour;
            let mut b = RawInputs {
                courier_age: 45,
                courier_rating: 2.0,
                vehicle_condition: 3,
                multiple_deliveries: 0,
                distance_km: 19.9,
                hour_placed: hour,
                weather_condition: "Fog".to_string(),
                road_traffic_density: "Jam".to_string(),
                vehicle_type: "scooter".to_string(),
                festival: "Yes".to_string(),
                city: "Metropolitian".to_string(),
            };
            let fa = assemble(a);
            assert_eq!(fa.part_of_day(), classify(hour));
            b.hour_placed = hour;
            assert_eq!(assemble(b).part_of_day(), fa.part_of_day());
        }
    }

    #[test]
    fn columns_follow_schema_order() {
        let features = assemble(sample_inputs());
        let names: Vec<&str> = features.columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, FEATURE_SCHEMA);
        let columns = features.columns();
        assert_eq!(columns[0].1, FeatureValue::Int(30));
        assert_eq!(columns[1].1, FeatureValue::Float(4.5));
        assert_eq!(columns[11].1, FeatureValue::Text("Afternoon".to_string()));
    }

    #[test]
    fn serialized_keys_match_schema() {
        let value = serde_json::to_value(assemble(sample_inputs())).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected: Vec<&str> = FEATURE_SCHEMA.to_vec();
        expected.sort_unstable();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, expected);
        assert_eq!(value["Part_Of_Day"], "Afternoon");
        assert_eq!(value["Delivery_person_Ratings"], 4.5);
    }
}
