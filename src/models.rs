//! Domain models for the irrigation usage tracker.
//!
//! Closed enumerations (`Role`, `WaterSource`, `CropType`, ...) round-trip
//! through their lowercase string form both on the wire (serde) and in the
//! database (TEXT columns), so a single `as_str`/`FromStr` pair is the only
//! source of truth for each set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ---

/// Raised when a stored string no longer matches its closed set.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Account role. Farmers own usage records; admins see the system view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// Where the irrigation water came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterSource {
    Borewell,
    Canal,
    Rain,
    Well,
    Other,
}

impl WaterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterSource::Borewell => "borewell",
            WaterSource::Canal => "canal",
            WaterSource::Rain => "rain",
            WaterSource::Well => "well",
            WaterSource::Other => "other",
        }
    }
}

impl std::str::FromStr for WaterSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borewell" => Ok(WaterSource::Borewell),
            "canal" => Ok(WaterSource::Canal),
            "rain" => Ok(WaterSource::Rain),
            "well" => Ok(WaterSource::Well),
            "other" => Ok(WaterSource::Other),
            other => Err(UnknownVariant::new("water source", other)),
        }
    }
}

/// The ten crop categories a record may be logged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Rice,
    Wheat,
    Sugarcane,
    Cotton,
    Maize,
    Vegetables,
    Fruits,
    Pulses,
    Oilseeds,
    Other,
}

impl CropType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Rice => "rice",
            CropType::Wheat => "wheat",
            CropType::Sugarcane => "sugarcane",
            CropType::Cotton => "cotton",
            CropType::Maize => "maize",
            CropType::Vegetables => "vegetables",
            CropType::Fruits => "fruits",
            CropType::Pulses => "pulses",
            CropType::Oilseeds => "oilseeds",
            CropType::Other => "other",
        }
    }
}

impl std::str::FromStr for CropType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rice" => Ok(CropType::Rice),
            "wheat" => Ok(CropType::Wheat),
            "sugarcane" => Ok(CropType::Sugarcane),
            "cotton" => Ok(CropType::Cotton),
            "maize" => Ok(CropType::Maize),
            "vegetables" => Ok(CropType::Vegetables),
            "fruits" => Ok(CropType::Fruits),
            "pulses" => Ok(CropType::Pulses),
            "oilseeds" => Ok(CropType::Oilseeds),
            "other" => Ok(CropType::Other),
            other => Err(UnknownVariant::new("crop type", other)),
        }
    }
}

/// Weather at the time of irrigation, optional on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    PartlyCloudy,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::PartlyCloudy => "partly_cloudy",
        }
    }
}

impl std::str::FromStr for WeatherCondition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sunny" => Ok(WeatherCondition::Sunny),
            "cloudy" => Ok(WeatherCondition::Cloudy),
            "rainy" => Ok(WeatherCondition::Rainy),
            "partly_cloudy" => Ok(WeatherCondition::PartlyCloudy),
            other => Err(UnknownVariant::new("weather condition", other)),
        }
    }
}

/// Analytics period selector. Narrows the record set fetched for a report;
/// the report itself always computes all three internal buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    All,
}

// ---

/// Registered account, farmer or admin. The password hash never leaves the
/// auth queries and is deliberately not part of this struct.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub role: Role,
    pub state: Option<String>,
    pub district: Option<String>,
    pub farm_size: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One logged irrigation event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterUsage {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub source: WaterSource,
    /// Liters.
    pub usage_amount: f64,
    pub date: DateTime<Utc>,
    pub crop_type: CropType,
    /// Acres.
    pub area_irrigated: f64,
    pub notes: Option<String>,
    pub weather_condition: Option<WeatherCondition>,
    /// Liters per acre, fixed at record creation.
    pub efficiency: f64,
    pub created_at: DateTime<Utc>,
}

impl WaterUsage {
    /// Liters per acre, rounded to two decimal places. Computed once when a
    /// record is logged and stored with it; never recomputed afterwards.
    pub fn efficiency_for(usage_amount: f64, area_irrigated: f64) -> f64 {
        // ---
        (usage_amount / area_irrigated * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_efficiency_rounds_to_two_decimals() {
        // ---
        assert_eq!(WaterUsage::efficiency_for(1000.0, 3.0), 333.33);
        assert_eq!(WaterUsage::efficiency_for(6000.0, 2.0), 3000.0);
        assert_eq!(WaterUsage::efficiency_for(100.0, 0.3), 333.33);
    }

    #[test]
    fn test_enum_string_round_trips() {
        // ---
        for source in [
            WaterSource::Borewell,
            WaterSource::Canal,
            WaterSource::Rain,
            WaterSource::Well,
            WaterSource::Other,
        ] {
            assert_eq!(WaterSource::from_str(source.as_str()).unwrap(), source);
        }

        for crop in [
            CropType::Rice,
            CropType::Wheat,
            CropType::Sugarcane,
            CropType::Cotton,
            CropType::Maize,
            CropType::Vegetables,
            CropType::Fruits,
            CropType::Pulses,
            CropType::Oilseeds,
            CropType::Other,
        ] {
            assert_eq!(CropType::from_str(crop.as_str()).unwrap(), crop);
        }

        assert_eq!(
            WeatherCondition::from_str("partly_cloudy").unwrap(),
            WeatherCondition::PartlyCloudy
        );
        assert!(WaterSource::from_str("ocean").is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        // ---
        assert_eq!(
            serde_json::to_string(&WaterSource::Borewell).unwrap(),
            "\"borewell\""
        );
        assert_eq!(
            serde_json::to_string(&WeatherCondition::PartlyCloudy).unwrap(),
            "\"partly_cloudy\""
        );
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");

        let period: Period = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(period, Period::Monthly);
    }
}
