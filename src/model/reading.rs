//! Sensor readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current sensor reading. Value fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the reading was taken
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl Reading {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            values: serde_json::Map::new(),
        }
    }

    /// Add a value field
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn from_document(doc: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Reading::deserialize(doc)
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_fields_survive() {
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let doc = Reading::new(time)
            .with_value("celsius", 4.5)
            .with_value("sensor", "fridge")
            .to_document()
            .unwrap();

        let reading = Reading::from_document(&doc).unwrap();
        assert_eq!(reading.time, time);
        assert_eq!(reading.values["celsius"], 4.5);
        assert_eq!(reading.values["sensor"], "fridge");
    }
}
