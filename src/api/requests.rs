//! API request structures

use serde::{Deserialize, Serialize};

use crate::utils::format::parse_duration_input;

/// A minutes or seconds field as typed by the user: an integer, free text, or
/// any other JSON value. Anything that is not a non-negative integer counts as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl DurationField {
    pub fn as_text(&self) -> String {
        match self {
            DurationField::Number(value) => value.to_string(),
            DurationField::Text(text) => text.clone(),
            DurationField::Other(_) => String::new(),
        }
    }
}

impl Default for DurationField {
    fn default() -> Self {
        DurationField::Text(String::new())
    }
}

/// Minutes/seconds pair used when creating or configuring a countdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationRequest {
    #[serde(default)]
    pub minutes: DurationField,
    #[serde(default)]
    pub seconds: DurationField,
}

impl DurationRequest {
    pub fn total_seconds(&self) -> u64 {
        parse_duration_input(&self.minutes.as_text(), &self.seconds.as_text())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateStopwatchRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCountdownRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub duration: DurationRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_text_are_both_accepted() {
        let request: DurationRequest =
            serde_json::from_str(r#"{"minutes": 2, "seconds": "15"}"#).unwrap();
        assert_eq!(request.total_seconds(), 135);
    }

    #[test]
    fn garbage_and_missing_fields_become_zero() {
        let request: DurationRequest = serde_json::from_str(r#"{"minutes": "soon"}"#).unwrap();
        assert_eq!(request.total_seconds(), 0);

        let request: DurationRequest = serde_json::from_str(r#"{"minutes": -3, "seconds": 9}"#).unwrap();
        assert_eq!(request.total_seconds(), 9);
    }

    #[test]
    fn null_floats_and_booleans_become_zero() {
        let request: DurationRequest =
            serde_json::from_str(r#"{"minutes": null, "seconds": 4}"#).unwrap();
        assert_eq!(request.total_seconds(), 4);

        let request: DurationRequest =
            serde_json::from_str(r#"{"minutes": 1.5, "seconds": true}"#).unwrap();
        assert_eq!(request.total_seconds(), 0);

        let request: DurationRequest =
            serde_json::from_str(r#"{"minutes": [1], "seconds": {"s": 2}}"#).unwrap();
        assert_eq!(request.total_seconds(), 0);
    }

    #[test]
    fn countdown_request_flattens_duration() {
        let request: CreateCountdownRequest =
            serde_json::from_str(r#"{"name": "oven", "minutes": "1", "seconds": "0"}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("oven"));
        assert_eq!(request.duration.total_seconds(), 60);
    }
}
