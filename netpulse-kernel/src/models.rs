use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::registry::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Active,
    Inactive,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Sensible à la casse, comme le contrat JSON du dashboard
impl FromStr for DeviceStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(DeviceStatus::Active),
            "Inactive" => Ok(DeviceStatus::Inactive),
            other => Err(RegistryError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,     // libre : Mobile, Computer, Printer...
    pub status: DeviceStatus,
}

/// Point de la série des clients actifs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub by_type: BTreeMap<String, usize>,
}

// Corps de POST /api/devices ; id et status éventuels sont ignorés
#[derive(Debug, Deserialize)]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

// Corps de PATCH /api/devices/{id}/status ; validé par le registre
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub type DevicesMap = HashMap<String, Device>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("Active".parse::<DeviceStatus>().unwrap(), DeviceStatus::Active);
        assert_eq!("Inactive".parse::<DeviceStatus>().unwrap(), DeviceStatus::Inactive);
        assert!(matches!(
            "active".parse::<DeviceStatus>(),
            Err(RegistryError::InvalidStatus(v)) if v == "active"
        ));
        assert!("".parse::<DeviceStatus>().is_err());
    }

    #[test]
    fn test_device_wire_format() {
        let device = Device {
            id: "abc".into(),
            name: "laptop".into(),
            device_type: "Computer".into(),
            status: DeviceStatus::Inactive,
        };
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "abc", "name": "laptop", "type": "Computer", "status": "Inactive"})
        );
    }

    #[test]
    fn test_sample_timestamp_is_rfc3339() {
        let sample = Sample { timestamp: time::macros::datetime!(2024-05-01 12:30:00 UTC), count: 3 };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00Z");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_new_device_ignores_client_fields() {
        let body = r#"{"id":"forged","name":"phone","type":"Mobile","status":"Inactive"}"#;
        let dev: NewDevice = serde_json::from_str(body).unwrap();
        assert_eq!(dev.name, "phone");
        assert_eq!(dev.device_type, "Mobile");
    }
}
