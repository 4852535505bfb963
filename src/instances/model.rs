//! Instance data model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timefmt;

/// Operational state of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Running,
    Stopped,
    Maintenance,
}

/// A compute resource record, associated with tasks via a many-to-many link.
///
/// No lifecycle coupling to tasks — deleting a task never deletes an
/// instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    pub ip: String,
    pub region: String,
    pub status: InstanceStatus,
    pub specification: String,
    #[serde(rename = "cpuType", alias = "cpu_type")]
    pub cpu_type: String,
    /// Refreshed whenever the status changes.
    #[serde(
        rename = "lastHeartbeat",
        alias = "last_heartbeat",
        with = "timefmt::opt_timestamp",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

/// Body of `POST /api/instances` (and entries of the batch endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct NewInstance {
    pub name: String,
    pub ip: String,
    pub region: String,
    #[serde(default = "default_status")]
    pub status: InstanceStatus,
    pub specification: String,
    #[serde(rename = "cpuType", alias = "cpu_type")]
    pub cpu_type: String,
    #[serde(
        rename = "lastHeartbeat",
        alias = "last_heartbeat",
        with = "timefmt::opt_timestamp",
        default
    )]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

fn default_status() -> InstanceStatus {
    InstanceStatus::Running
}

/// Body of `PUT /api/instances/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStatusUpdate {
    pub status: InstanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_serde_snake_case() {
        let json = serde_json::to_string(&InstanceStatus::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");

        let parsed: InstanceStatus = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(parsed, InstanceStatus::Stopped);
    }

    #[test]
    fn instance_serializes_camel_case_fields() {
        let instance = Instance {
            id: 1,
            name: "web-1".into(),
            ip: "10.0.0.1".into(),
            region: "us-east".into(),
            status: InstanceStatus::Running,
            specification: "4c8g".into(),
            cpu_type: "x86".into(),
            last_heartbeat: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
        };
        let json = serde_json::to_value(instance).unwrap();
        assert_eq!(json["cpuType"], "x86");
        assert_eq!(json["lastHeartbeat"], "2026-03-01 09:00:00");
        assert!(json.get("cpu_type").is_none());
    }

    #[test]
    fn new_instance_accepts_both_field_spellings() {
        let camel: NewInstance = serde_json::from_value(serde_json::json!({
            "name": "web-1", "ip": "10.0.0.1", "region": "us-east",
            "specification": "4c8g", "cpuType": "arm64"
        }))
        .unwrap();
        assert_eq!(camel.cpu_type, "arm64");
        assert_eq!(camel.status, InstanceStatus::Running);

        let snake: NewInstance = serde_json::from_value(serde_json::json!({
            "name": "web-2", "ip": "10.0.0.2", "region": "eu-west",
            "specification": "8c16g", "cpu_type": "x86",
            "last_heartbeat": "2026-03-01 09:00:00"
        }))
        .unwrap();
        assert_eq!(snake.cpu_type, "x86");
        assert!(snake.last_heartbeat.is_some());
    }

    #[test]
    fn rejects_unknown_status() {
        let result: Result<InstanceStatus, _> = serde_json::from_str("\"rebooting\"");
        assert!(result.is_err());
    }
}
