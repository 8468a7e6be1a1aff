//! Records exchanged with the backend and stored in plan files.
//!
//! A submitted record embeds the derived values (duration, advance, balance)
//! computed by the form that produced it.

use super::derivation::DateRange;
use super::status::{MandateStatus, MissionOrderStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandate {
    #[serde(default)]
    pub id: Option<u64>,
    pub reference: String,
    #[serde(default)]
    pub object: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    #[serde(default)]
    pub status: MandateStatus,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Mandate {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Human readable label used in tables and logs.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{} (#{id})", self.reference),
            None => self.reference.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub mandate_id: Option<u64>,
    pub city: City,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}

impl Stage {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionOrder {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub mandate_id: Option<u64>,
    pub holder: String,
    #[serde(default)]
    pub grade: Option<Grade>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub advance_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub status: MissionOrderStatus,
}

impl MissionOrder {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandate_deserialization() {
        let json = r#"{
            "id": 12,
            "reference": "MD-2024-012",
            "object": "Field survey",
            "start_date": "2024-05-01",
            "end_date": "2024-05-15",
            "status": "approved",
            "team": [
                {"name": "S. Haddad", "role": {"id": 2, "name": "Driver"}},
                {"name": "K. Amrani"}
            ],
            "resources": ["Vehicle 14"]
        }"#;

        let mandate: Mandate = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(mandate.id, Some(12));
        assert_eq!(mandate.status, MandateStatus::Approved);
        assert_eq!(mandate.duration_days, None);
        assert_eq!(mandate.team.len(), 2);
        assert_eq!(
            mandate.team[0].role.as_ref().map(|r| r.name.as_str()),
            Some("Driver")
        );
        assert!(mandate.team[1].role.is_none());
        assert_eq!(mandate.range().duration_days(), Some(15));
        assert_eq!(mandate.label(), "MD-2024-012 (#12)");
    }

    #[test]
    fn test_mission_order_defaults() {
        let yaml = r#"
holder: "A. Benali"
start_date: "2024-05-02"
end_date: "2024-05-06"
total_amount: 72000
advance_rate: 50
"#;
        let order: MissionOrder = serde_yaml::from_str(yaml).expect("Failed to deserialize");
        assert_eq!(order.status, MissionOrderStatus::Draft);
        assert_eq!(order.total_amount, Decimal::from(72000));
        assert_eq!(order.advance_rate, Decimal::from(50));
        assert!(order.advance.is_none());
        assert!(order.grade.is_none());
    }

    #[test]
    fn test_stage_serialization_skips_missing_duration() {
        let stage = Stage {
            id: None,
            mandate_id: Some(3),
            city: City {
                id: Some(7),
                name: "Oran".to_string(),
            },
            start_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            duration_days: None,
        };
        let json = serde_json::to_value(&stage).unwrap();
        assert!(json.get("duration_days").is_none());
        assert_eq!(json["city"]["name"], "Oran");
        assert_eq!(json["start_date"], "2024-05-02");
    }
}
