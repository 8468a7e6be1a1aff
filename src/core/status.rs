//! Lifecycle states of mandates and mission orders.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandateStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
    InProgress,
    Closed,
}

impl MandateStatus {
    pub const ALL: [MandateStatus; 6] = [
        MandateStatus::Draft,
        MandateStatus::Submitted,
        MandateStatus::Approved,
        MandateStatus::Rejected,
        MandateStatus::InProgress,
        MandateStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MandateStatus::Draft => "draft",
            MandateStatus::Submitted => "submitted",
            MandateStatus::Approved => "approved",
            MandateStatus::Rejected => "rejected",
            MandateStatus::InProgress => "in_progress",
            MandateStatus::Closed => "closed",
        }
    }

    pub fn can_transition_to(&self, next: MandateStatus) -> bool {
        use MandateStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Rejected, Draft)
                | (Approved, InProgress)
                | (InProgress, Closed)
        )
    }

    /// Dates and team can only change before approval.
    pub fn is_editable(&self) -> bool {
        matches!(self, MandateStatus::Draft | MandateStatus::Rejected)
    }
}

impl Display for MandateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MandateStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        MandateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| anyhow::anyhow!("Invalid mandate status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOrderStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl MissionOrderStatus {
    pub const ALL: [MissionOrderStatus; 6] = [
        MissionOrderStatus::Draft,
        MissionOrderStatus::Submitted,
        MissionOrderStatus::Approved,
        MissionOrderStatus::Rejected,
        MissionOrderStatus::Completed,
        MissionOrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionOrderStatus::Draft => "draft",
            MissionOrderStatus::Submitted => "submitted",
            MissionOrderStatus::Approved => "approved",
            MissionOrderStatus::Rejected => "rejected",
            MissionOrderStatus::Completed => "completed",
            MissionOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: MissionOrderStatus) -> bool {
        use MissionOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Draft, Cancelled)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Rejected, Draft)
                | (Approved, Completed)
                | (Approved, Cancelled)
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            MissionOrderStatus::Completed | MissionOrderStatus::Cancelled
        )
    }
}

impl Display for MissionOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MissionOrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        MissionOrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| anyhow::anyhow!("Invalid mission order status: {}", s))
    }
}

// "In Progress", "in-progress" and "IN_PROGRESS" all map to "in_progress"
fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandate_status_parsing() {
        assert_eq!(
            "in progress".parse::<MandateStatus>().unwrap(),
            MandateStatus::InProgress
        );
        assert_eq!(
            "IN-PROGRESS".parse::<MandateStatus>().unwrap(),
            MandateStatus::InProgress
        );
        assert_eq!(
            " Approved ".parse::<MandateStatus>().unwrap(),
            MandateStatus::Approved
        );
        assert!("archived".parse::<MandateStatus>().is_err());
    }

    #[test]
    fn test_status_display_round_trips_through_parse() {
        for status in MandateStatus::ALL {
            assert_eq!(status.to_string().parse::<MandateStatus>().unwrap(), status);
        }
        for status in MissionOrderStatus::ALL {
            assert_eq!(
                status.to_string().parse::<MissionOrderStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&MandateStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let status: MissionOrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, MissionOrderStatus::Cancelled);
    }

    #[test]
    fn test_mandate_transitions() {
        assert!(MandateStatus::Draft.can_transition_to(MandateStatus::Submitted));
        assert!(MandateStatus::Submitted.can_transition_to(MandateStatus::Rejected));
        assert!(MandateStatus::Rejected.can_transition_to(MandateStatus::Draft));
        assert!(!MandateStatus::Draft.can_transition_to(MandateStatus::Approved));
        assert!(!MandateStatus::Closed.can_transition_to(MandateStatus::Draft));
        assert!(MandateStatus::Draft.is_editable());
        assert!(!MandateStatus::Approved.is_editable());
    }

    #[test]
    fn test_mission_order_transitions() {
        assert!(MissionOrderStatus::Draft.can_transition_to(MissionOrderStatus::Cancelled));
        assert!(MissionOrderStatus::Approved.can_transition_to(MissionOrderStatus::Completed));
        assert!(!MissionOrderStatus::Completed.can_transition_to(MissionOrderStatus::Draft));
        assert!(!MissionOrderStatus::Submitted.can_transition_to(MissionOrderStatus::Completed));
        for status in MissionOrderStatus::ALL {
            if status.is_final() {
                assert!(
                    MissionOrderStatus::ALL
                        .iter()
                        .all(|next| !status.can_transition_to(*next))
                );
            }
        }
    }
}
