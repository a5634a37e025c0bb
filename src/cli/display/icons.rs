//! Status icons for CLI output

use crate::domain::cluster::observed::ClusterObserved;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (condition true, operation succeeded)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (still progressing)
    pub const WARNING: &'static str = "⚠";

    /// Error icon
    pub const ERROR: &'static str = "✗";

    /// Pending icon (waiting)
    pub const PENDING: &'static str = "⏳";

    /// Hibernated control plane
    pub const HIBERNATED: &'static str = "☾";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    pub fn get_condition_icon(status: &str) -> &'static str {
        match status {
            "True" => Self::SUCCESS,
            "False" => Self::ERROR,
            "Progressing" => Self::WARNING,
            _ => Self::UNKNOWN,
        }
    }

    pub fn get_operation_icon(state: &str) -> &'static str {
        match state {
            "Succeeded" => Self::SUCCESS,
            "Processing" | "Pending" => Self::PENDING,
            "Error" | "Failed" | "Aborted" => Self::ERROR,
            _ => Self::UNKNOWN,
        }
    }

    /// One-word summary of a cluster
    pub fn get_status_text(observed: &ClusterObserved) -> &'static str {
        if observed.hibernated {
            "Hibernated"
        } else if observed.conditions.is_empty() {
            "Unknown"
        } else if observed.is_ready() {
            "Ready"
        } else if observed
            .conditions
            .iter()
            .any(|c| c.status == "False")
        {
            "Failed"
        } else {
            "Progressing"
        }
    }

    pub fn get_status_icon(text: &str) -> &'static str {
        match text {
            "Ready" => Self::SUCCESS,
            "Hibernated" => Self::HIBERNATED,
            "Progressing" => Self::WARNING,
            "Failed" => Self::ERROR,
            _ => Self::UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::observed::{Condition, NetworkStatus};
    use crate::domain::cluster::spec::{ClusterRef, MaintenancePolicy};

    fn observed(statuses: &[&str]) -> ClusterObserved {
        ClusterObserved {
            cluster: ClusterRef::new("public", "demo", "sto2", "p1"),
            uid: None,
            kubernetes_version: "1.31.2".to_string(),
            hibernated: false,
            hibernation_schedules: Vec::new(),
            maintenance: MaintenancePolicy::default(),
            floating_pool_name: "ext-net".to_string(),
            network: NetworkStatus::default(),
            worker_groups: Vec::new(),
            conditions: statuses
                .iter()
                .map(|s| Condition {
                    condition_type: "EveryNodeReady".to_string(),
                    status: s.to_string(),
                    message: String::new(),
                })
                .collect(),
            last_operation: None,
            advertised_addresses: Vec::new(),
            last_updated: None,
        }
    }

    #[test]
    fn test_get_condition_icon() {
        assert_eq!(StatusIcon::get_condition_icon("True"), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_condition_icon("Progressing"), StatusIcon::WARNING);
        assert_eq!(StatusIcon::get_condition_icon("False"), StatusIcon::ERROR);
        assert_eq!(StatusIcon::get_condition_icon(""), StatusIcon::UNKNOWN);
        assert_eq!(StatusIcon::get_operation_icon("Processing"), StatusIcon::PENDING);
    }

    #[test]
    fn test_get_status_text() {
        assert_eq!(StatusIcon::get_status_text(&observed(&["True", "True"])), "Ready");
        assert_eq!(StatusIcon::get_status_text(&observed(&["True", "Progressing"])), "Progressing");
        assert_eq!(StatusIcon::get_status_text(&observed(&["True", "False"])), "Failed");
        assert_eq!(StatusIcon::get_status_text(&observed(&[])), "Unknown");

        let mut hibernated = observed(&["True"]);
        hibernated.hibernated = true;
        assert_eq!(StatusIcon::get_status_text(&hibernated), "Hibernated");
    }
}
