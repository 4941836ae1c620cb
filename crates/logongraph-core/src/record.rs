use serde::{Deserialize, Serialize};

/// One row of a logon event export.
///
/// Every column is optional; absent or empty cells deserialize to `""` and
/// the builder decides which rows are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogonRecord {
    #[serde(rename = "EventTime", default)]
    pub event_time: String,
    #[serde(rename = "Computer", default)]
    pub computer: String,
    #[serde(rename = "EventData.IpAddress", default)]
    pub ip_address: String,
    #[serde(rename = "EventData.TargetUserName", default)]
    pub target_user: String,
    #[serde(rename = "IpResolved", default)]
    pub ip_resolved: String,
}

impl LogonRecord {
    pub fn new(
        event_time: impl Into<String>,
        computer: impl Into<String>,
        ip_address: impl Into<String>,
        target_user: impl Into<String>,
        ip_resolved: impl Into<String>,
    ) -> Self {
        Self {
            event_time: event_time.into(),
            computer: computer.into(),
            ip_address: ip_address.into(),
            target_user: target_user.into(),
            ip_resolved: ip_resolved.into(),
        }
    }

    /// Rows without a time, computer or source IP never produce an edge.
    pub fn is_event(&self) -> bool {
        !self.event_time.is_empty() && !self.computer.is_empty() && !self.ip_address.is_empty()
    }
}
