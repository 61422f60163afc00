//! HR Request Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request type. Any other string survives a round trip as `Other`
/// and is rejected when the request is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestKind {
    Hire,
    Fire,
    Other(String),
}

impl RequestKind {
    pub fn as_str(&self) -> &str {
        match self {
            RequestKind::Hire => "hire",
            RequestKind::Fire => "fire",
            RequestKind::Other(s) => s,
        }
    }
}

impl From<String> for RequestKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "hire" => RequestKind::Hire,
            "fire" => RequestKind::Fire,
            _ => RequestKind::Other(s),
        }
    }
}

impl From<&str> for RequestKind {
    fn from(s: &str) -> Self {
        RequestKind::from(s.to_string())
    }
}

impl From<RequestKind> for String {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Other(s) => s,
            k => k.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request status. Moves only towards `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    New,
    Pending,
    Done,
}

/// HR request entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrRequest {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub employee_id: u64,
    #[serde(default)]
    pub request_date: Option<NaiveDate>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub needs_it_equipment: bool,
    #[serde(default)]
    pub pass_number: Option<String>,
}

impl HrRequest {
    pub fn new(kind: RequestKind, employee_id: u64) -> Self {
        Self {
            id: 0,
            kind,
            employee_id,
            request_date: None,
            effective_date: None,
            status: RequestStatus::New,
            needs_it_equipment: false,
            pass_number: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == RequestStatus::Done
    }

    /// Not yet done and effective on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.effective_date.is_some_and(|d| d <= today)
    }
}

/// Create HR request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrRequestCreate {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub employee_id: u64,
    pub request_date: Option<NaiveDate>,
    pub effective_date: Option<NaiveDate>,
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub needs_it_equipment: bool,
    pub pass_number: Option<String>,
}

impl From<HrRequestCreate> for HrRequest {
    fn from(data: HrRequestCreate) -> Self {
        Self {
            id: 0,
            kind: data.kind,
            employee_id: data.employee_id,
            request_date: data.request_date,
            effective_date: data.effective_date,
            status: data.status.unwrap_or_default(),
            needs_it_equipment: data.needs_it_equipment,
            pass_number: data.pass_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_unknown_values() {
        let json = r#"{"id":1,"type":"transfer","employee_id":2}"#;
        let req: HrRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind, RequestKind::Other("transfer".into()));
        assert_eq!(req.status, RequestStatus::New);

        let back = serde_json::to_value(&req).unwrap();
        assert_eq!(back["type"], "transfer");
    }

    #[test]
    fn test_is_due() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut req = HrRequest::new(RequestKind::Hire, 1);
        assert!(!req.is_due(today), "no effective date is never due");

        req.effective_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(req.is_due(today));

        req.effective_date = NaiveDate::from_ymd_opt(2024, 3, 2);
        assert!(!req.is_due(today));

        req.effective_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        req.status = RequestStatus::Done;
        assert!(!req.is_due(today));
    }
}
