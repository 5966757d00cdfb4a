use super::id::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Lifecycle state of a cab request. The only transition is
/// `Active -> Cancelled`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RequestStatus {
    Cancelled,
    Active,
}

impl RequestStatus {
    pub fn code(&self) -> i64 {
        match self {
            RequestStatus::Cancelled => 0,
            RequestStatus::Active => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RequestStatus::Cancelled),
            1 => Some(RequestStatus::Active),
            _ => None,
        }
    }
}

/// A rider's request for a cab from one place to another.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CabRequest {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub from: String,
    pub to: String,
    #[serde(rename = "requestedby")]
    pub requested_by: String,
    /// Always empty; nothing estimates arrival times yet.
    pub eta: String,
    #[serde(
        serialize_with = "serialize_status",
        deserialize_with = "deserialize_status"
    )]
    pub status: RequestStatus,
    #[serde(rename = "createdat")]
    pub created_at: DateTime<Utc>,
}

fn serialize_status<S>(status: &RequestStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(status.code())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<RequestStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let code = i64::deserialize(deserializer)?;
    RequestStatus::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown request status {}", code)))
}

impl CabRequest {
    pub fn new(from: &str, to: &str, requested_by: &str) -> Self {
        Self {
            id: ObjectId::new(),
            from: from.to_string(),
            to: to.to_string(),
            requested_by: requested_by.to_string(),
            eta: String::new(),
            status: RequestStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_is_active() {
        let request = CabRequest::new("A", "B", "+15551234");
        assert!(request.is_active());
        assert!(request.eta.is_empty());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RequestStatus::Active.code(), 1);
        assert_eq!(RequestStatus::Cancelled.code(), 0);
        assert_eq!(RequestStatus::from_code(1), Some(RequestStatus::Active));
        assert_eq!(RequestStatus::from_code(0), Some(RequestStatus::Cancelled));
        assert_eq!(RequestStatus::from_code(2), None);
    }

    #[test]
    fn test_request_document_shape() {
        let request = CabRequest::new("A", "B", "+15551234");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requestedby"], "+15551234");
        assert_eq!(value["status"], 1);
        assert_eq!(value["_id"], request.id.to_hex());
    }
}
