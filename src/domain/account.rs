use super::id::ObjectId;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AccountStatus {
    Active,
}

impl AccountStatus {
    pub fn code(&self) -> i64 {
        match self {
            AccountStatus::Active => 1,
        }
    }
}

/// A registered rider, keyed by phone number.
///
/// The phone number is unique across accounts; the store's unique index on
/// `phonenumber` enforces it. Status is persisted as an integer (1 = active).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "phonenumber")]
    pub phone_number: String,
    pub name: String,
    pub address: String,
    #[serde(
        serialize_with = "serialize_status",
        deserialize_with = "deserialize_status"
    )]
    pub status: AccountStatus,
}

fn serialize_status<S>(status: &AccountStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(status.code())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<AccountStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match i64::deserialize(deserializer)? {
        1 => Ok(AccountStatus::Active),
        other => Err(serde::de::Error::custom(format!(
            "unknown account status {}",
            other
        ))),
    }
}

impl Account {
    pub fn new(phone_number: &str, name: &str, address: &str) -> Self {
        Self {
            id: ObjectId::new(),
            phone_number: phone_number.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            status: AccountStatus::Active,
        }
    }
}
