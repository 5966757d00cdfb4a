use crate::error::CabError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A phone verification code in `0..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct VerificationCode(u16);

impl VerificationCode {
    pub const MAX: u16 = 9998;

    pub fn new(value: u16) -> Result<Self, CabError> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(CabError::Validation(format!(
                "verification code {} out of range 0..={}",
                value,
                Self::MAX
            )))
        }
    }

    /// Draws a code uniformly from `0..=MAX`.
    pub fn generate<R: rand::Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..=Self::MAX))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for VerificationCode {
    type Error = CabError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u16::try_from(value)
            .map_err(|_| CabError::Validation(format!("verification code {} out of range", value)))?;
        Self::new(value)
    }
}

impl From<VerificationCode> for i64 {
    fn from(code: VerificationCode) -> Self {
        code.0 as i64
    }
}

impl FromStr for VerificationCode {
    type Err = CabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .parse()
            .map_err(|_| CabError::Validation("invalid verification code format".to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A code issued for a phone number, awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEntry {
    #[serde(rename = "phonenumber")]
    pub phone_number: String,
    #[serde(rename = "verificationcode")]
    pub code: VerificationCode,
    #[serde(rename = "createdat")]
    pub created_at: DateTime<Utc>,
}

impl VerificationEntry {
    pub fn new(phone_number: &str, code: VerificationCode) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            code,
            created_at: Utc::now(),
        }
    }
}
