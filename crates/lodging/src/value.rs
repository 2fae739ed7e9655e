//! Lodging value objects: room type and guest name.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use staybook_core::{DomainError, DomainResult, ValueObject};

/// Kind of room on offer. Only the listed labels are valid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Standard, RoomType::Deluxe, RoomType::Suite];

    /// Smart constructor. Matching is exact and case-sensitive.
    pub fn new(value: &str) -> DomainResult<Self> {
        match value {
            "Standard" => Ok(RoomType::Standard),
            "Deluxe" => Ok(RoomType::Deluxe),
            "Suite" => Ok(RoomType::Suite),
            other => Err(DomainError::validation(format!(
                "unknown room type {other:?} (expected one of Standard, Deluxe, Suite)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Standard => "Standard",
            RoomType::Deluxe => "Deluxe",
            RoomType::Suite => "Suite",
        }
    }
}

impl ValueObject for RoomType {}

impl core::fmt::Display for RoomType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RoomType {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RoomType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RoomType> for String {
    fn from(value: RoomType) -> Self {
        value.as_str().to_owned()
    }
}

/// Name a reservation is held under.
///
/// Stored exactly as given; only rejected when blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuestName(String);

impl GuestName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("guest name cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl ValueObject for GuestName {}

impl core::fmt::Display for GuestName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GuestName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GuestName> for String {
    fn from(value: GuestName) -> Self {
        value.0
    }
}
