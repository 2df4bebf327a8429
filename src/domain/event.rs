use crate::domain::null_as_default;
use crate::domain::schedule::HourlyActivity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use time::OffsetDateTime;

pub const EMAIL_PROPERTY: &str = "email";
pub const HOURLY_PROPERTY: &str = "hourly";
pub const SEGMENT_PROPERTY: &str = "_audience_friendly";

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Failed to decode event body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Property `{name}` should be {expected}, found {found}")]
    TypeMismatch { name: String, expected: &'static str, found: &'static str },
    #[error("Hourly activity key `{0}` is not an hour of day")]
    InvalidHour(String),
    #[error("Hourly activity count for hour {0} is not a non-negative number")]
    InvalidCount(u8),
}

/// A single user property as delivered by the segmentation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Number(_) => "a number",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a mapping",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Looks up a string property. A missing or `null` property is `None`.
    ///
    /// # Errors
    /// Returns `EventError::TypeMismatch` if the property exists but is not a string.
    pub fn string(&self, name: &str) -> Result<Option<&str>, EventError> {
        match self.0.get(name) {
            None | Some(PropertyValue::Null) => Ok(None),
            Some(PropertyValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(EventError::TypeMismatch { name: name.to_string(), expected: "a string", found: other.kind() }),
        }
    }

    /// Looks up a nested mapping property. A missing or `null` property is `None`.
    ///
    /// # Errors
    /// Returns `EventError::TypeMismatch` if the property exists but is not a mapping.
    pub fn mapping(&self, name: &str) -> Result<Option<&BTreeMap<String, PropertyValue>>, EventError> {
        match self.0.get(name) {
            None | Some(PropertyValue::Null) => Ok(None),
            Some(PropertyValue::Map(m)) => Ok(Some(m)),
            Some(other) => {
                Err(EventError::TypeMismatch { name: name.to_string(), expected: "a mapping", found: other.kind() })
            }
        }
    }
}

/// Audience lifecycle event (`segment_entered` / `segment_exited`) as posted by the webhook.
///
/// Missing envelope fields decode to their defaults; only values of the wrong shape are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, rename = "event", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl InboundEvent {
    /// Decodes a raw webhook body.
    ///
    /// # Errors
    /// Returns `EventError::Decode` if the body is not JSON of the expected shape.
    pub fn decode(body: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Recipient address. Blank addresses count as missing.
    ///
    /// # Errors
    /// Returns `EventError::TypeMismatch` if `email` is not a string.
    pub fn email(&self) -> Result<Option<&str>, EventError> {
        Ok(self.properties.string(EMAIL_PROPERTY)?.map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Human readable name of the segment the user entered or left.
    ///
    /// # Errors
    /// Returns `EventError::TypeMismatch` if the property is not a string.
    pub fn friendly_segment(&self) -> Result<Option<&str>, EventError> {
        self.properties.string(SEGMENT_PROPERTY)
    }

    /// Per-hour activity counts, if the profile carries them.
    ///
    /// # Errors
    /// Returns an `EventError` if `hourly` is not a mapping of hours to non-negative counts.
    pub fn hourly_activity(&self) -> Result<Option<HourlyActivity>, EventError> {
        self.properties.mapping(HOURLY_PROPERTY)?.map(HourlyActivity::from_properties).transpose()
    }
}
