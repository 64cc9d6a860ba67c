// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! HA REST API data structure definitions for JSON serialization & deserialization.

use serde::Serialize;
use serde_json::{Map, Value};

/// HTTP method of a Home Assistant REST API query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum QueryMethod {
    Get,
    Post,
}

/// Response body of a Home Assistant REST API query.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Raw text of a body that couldn't be parsed as JSON.
    Text(String),
}

impl ResponseBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn is_raw_text(&self) -> bool {
        matches!(self, ResponseBody::Text(_))
    }

    /// Convert to a JSON value. Raw text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        }
    }
}

/// Service data of a service call.
///
/// Created fresh for every call, `entity_id` is always the first entry.
#[derive(Debug, Serialize)]
pub(crate) struct ServiceData {
    pub entity_id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ServiceData {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
