// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix Actor message definitions for the HomeAssistantSkill and the uniform intent response.

use actix::prelude::Message;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::intent::IntentDescriptor;

/// Result of an intent, returned to the assistant host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResponse {
    pub success: bool,
    /// Parsed JSON response body, raw response text, or a skill specific value.
    pub data: Option<Value>,
    /// Error description of a failed call. Not set for rejected intents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntentResponse {
    pub fn success(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    /// Intent not applicable, e.g. a cover operation for a light.
    pub fn rejected() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
        }
    }

    pub fn failed(error: &ServiceError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Call an intent by name.
///
/// The response is always an [`IntentResponse`]: invalid intents and failed Home Assistant
/// requests are reported with `success: false`.
#[derive(Debug, Constructor, Message)]
#[rtype(result = "IntentResponse")]
pub struct CallIntent {
    /// Intent name, e.g. `turn_on_device`.
    pub name: String,
    /// Named intent parameters, e.g. `{"entity": "light.kitchen"}`.
    pub params: Option<Map<String, Value>>,
}

/// Retrieve the descriptors of all supported intents for registration in the assistant host.
#[derive(Debug, Default, Message)]
#[rtype(result = "Vec<IntentDescriptor>")]
pub struct ListIntents {}
