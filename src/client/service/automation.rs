// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Automation entity specific HA service call logic.

use crate::client::HomeAssistantClient;
use crate::client::model::ServiceData;
use crate::errors::ServiceError;
use crate::messages::IntentResponse;

impl HomeAssistantClient {
    /// Trigger the actions of an automation, e.g. `automation.good_morning`.
    pub async fn trigger_automation(&self, automation: &str) -> Result<IntentResponse, ServiceError> {
        let body = self
            .call_service("automation", "trigger", ServiceData::new(automation))
            .await?;
        Ok(IntentResponse::success(body.into_value()))
    }
}
