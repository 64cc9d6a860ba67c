// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Generic `homeassistant` domain service calls working with any entity supporting on / off.

use crate::client::HomeAssistantClient;
use crate::client::model::ServiceData;
use crate::errors::ServiceError;
use crate::messages::IntentResponse;

impl HomeAssistantClient {
    /// Turn on a device. The entity's domain must support `turn_on`, e.g. a light.
    ///
    /// The call is successful even if Home Assistant reports an error in the response body.
    pub async fn turn_on(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.homeassistant_service("turn_on", entity).await
    }

    /// Turn off a device. The entity's domain must support `turn_off`.
    pub async fn turn_off(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.homeassistant_service("turn_off", entity).await
    }

    /// Toggle a device.
    pub async fn toggle(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.homeassistant_service("toggle", entity).await
    }

    async fn homeassistant_service(
        &self,
        service: &str,
        entity: &str,
    ) -> Result<IntentResponse, ServiceError> {
        let body = self
            .call_service("homeassistant", service, ServiceData::new(entity))
            .await?;
        Ok(IntentResponse::success(body.into_value()))
    }
}
