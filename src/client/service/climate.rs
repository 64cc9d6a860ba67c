// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Climate entity specific HA service call logic.

use crate::client::HomeAssistantClient;
use crate::client::model::ServiceData;
use crate::errors::ServiceError;
use crate::messages::IntentResponse;

/// Thermostat endpoint. Unlike all other endpoints it has no `api/` prefix, a standard Home
/// Assistant server answers with 404. Kept as is for compatibility with existing setups.
const SET_TEMPERATURE_ENDPOINT: &str = "services/climate/set_temperature";

impl HomeAssistantClient {
    /// Set the target temperature of a thermostat.
    pub async fn set_climate(
        &self,
        entity: &str,
        temperature: f64,
    ) -> Result<IntentResponse, ServiceError> {
        if !temperature.is_finite() {
            return Err(ServiceError::BadRequest(format!(
                "Invalid temperature for {entity}: {temperature}"
            )));
        }
        let data = ServiceData::new(entity).with("temperature", temperature);
        let body = self.call_endpoint(SET_TEMPERATURE_ENDPOINT, data).await?;
        Ok(IntentResponse::success(body.into_value()))
    }
}
