// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Home Assistant REST service call handler.
//! Translates the skill operations into HA `api/services/<domain>/<service>` POST requests.
//!
//! See <https://developers.home-assistant.io/docs/api/rest/#post-apiservicesdomainservice> for
//! further information.

use crate::client::HomeAssistantClient;
use crate::client::model::{QueryMethod, ResponseBody, ServiceData};
use crate::errors::ServiceError;
use log::info;

mod automation;
mod climate;
mod cover;
mod homeassistant;
pub(crate) mod light;

impl HomeAssistantClient {
    /// Call a Home Assistant service with the given service data.
    ///
    /// returns: the response body, which is the list of changed states for a successful call.
    pub(crate) async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: ServiceData,
    ) -> Result<ResponseBody, ServiceError> {
        self.call_endpoint(&format!("api/services/{domain}/{service}"), data)
            .await
    }

    /// Post service data to a service endpoint path.
    pub(crate) async fn call_endpoint(
        &self,
        endpoint: &str,
        data: ServiceData,
    ) -> Result<ResponseBody, ServiceError> {
        info!("[{}] Calling {endpoint} for {}", self.id, data.entity_id);
        let payload = serde_json::to_value(data)?;
        self.query(endpoint, QueryMethod::Post, Some(&payload)).await
    }
}

/// Get the domain of an entity identifier: the text before the first `.`.
///
/// An identifier without `.` is its own domain.
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id
        .split_once('.')
        .map(|(domain, _)| domain)
        .unwrap_or(entity_id)
}
