// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Home Assistant client REST API implementation.
//!
//! Every operation is a single stateless round trip: build the endpoint URL and JSON payload,
//! send one HTTP request and wrap the response body.
//!
//! See <https://developers.home-assistant.io/docs/api/rest/> for further information.

use awc::error::PayloadError;
use awc::http::Method;
use awc::http::header::CONTENT_TYPE;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use url::Url;

use crate::configuration::{ENV_DISABLE_CERT_VERIFICATION, ENV_HASS_MSG_TRACING, HomeAssistantSettings};
use crate::errors::ServiceError;
use crate::intent::Intent;
use crate::messages::IntentResponse;
use crate::util::{MsgTracing, bool_from_env, new_http_client};

mod get_states;
#[cfg(test)]
pub(crate) mod mock_server;
pub mod model;
mod service;

pub use model::{QueryMethod, ResponseBody};
pub use service::light::{
    BRIGHTNESS_STEP_PERCENT, MAX_STEP_BRIGHTNESS, MIN_STEP_BRIGHTNESS, percent_to_brightness,
    step_brightness,
};
pub use service::entity_domain;

#[derive(Clone)]
pub struct HomeAssistantClient {
    /// Unique HA client id for logging
    id: String,
    /// Base server address, always ending with `/` (e.g. http://hassio.local:8123/)
    base_url: Url,
    access_token: String,
    // creating an expensive client is sufficient once per process, cloning is cheap
    http: awc::Client,
    max_body_size: usize,
    msg_tracing: MsgTracing,
}

impl HomeAssistantClient {
    /// Create a new client from the given settings.
    ///
    /// Fails if the configured URL is invalid or the HTTP client can't be created.
    pub fn new(settings: &HomeAssistantSettings) -> Result<Self, ServiceError> {
        let base_url = settings.get_url()?;
        let host = base_url.host_str().unwrap_or(base_url.as_str());
        let port = base_url.port_or_known_default().unwrap_or_default();
        let id = format!("{host}:{port}");

        if settings.get_token().is_empty() {
            warn!("[{id}] No Home Assistant access token configured, requests will be unauthorized");
        }

        let http = new_http_client(
            settings.connection_timeout(),
            settings.request_timeout(),
            base_url.scheme() == "https",
            settings.disable_cert_validation || bool_from_env(ENV_DISABLE_CERT_VERIFICATION),
        )?;

        info!("[{id}] Home Assistant client created for {base_url}");

        Ok(Self {
            id,
            base_url,
            access_token: settings.get_token().to_string(),
            http,
            max_body_size: settings.max_body_size_kb.saturating_mul(1024),
            msg_tracing: MsgTracing::from_env(ENV_HASS_MSG_TRACING),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of an API endpoint relative to the base URL, e.g. `api/states`.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ServiceError> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// URL of an entity resource below a collection endpoint, e.g. `api/states/` + `light.desk`.
    ///
    /// The entity id is appended as a single percent-encoded path segment: `/`, `?`, `#` and
    /// `%` can't change the endpoint. Empty, `.` and `..` ids are rejected.
    pub fn entity_url(&self, endpoint: &str, entity_id: &str) -> Result<Url, ServiceError> {
        if matches!(entity_id, "" | "." | "..") {
            return Err(ServiceError::BadRequest(format!(
                "Invalid entity id: '{entity_id}'"
            )));
        }
        let mut url = self.endpoint_url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::ConfigError("Home Assistant URL can't be a base URL".into())
            })?
            .pop_if_empty()
            .push(entity_id);
        Ok(url)
    }

    /// Send a single request to the Home Assistant REST API.
    ///
    /// GET requests send the optional `body` object as URL query parameters, POST requests as
    /// JSON payload. A missing POST body is sent as empty JSON object.
    ///
    /// The response body is parsed as JSON. If that fails, the raw text is returned as
    /// [`ResponseBody::Text`] and logged. The HTTP status code is not interpreted.
    ///
    /// returns: Err only for transport failures (connection, timeout, body size or read errors).
    pub async fn query(
        &self,
        endpoint: &str,
        method: QueryMethod,
        body: Option<&Value>,
    ) -> Result<ResponseBody, ServiceError> {
        let url = self.endpoint_url(endpoint)?;
        self.query_url(url, method, body).await
    }

    /// Send a single request to an already resolved URL. See [`HomeAssistantClient::query`].
    pub async fn query_url(
        &self,
        url: Url,
        method: QueryMethod,
        body: Option<&Value>,
    ) -> Result<ResponseBody, ServiceError> {
        let endpoint = url.path();
        let request = match method {
            QueryMethod::Get => self.http.request(Method::GET, url.as_str()),
            QueryMethod::Post => self.http.request(Method::POST, url.as_str()),
        }
        .bearer_auth(&self.access_token)
        .insert_header((CONTENT_TYPE, "application/json"));

        debug!("[{}] {method} {endpoint}", self.id);

        let send = match method {
            QueryMethod::Get => match body {
                Some(params) => request
                    .query(params)
                    .map_err(|e| ServiceError::SerializationError(e.to_string()))?
                    .send(),
                None => request.send(),
            },
            QueryMethod::Post => {
                let payload = match body {
                    Some(body) => serde_json::to_string(body)?,
                    None => serde_json::to_string(&Map::new())?,
                };
                if self.msg_tracing.outgoing() {
                    debug!("[{}] -> {payload}", self.id);
                }
                request.send_body(payload)
            }
        };

        let mut response = send.await.map_err(|e| {
            warn!("[{}] {method} {endpoint} failed: {e}", self.id);
            ServiceError::from(e)
        })?;
        let status = response.status();
        let bytes = response
            .body()
            .limit(self.max_body_size)
            .await
            .map_err(|e| {
                if matches!(e, PayloadError::Overflow) {
                    warn!(
                        "[{}] Response of {method} {endpoint} exceeds {} bytes, increase hass.max_body_size_kb",
                        self.id, self.max_body_size
                    );
                }
                ServiceError::from(e)
            })?;

        if !status.is_success() {
            warn!("[{}] {method} {endpoint} returned {status}", self.id);
        }

        let body = ResponseBody::from_bytes(&bytes);
        match &body {
            ResponseBody::Text(text) => {
                warn!("[{}] Response of {method} {endpoint} is not JSON: {text}", self.id)
            }
            ResponseBody::Json(value) if self.msg_tracing.incoming() => {
                debug!("[{}] <- {value}", self.id)
            }
            ResponseBody::Json(_) => {}
        }

        Ok(body)
    }

    /// Execute a typed intent with the matching Home Assistant operation.
    pub async fn execute(&self, intent: &Intent) -> Result<IntentResponse, ServiceError> {
        match intent {
            Intent::GetEntities => self.get_entities().await,
            Intent::TurnOn { entity } => self.turn_on(entity).await,
            Intent::TurnOff { entity } => self.turn_off(entity).await,
            Intent::Open { entity } => self.open(entity).await,
            Intent::Close { entity } => self.close(entity).await,
            Intent::Stop { entity } => self.stop(entity).await,
            Intent::Toggle { entity } => self.toggle(entity).await,
            Intent::ReadState { sensor_name } => self.read_state(sensor_name).await,
            Intent::SetBrightness { light, brightness } => {
                self.set_brightness(light, *brightness).await
            }
            Intent::IncreaseBrightness { light } => self.increase_brightness(light).await,
            Intent::DecreaseBrightness { light } => self.decrease_brightness(light).await,
            Intent::TriggerAutomation { automation } => self.trigger_automation(automation).await,
            Intent::SetClimate { entity, value } => self.set_climate(entity, *value).await,
        }
    }
}
