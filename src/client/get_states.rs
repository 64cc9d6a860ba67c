// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Entity state queries: `api/states` and `api/states/<entity_id>`.

use crate::client::HomeAssistantClient;
use crate::client::model::{QueryMethod, ResponseBody};
use crate::errors::ServiceError;
use crate::messages::IntentResponse;
use log::{debug, warn};
use serde_json::Value;

impl HomeAssistantClient {
    /// Retrieve the identifiers of all entities, sorted lexicographically.
    ///
    /// Entries without an `entity_id` are skipped. A body which isn't a JSON array results in an
    /// empty list.
    pub async fn get_entities(&self) -> Result<IntentResponse, ServiceError> {
        let body = self.query("api/states", QueryMethod::Get, None).await?;
        let entity_ids = entity_ids_from_states(&body);
        if entity_ids.is_empty() {
            warn!("[{}] No entities found in api/states response", self.id);
        } else {
            debug!("[{}] Found {} entities", self.id, entity_ids.len());
        }

        Ok(IntentResponse::success(entity_ids))
    }

    /// Read the state of a sensor or device, e.g. `sensor.outside_temperature`.
    ///
    /// returns: the `state` field of the entity. A `NotFound` error if the entity doesn't exist
    /// or the response has no `state` field.
    pub async fn read_state(&self, sensor_name: &str) -> Result<IntentResponse, ServiceError> {
        let url = self.entity_url("api/states/", sensor_name)?;
        let body = self.query_url(url, QueryMethod::Get, None).await?;

        match body.as_json().and_then(|v| v.get("state")) {
            Some(state) => Ok(IntentResponse::success(state.clone())),
            None => Err(ServiceError::NotFound(format!(
                "No state field in response for {sensor_name}: {}",
                body.into_value()
            ))),
        }
    }
}

fn entity_ids_from_states(body: &ResponseBody) -> Vec<String> {
    let mut entity_ids: Vec<String> = match body.as_json() {
        Some(Value::Array(states)) => states
            .iter()
            .filter_map(|s| s.get("entity_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    entity_ids.sort();
    entity_ids
}

#[cfg(test)]
mod tests {
    use super::entity_ids_from_states;
    use crate::client::HomeAssistantClient;
    use crate::client::mock_server::MockHass;
    use crate::client::model::ResponseBody;
    use crate::errors::ServiceError;
    use crate::messages::IntentResponse;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!([{"entity_id": "b"}, {"entity_id": "a"}]), vec!["a", "b"])]
    #[case(json!([]), vec![])]
    #[case(json!([{"entity_id": "light.z"}, {"state": "on"}, {"entity_id": 5}, "text", {"entity_id": "cover.a"}]), vec!["cover.a", "light.z"])]
    #[case(json!({"entity_id": "light.kitchen"}), vec![])]
    #[case(json!({"message": "API running."}), vec![])]
    fn entity_ids_are_extracted_and_sorted(#[case] states: Value, #[case] expected: Vec<&str>) {
        assert_eq!(expected, entity_ids_from_states(&ResponseBody::Json(states)));
    }

    #[test]
    fn entity_ids_from_raw_text_is_empty() {
        let body = ResponseBody::Text("401: Unauthorized".into());
        assert!(entity_ids_from_states(&body).is_empty());
    }

    #[actix_web::test]
    async fn get_entities() {
        let hass = MockHass::start(&[(
            "/api/states",
            r#"[
                {"entity_id": "sensor.outside_temperature", "state": "12.5", "attributes": {}},
                {"entity_id": "cover.garage", "state": "closed", "attributes": {}},
                {"entity_id": "light.kitchen", "state": "on", "attributes": {"brightness": 128}}
            ]"#,
        )]);

        let result = hass.client().get_entities().await;

        assert_eq!(
            Ok(IntentResponse::success(json!([
                "cover.garage",
                "light.kitchen",
                "sensor.outside_temperature"
            ]))),
            result
        );
        let requests = hass.requests();
        assert_eq!("GET", requests[0].method);
        assert_eq!("/api/states", requests[0].path);
        assert_eq!(
            Some("Bearer secret-token"),
            requests[0].authorization.as_deref()
        );
        hass.stop().await;
    }

    #[actix_web::test]
    async fn read_state() {
        let hass = MockHass::start(&[(
            "/api/states/sensor.outside_temperature",
            r#"{"entity_id": "sensor.outside_temperature", "state": "12.5", "attributes": {"unit_of_measurement": "°C"}}"#,
        )]);

        let result = hass.client().read_state("sensor.outside_temperature").await;

        assert_eq!(Ok(IntentResponse::success("12.5")), result);
        assert_eq!(vec!["/api/states/sensor.outside_temperature"], hass.paths());
        hass.stop().await;
    }

    #[actix_web::test]
    async fn read_state_of_unknown_entity_returns_not_found() {
        // HA answers with status 404 and {"message": "Entity not found."}
        let hass = MockHass::start(&[(
            "/api/states/sensor.unknown",
            r#"{"message": "Entity not found."}"#,
        )]);

        let result = hass.client().read_state("sensor.unknown").await;

        assert!(
            matches!(result, Err(ServiceError::NotFound(_))),
            "Missing state must return NotFound, but got: {result:?}"
        );
        hass.stop().await;
    }

    #[rstest]
    #[case("sensor.a#frag", "/api/states/sensor.a%23frag")]
    #[case("sensor.a?x=1", "/api/states/sensor.a%3Fx=1")]
    #[case("../../config", "/api/states/..%2F..%2Fconfig")]
    #[case("../services/x?y", "/api/states/..%2Fservices%2Fx%3Fy")]
    #[case("sensor.100%", "/api/states/sensor.100%25")]
    #[actix_web::test]
    async fn read_state_keeps_entity_id_in_one_path_segment(
        #[case] sensor_name: &str,
        #[case] expected_path: &str,
    ) {
        let hass = MockHass::start(&[]);

        let result = hass.client().read_state(sensor_name).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        let requests = hass.requests();
        assert_eq!(1, requests.len());
        assert_eq!(expected_path, requests[0].path);
        assert_eq!("", requests[0].query);
        hass.stop().await;
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[actix_web::test]
    async fn read_state_with_relative_entity_id_returns_bad_request(#[case] sensor_name: &str) {
        let hass = MockHass::start(&[]);

        let result = hass.client().read_state(sensor_name).await;

        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        assert!(hass.requests().is_empty());
        hass.stop().await;
    }

    #[actix_web::test]
    async fn read_state_below_base_path() {
        let hass = MockHass::start(&[(
            "/hass/api/states/sensor.temp",
            r#"{"entity_id": "sensor.temp", "state": "21"}"#,
        )]);
        let mut settings = hass.settings();
        let base_url = settings.get_url().unwrap().join("hass").unwrap();
        settings.set_url(base_url.to_string());
        let client = HomeAssistantClient::new(&settings).unwrap();

        let result = client.read_state("sensor.temp").await;

        assert_eq!(Ok(IntentResponse::success("21")), result);
        hass.stop().await;
    }

    #[actix_web::test]
    async fn read_state_with_raw_text_returns_not_found() {
        let hass = MockHass::start(&[]);

        let result = hass.client().read_state("sensor.unknown").await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        hass.stop().await;
    }
}
