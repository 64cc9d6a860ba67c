// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Cover entity specific HA service call logic.

use crate::client::HomeAssistantClient;
use crate::client::model::ServiceData;
use crate::client::service::entity_domain;
use crate::errors::ServiceError;
use crate::messages::IntentResponse;
use log::warn;

const COVER_DOMAIN: &str = "cover";

impl HomeAssistantClient {
    /// Open a cover, e.g. `cover.garage`.
    ///
    /// Entities of other domains are rejected without sending a request.
    pub async fn open(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.cover_service("open_cover", entity).await
    }

    /// Close a cover. Entities of other domains are rejected without sending a request.
    pub async fn close(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.cover_service("close_cover", entity).await
    }

    /// Stop a moving cover. Entities of other domains are rejected without sending a request.
    pub async fn stop(&self, entity: &str) -> Result<IntentResponse, ServiceError> {
        self.cover_service("stop_cover", entity).await
    }

    async fn cover_service(
        &self,
        service: &str,
        entity: &str,
    ) -> Result<IntentResponse, ServiceError> {
        let domain = entity_domain(entity);
        if domain != COVER_DOMAIN {
            warn!(
                "[{}] {service} is only supported for covers, ignoring {entity}",
                self.id
            );
            return Ok(IntentResponse::rejected());
        }

        let body = self
            .call_service(domain, service, ServiceData::new(entity))
            .await?;
        Ok(IntentResponse::success(body.into_value()))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::mock_server::MockHass;
    use crate::messages::IntentResponse;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("open_cover")]
    #[case("close_cover")]
    #[case("stop_cover")]
    #[actix_web::test]
    async fn cover_service_calls(#[case] service: &str) {
        let path = format!("/api/services/cover/{service}");
        let hass = MockHass::start(&[(&path, "[]")]);
        let client = hass.client();

        let result = match service {
            "open_cover" => client.open("cover.garage").await,
            "close_cover" => client.close("cover.garage").await,
            _ => client.stop("cover.garage").await,
        };

        assert_eq!(Ok(IntentResponse::success(json!([]))), result);
        let requests = hass.requests();
        assert_eq!(1, requests.len());
        assert_eq!(path, requests[0].path);
        assert_eq!(json!({"entity_id": "cover.garage"}), requests[0].json_body());
        hass.stop().await;
    }

    #[rstest]
    #[case("light.kitchen")]
    #[case("switch.cover")]
    #[case("covers.garage")]
    #[case("garage")]
    #[actix_web::test]
    async fn non_cover_entities_are_rejected_without_request(#[case] entity: &str) {
        let hass = MockHass::start(&[]);
        let client = hass.client();

        assert_eq!(Ok(IntentResponse::rejected()), client.open(entity).await);
        assert_eq!(Ok(IntentResponse::rejected()), client.close(entity).await);
        assert_eq!(Ok(IntentResponse::rejected()), client.stop(entity).await);

        assert!(hass.requests().is_empty(), "no request must be sent");
        hass.stop().await;
    }

    #[actix_web::test]
    async fn rejected_response_has_no_data() {
        let hass = MockHass::start(&[]);

        let result = hass.client().open("light.kitchen").await.unwrap();

        assert_eq!(
            json!({"success": false, "data": null}),
            serde_json::to_value(result).unwrap()
        );
        hass.stop().await;
    }
}
