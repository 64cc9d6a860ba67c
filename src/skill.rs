// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Home Assistant intent skill actor.
//!
//! Entry point for the assistant host: intents are sent as [`CallIntent`] messages and always
//! answered with an [`IntentResponse`]. Errors never leave the actor.

use actix::{Actor, Context, Handler, MessageResult, ResponseFuture};
use log::{debug, error, info};

use crate::client::HomeAssistantClient;
use crate::configuration::HomeAssistantSettings;
use crate::errors::ServiceError;
use crate::intent::{Intent, intent_descriptors};
use crate::messages::{CallIntent, IntentResponse, ListIntents};

pub struct HomeAssistantSkill {
    client: HomeAssistantClient,
}

impl HomeAssistantSkill {
    pub fn new(settings: &HomeAssistantSettings) -> Result<Self, ServiceError> {
        Ok(Self {
            client: HomeAssistantClient::new(settings)?,
        })
    }

    pub fn client(&self) -> &HomeAssistantClient {
        &self.client
    }
}

impl Actor for HomeAssistantSkill {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] HA skill started", self.client.id());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!("[{}] HA skill stopped", self.client.id());
    }
}

impl Handler<CallIntent> for HomeAssistantSkill {
    type Result = ResponseFuture<IntentResponse>;

    fn handle(&mut self, msg: CallIntent, _ctx: &mut Self::Context) -> Self::Result {
        let client = self.client.clone();

        Box::pin(async move {
            let intent = match Intent::from_request(&msg.name, msg.params.as_ref()) {
                Ok(intent) => intent,
                Err(e) => {
                    error!("[{}] Invalid intent {}: {e}", client.id(), msg.name);
                    return IntentResponse::failed(&e);
                }
            };

            info!("[{}] Intent: {intent:?}", client.id());
            match client.execute(&intent).await {
                Ok(response) => {
                    debug!("[{}] {} -> {response:?}", client.id(), intent.name());
                    response
                }
                Err(e) => {
                    error!("[{}] Intent {} failed: {e}", client.id(), intent.name());
                    IntentResponse::failed(&e)
                }
            }
        })
    }
}

impl Handler<ListIntents> for HomeAssistantSkill {
    type Result = MessageResult<ListIntents>;

    fn handle(&mut self, _msg: ListIntents, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(intent_descriptors())
    }
}
