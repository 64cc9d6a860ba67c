// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! In-process Home Assistant REST API mock server for client tests.
//!
//! Answers configured paths with a fixed body and everything else with HA's plain text 404
//! response. All received requests are recorded.

use std::collections::HashMap;
use std::sync::Mutex;

use actix_web::dev::ServerHandle;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::Value;

use crate::client::HomeAssistantClient;
use crate::configuration::HomeAssistantSettings;

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body must be JSON")
    }
}

struct MockState {
    responses: HashMap<String, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

async fn record(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<MockState>,
) -> HttpResponse {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    match state.responses.get(req.path()) {
        Some(body) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body.clone()),
        None => HttpResponse::NotFound()
            .content_type("text/plain")
            .body("404: Not Found"),
    }
}

pub(crate) struct MockHass {
    port: u16,
    state: web::Data<MockState>,
    handle: ServerHandle,
}

impl MockHass {
    /// Start a mock server on a random local port. Must be called within an actix runtime.
    ///
    /// * `responses`: request path to response body mapping, answered with status 200.
    pub fn start(responses: &[(&str, &str)]) -> Self {
        let state = web::Data::new(MockState {
            responses: responses
                .iter()
                .map(|(path, body)| (path.to_string(), body.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .default_service(web::to(record))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock server");
        let port = server.addrs()[0].port();
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            port,
            state,
            handle,
        }
    }

    pub fn settings(&self) -> HomeAssistantSettings {
        HomeAssistantSettings::new(format!("127.0.0.1:{}", self.port), "secret-token")
    }

    pub fn client(&self) -> HomeAssistantClient {
        HomeAssistantClient::new(&self.settings()).expect("valid mock client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
