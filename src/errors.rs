// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom skill error with conversions from common Rust and 3rd-party errors.

use awc::error::{PayloadError, SendRequestError};
use derive_more::Display;
use log::error;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Invalid configuration: {_0}")]
    ConfigError(String),

    #[display("Home Assistant not available: {_0}")]
    ServiceUnavailable(String),
}

impl std::error::Error for ServiceError {}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{e:?}");
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(e: url::ParseError) -> Self {
        ServiceError::ConfigError(format!("invalid Home Assistant URL: {e}"))
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(e: config::ConfigError) -> Self {
        ServiceError::ConfigError(e.to_string())
    }
}

impl From<SendRequestError> for ServiceError {
    fn from(e: SendRequestError) -> Self {
        match e {
            SendRequestError::Timeout => {
                ServiceError::ServiceUnavailable("request timed out".into())
            }
            SendRequestError::Url(e) => ServiceError::BadRequest(format!("Invalid request URL: {e}")),
            e => ServiceError::ServiceUnavailable(e.to_string()),
        }
    }
}

impl From<PayloadError> for ServiceError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::Overflow => ServiceError::InternalServerError(
                "Response body exceeds the configured hass.max_body_size_kb limit".into(),
            ),
            e => ServiceError::ServiceUnavailable(format!("Error reading response body: {e}")),
        }
    }
}
