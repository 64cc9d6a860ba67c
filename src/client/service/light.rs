// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Light entity specific HA service call logic.
//!
//! Spoken commands use a 0..100 % brightness, Home Assistant lights a 0..255 integer brightness.

use crate::client::HomeAssistantClient;
use crate::client::model::ServiceData;
use crate::errors::ServiceError;
use crate::messages::IntentResponse;
use log::debug;
use serde_json::Value;

/// Brightness change of the increase & decrease operations in percent.
pub const BRIGHTNESS_STEP_PERCENT: f64 = 10.0;
/// Lowest brightness the increase & decrease operations set. Avoids turning off a light.
pub const MIN_STEP_BRIGHTNESS: u8 = 5;
pub const MAX_STEP_BRIGHTNESS: u8 = 255;

/// Clamp a brightness percentage to 0..=100.
///
/// returns: None for NaN
pub fn clamp_percent(percent: f64) -> Option<f64> {
    if percent.is_nan() {
        None
    } else {
        Some(percent.clamp(0.0, 100.0))
    }
}

/// Convert a brightness percentage to a 0..=255 device brightness, rounding down.
///
/// The percentage is clamped to 0..=100 first. NaN is mapped to 0.
pub fn percent_to_brightness(percent: f64) -> u8 {
    let percent = clamp_percent(percent).unwrap_or_default();
    (percent / 100.0 * 255.0).floor() as u8
}

/// Apply a brightness step in device units and clamp the result to
/// `MIN_STEP_BRIGHTNESS..=MAX_STEP_BRIGHTNESS`.
pub fn step_brightness(current: f64, step: i16) -> u8 {
    let value = current + step as f64;
    if value.is_nan() {
        return MIN_STEP_BRIGHTNESS;
    }
    value.clamp(MIN_STEP_BRIGHTNESS as f64, MAX_STEP_BRIGHTNESS as f64) as u8
}

/// Device brightness as integer percentage, rounding down.
fn brightness_to_percent(brightness: u8) -> u8 {
    (brightness as u16 * 100 / 255) as u8
}

/// Step size in device units: 10 % = 25.
fn step_size() -> i16 {
    percent_to_brightness(BRIGHTNESS_STEP_PERCENT) as i16
}

/// Interpret the value returned by reading an entity state as number.
///
/// Accepts JSON numbers and numeric strings.
fn numeric_state(light: &str, state: Option<&Value>) -> Result<f64, ServiceError> {
    let number = match state {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).ok_or_else(|| {
        ServiceError::BadRequest(format!(
            "Current brightness of {light} is not numeric: {}",
            state.unwrap_or(&Value::Null)
        ))
    })
}

impl HomeAssistantClient {
    /// Set the brightness of a light in percent. The value is clamped to 0..=100.
    ///
    /// returns: the clamped requested percentage as text, e.g. `Brightness set to 50`.
    pub async fn set_brightness(
        &self,
        light: &str,
        brightness: f64,
    ) -> Result<IntentResponse, ServiceError> {
        let percent = clamp_percent(brightness).ok_or_else(|| {
            ServiceError::BadRequest(format!("Invalid brightness value for {light}: NaN"))
        })?;
        let value = percent_to_brightness(percent);

        self.call_service(
            "light",
            "turn_on",
            ServiceData::new(light).with("brightness", value),
        )
        .await?;

        Ok(IntentResponse::success(format!(
            "Brightness set to {}",
            percent.trunc() as u8
        )))
    }

    /// Increase the brightness of a light by 10 %, up to the full brightness.
    ///
    /// returns: the resulting percentage as text.
    pub async fn increase_brightness(&self, light: &str) -> Result<IntentResponse, ServiceError> {
        self.change_brightness(light, step_size()).await
    }

    /// Decrease the brightness of a light by 10 %, but not lower than `MIN_STEP_BRIGHTNESS`.
    ///
    /// returns: the resulting percentage as text.
    pub async fn decrease_brightness(&self, light: &str) -> Result<IntentResponse, ServiceError> {
        self.change_brightness(light, -step_size()).await
    }

    /// The current value is the state payload of [`HomeAssistantClient::read_state`], which must
    /// be numeric. The `brightness` attribute of the light is not used.
    async fn change_brightness(
        &self,
        light: &str,
        step: i16,
    ) -> Result<IntentResponse, ServiceError> {
        let current = self.read_state(light).await?;
        let current = numeric_state(light, current.data.as_ref())?;
        let value = step_brightness(current, step);
        debug!("[{}] Brightness of {light}: {current} -> {value}", self.id);

        self.call_service(
            "light",
            "turn_on",
            ServiceData::new(light).with("brightness", value),
        )
        .await?;

        Ok(IntentResponse::success(format!(
            "Brightness set to {}",
            brightness_to_percent(value)
        )))
    }
}
