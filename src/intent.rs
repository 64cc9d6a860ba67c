// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Intent catalog of the skill.
//!
//! Every supported intent is a variant of the closed [`IntentName`] enumeration. The assistant
//! host registers the intents with the [`IntentDescriptor`] list and dispatches a call by
//! name: [`Intent::from_request`] maps the name and the named parameters to a typed [`Intent`].

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use strum::{EnumMessage, IntoEnumIterator, VariantNames};

use crate::errors::ServiceError;

/// Host visible intent names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumMessage,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantNames,
)]
pub enum IntentName {
    // misspelled name is registered in existing assistant setups
    #[strum(
        serialize = "get_all_entites",
        message = "Lists the identifiers of all Home Assistant entities"
    )]
    GetEntities,
    #[strum(serialize = "turn_on_device", message = "Turns on a Home Assistant device")]
    TurnOn,
    #[strum(serialize = "turn_off_device", message = "Turns off a Home Assistant device")]
    TurnOff,
    #[strum(serialize = "open_device", message = "Opens a Home Assistant cover")]
    Open,
    #[strum(serialize = "close_device", message = "Closes a Home Assistant cover")]
    Close,
    #[strum(serialize = "stop_device", message = "Stops a moving Home Assistant cover")]
    Stop,
    #[strum(serialize = "toggle_device", message = "Toggles a Home Assistant device")]
    Toggle,
    #[strum(
        serialize = "read_sensor_or_device_state",
        message = "Reads the state of a Home Assistant sensor or device"
    )]
    ReadState,
    #[strum(
        serialize = "set_light_brightness",
        message = "Sets a Home Assistant light's brightness"
    )]
    SetBrightness,
    #[strum(
        serialize = "increase_light_brightness",
        message = "Increases a Home Assistant light's brightness"
    )]
    IncreaseBrightness,
    #[strum(
        serialize = "decrease_light_brightness",
        message = "Decreases a Home Assistant light's brightness"
    )]
    DecreaseBrightness,
    #[strum(
        serialize = "trigger_automation",
        message = "Triggers a Home Assistant automation"
    )]
    TriggerAutomation,
    #[strum(
        serialize = "set_climate",
        message = "Sets the target temperature of a Home Assistant thermostat"
    )]
    SetClimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
}

/// Named intent parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntentParam {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

const fn param(name: &'static str, kind: ParamKind, description: &'static str) -> IntentParam {
    IntentParam {
        name,
        kind,
        description,
    }
}

const SWITCHABLE_ENTITY: [IntentParam; 1] = [param(
    "entity",
    ParamKind::String,
    "The device, its domain must support the service. Ex. light.kitchen",
)];
const COVER_ENTITY: [IntentParam; 1] = [param(
    "entity",
    ParamKind::String,
    "The device, must be of domain cover. Ex. cover.garage",
)];
const SENSOR: [IntentParam; 1] = [param(
    "sensor_name",
    ParamKind::String,
    "The sensor or device you want to read",
)];
const LIGHT: [IntentParam; 1] = [param(
    "light",
    ParamKind::String,
    "The light you want to change",
)];
const LIGHT_BRIGHTNESS: [IntentParam; 2] = [
    LIGHT[0],
    param(
        "brightness",
        ParamKind::Number,
        "The brightness in percent, 0 to 100",
    ),
];
const AUTOMATION: [IntentParam; 1] = [param(
    "automation",
    ParamKind::String,
    "The automation id you want to trigger",
)];
const THERMOSTAT: [IntentParam; 2] = [
    param("entity", ParamKind::String, "The thermostat. Ex. climate.living_room"),
    param(
        "value",
        ParamKind::Number,
        "The temperature you want to set the thermostat to",
    ),
];

impl IntentName {
    /// Parameters of the intent. All parameters are required.
    pub fn params(&self) -> &'static [IntentParam] {
        match self {
            IntentName::GetEntities => &[],
            IntentName::TurnOn | IntentName::TurnOff | IntentName::Toggle => &SWITCHABLE_ENTITY,
            IntentName::Open | IntentName::Close | IntentName::Stop => &COVER_ENTITY,
            IntentName::ReadState => &SENSOR,
            IntentName::SetBrightness => &LIGHT_BRIGHTNESS,
            IntentName::IncreaseBrightness | IntentName::DecreaseBrightness => &LIGHT,
            IntentName::TriggerAutomation => &AUTOMATION,
            IntentName::SetClimate => &THERMOSTAT,
        }
    }

    pub fn descriptor(&self) -> IntentDescriptor {
        IntentDescriptor {
            name: self.into(),
            description: self.get_message().unwrap_or_default(),
            params: self.params(),
        }
    }
}

/// Registration information of an intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [IntentParam],
}

/// Descriptors of all supported intents.
pub fn intent_descriptors() -> Vec<IntentDescriptor> {
    IntentName::iter().map(|i| i.descriptor()).collect()
}

/// A typed intent with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    GetEntities,
    TurnOn { entity: String },
    TurnOff { entity: String },
    Open { entity: String },
    Close { entity: String },
    Stop { entity: String },
    Toggle { entity: String },
    ReadState { sensor_name: String },
    SetBrightness { light: String, brightness: f64 },
    IncreaseBrightness { light: String },
    DecreaseBrightness { light: String },
    TriggerAutomation { automation: String },
    SetClimate { entity: String, value: f64 },
}

impl Intent {
    /// Create a typed intent from an intent name and its named parameters.
    ///
    /// A BadRequest error is returned for an unknown name or a missing or invalid parameter.
    pub fn from_request(
        name: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<Self, ServiceError> {
        let name: IntentName = cmd_from_str(name)?;

        let intent = match name {
            IntentName::GetEntities => Intent::GetEntities,
            IntentName::TurnOn => Intent::TurnOn {
                entity: required_str(params, "entity")?,
            },
            IntentName::TurnOff => Intent::TurnOff {
                entity: required_str(params, "entity")?,
            },
            IntentName::Open => Intent::Open {
                entity: required_str(params, "entity")?,
            },
            IntentName::Close => Intent::Close {
                entity: required_str(params, "entity")?,
            },
            IntentName::Stop => Intent::Stop {
                entity: required_str(params, "entity")?,
            },
            IntentName::Toggle => Intent::Toggle {
                entity: required_str(params, "entity")?,
            },
            IntentName::ReadState => Intent::ReadState {
                sensor_name: required_str(params, "sensor_name")?,
            },
            IntentName::SetBrightness => Intent::SetBrightness {
                light: required_str(params, "light")?,
                brightness: required_number(params, "brightness")?,
            },
            IntentName::IncreaseBrightness => Intent::IncreaseBrightness {
                light: required_str(params, "light")?,
            },
            IntentName::DecreaseBrightness => Intent::DecreaseBrightness {
                light: required_str(params, "light")?,
            },
            IntentName::TriggerAutomation => Intent::TriggerAutomation {
                automation: required_str(params, "automation")?,
            },
            IntentName::SetClimate => Intent::SetClimate {
                entity: required_str(params, "entity")?,
                value: required_number(params, "value")?,
            },
        };

        Ok(intent)
    }

    pub fn name(&self) -> IntentName {
        match self {
            Intent::GetEntities => IntentName::GetEntities,
            Intent::TurnOn { .. } => IntentName::TurnOn,
            Intent::TurnOff { .. } => IntentName::TurnOff,
            Intent::Open { .. } => IntentName::Open,
            Intent::Close { .. } => IntentName::Close,
            Intent::Stop { .. } => IntentName::Stop,
            Intent::Toggle { .. } => IntentName::Toggle,
            Intent::ReadState { .. } => IntentName::ReadState,
            Intent::SetBrightness { .. } => IntentName::SetBrightness,
            Intent::IncreaseBrightness { .. } => IntentName::IncreaseBrightness,
            Intent::DecreaseBrightness { .. } => IntentName::DecreaseBrightness,
            Intent::TriggerAutomation { .. } => IntentName::TriggerAutomation,
            Intent::SetClimate { .. } => IntentName::SetClimate,
        }
    }
}

pub fn cmd_from_str<T: FromStr + VariantNames>(cmd: &str) -> Result<T, ServiceError> {
    T::from_str(cmd).map_err(|_| {
        ServiceError::BadRequest(format!(
            "Invalid intent: {cmd}. Valid intents: {}",
            T::VARIANTS.join(",")
        ))
    })
}

/// Get a required parameter from the intent parameters.
///
/// A BadRequest error is returned if `params` is not set or doesn't contain the parameter.
fn get_required_param<'a>(
    params: Option<&'a Map<String, Value>>,
    key: &str,
) -> Result<&'a Value, ServiceError> {
    params
        .ok_or_else(|| ServiceError::BadRequest("Missing params object".into()))?
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ServiceError::BadRequest(format!("Missing params.{key} attribute")))
}

fn required_str(params: Option<&Map<String, Value>>, key: &str) -> Result<String, ServiceError> {
    get_required_param(params, key)?
        .as_str()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ServiceError::BadRequest(format!("Invalid params.{key} attribute: non-empty string expected"))
        })
}

/// Numbers are accepted as JSON numbers or numeric strings, as spoken values often are text.
fn required_number(params: Option<&Map<String, Value>>, key: &str) -> Result<f64, ServiceError> {
    let value = get_required_param(params, key)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).ok_or_else(|| {
        ServiceError::BadRequest(format!(
            "Invalid params.{key} attribute: number expected, got {value}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn parse(name: &str, params: Value) -> Result<Intent, ServiceError> {
        let params = params.as_object().cloned();
        Intent::from_request(name, params.as_ref())
    }

    #[rstest]
    #[case("get_all_entites", IntentName::GetEntities)]
    #[case("turn_on_device", IntentName::TurnOn)]
    #[case("turn_off_device", IntentName::TurnOff)]
    #[case("open_device", IntentName::Open)]
    #[case("close_device", IntentName::Close)]
    #[case("stop_device", IntentName::Stop)]
    #[case("toggle_device", IntentName::Toggle)]
    #[case("read_sensor_or_device_state", IntentName::ReadState)]
    #[case("set_light_brightness", IntentName::SetBrightness)]
    #[case("increase_light_brightness", IntentName::IncreaseBrightness)]
    #[case("decrease_light_brightness", IntentName::DecreaseBrightness)]
    #[case("trigger_automation", IntentName::TriggerAutomation)]
    #[case("set_climate", IntentName::SetClimate)]
    fn intent_names(#[case] name: &str, #[case] expected: IntentName) {
        assert_eq!(Ok(expected), cmd_from_str::<IntentName>(name));
        assert_eq!(name, expected.to_string());
    }

    #[test]
    fn unknown_intent_returns_bad_request_with_valid_names() {
        let result = parse("dim_lights", json!({}));
        match result {
            Err(ServiceError::BadRequest(msg)) => {
                assert!(msg.contains("dim_lights"), "{msg}");
                assert!(msg.contains("set_light_brightness"), "{msg}");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[rstest]
    #[case("turn_on_device", json!({"entity": "light.kitchen"}), Intent::TurnOn { entity: "light.kitchen".into() })]
    #[case("open_device", json!({"entity": " cover.garage "}), Intent::Open { entity: "cover.garage".into() })]
    #[case("read_sensor_or_device_state", json!({"sensor_name": "sensor.temp"}), Intent::ReadState { sensor_name: "sensor.temp".into() })]
    #[case("set_light_brightness", json!({"light": "light.desk", "brightness": 40}), Intent::SetBrightness { light: "light.desk".into(), brightness: 40.0 })]
    #[case("set_light_brightness", json!({"light": "light.desk", "brightness": "72.5"}), Intent::SetBrightness { light: "light.desk".into(), brightness: 72.5 })]
    #[case("decrease_light_brightness", json!({"light": "light.desk"}), Intent::DecreaseBrightness { light: "light.desk".into() })]
    #[case("trigger_automation", json!({"automation": "automation.wake_up"}), Intent::TriggerAutomation { automation: "automation.wake_up".into() })]
    #[case("set_climate", json!({"entity": "climate.office", "value": 21.5}), Intent::SetClimate { entity: "climate.office".into(), value: 21.5 })]
    fn intent_with_params(#[case] name: &str, #[case] params: Value, #[case] expected: Intent) {
        let intent = parse(name, params).expect("valid intent");
        assert_eq!(expected, intent);
        assert_eq!(name, intent.name().to_string());
    }

    #[test]
    fn get_entities_without_params() {
        assert_eq!(
            Ok(Intent::GetEntities),
            Intent::from_request("get_all_entites", None)
        );
    }

    #[rstest]
    #[case("turn_on_device", json!(null))]
    #[case("turn_on_device", json!({}))]
    #[case("turn_on_device", json!({"entity": null}))]
    #[case("turn_on_device", json!({"entity": ""}))]
    #[case("turn_on_device", json!({"entity": 42}))]
    #[case("turn_on_device", json!({"device": "light.kitchen"}))]
    #[case("set_light_brightness", json!({"light": "light.desk"}))]
    #[case("set_light_brightness", json!({"light": "light.desk", "brightness": "bright"}))]
    #[case("set_light_brightness", json!({"light": "light.desk", "brightness": [50]}))]
    #[case("set_climate", json!({"entity": "climate.office", "value": "NaN"}))]
    #[case("set_climate", json!({"value": 20}))]
    fn invalid_params_return_bad_request(#[case] name: &str, #[case] params: Value) {
        let result = parse(name, params);
        assert!(
            matches!(result, Err(ServiceError::BadRequest(_))),
            "Invalid params must return BadRequest, but got: {result:?}"
        );
    }

    #[test]
    fn all_intents_have_descriptors() {
        let descriptors = intent_descriptors();
        assert_eq!(IntentName::VARIANTS.len(), descriptors.len());
        for descriptor in &descriptors {
            assert!(!descriptor.description.is_empty(), "{}", descriptor.name);
        }
    }

    #[test]
    fn descriptor_serialization() {
        let descriptor = IntentName::SetBrightness.descriptor();
        assert_eq!(
            json!({
                "name": "set_light_brightness",
                "description": "Sets a Home Assistant light's brightness",
                "params": [
                    {"name": "light", "kind": "string", "description": "The light you want to change"},
                    {"name": "brightness", "kind": "number", "description": "The brightness in percent, 0 to 100"}
                ]
            }),
            serde_json::to_value(descriptor).unwrap()
        );
    }

    #[test]
    fn descriptor_params_match_parser() {
        // every declared parameter is sufficient to create the intent
        for name in IntentName::iter() {
            let params: Map<String, Value> = name
                .params()
                .iter()
                .map(|p| {
                    let value = match p.kind {
                        ParamKind::String => json!("light.test"),
                        ParamKind::Number => json!(50),
                    };
                    (p.name.to_string(), value)
                })
                .collect();
            let intent = Intent::from_request(&name.to_string(), Some(&params));
            assert_eq!(Ok(name), intent.map(|i| i.name()), "{name}");
        }
    }
}
