// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Command line runner: executes a single intent against a Home Assistant server.

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use actix::Actor;
use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use hass_intent_skill::configuration::{Settings, default_config_file, get_configuration};
use hass_intent_skill::{APP_VERSION, CallIntent, HomeAssistantSkill, ListIntents, built_info};
use log::{error, info};
use serde_json::{Map, Value};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let args = Command::new(built_info::PKG_NAME)
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Home Assistant intent skill")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .help("Home Assistant server address (overrides configuration)"),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .help("Home Assistant long lived access token (overrides configuration)"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .action(ArgAction::SetTrue)
                .help("Print the supported intents"),
        )
        .arg(
            Arg::new("intent")
                .value_name("INTENT")
                .required_unless_present("list")
                .help("Intent name, e.g. turn_on_device"),
        )
        .arg(
            Arg::new("params")
                .value_name("PARAMS")
                .help(r#"Intent parameters as JSON object, e.g. '{"entity": "light.kitchen"}'"#),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = load_cfg(&args)?;
    let skill = HomeAssistantSkill::new(&cfg.hass)?.start();

    if args.get_flag("list") {
        let intents = skill.send(ListIntents::default()).await?;
        println!("{}", serde_json::to_string_pretty(&intents)?);
        return Ok(());
    }

    let name = args
        .get_one::<String>("intent")
        .ok_or_else(|| anyhow!("Missing intent name"))?;
    let params = args
        .get_one::<String>("params")
        .map(String::as_str)
        .map(parse_params)
        .transpose()?;

    info!("Calling intent {name}");
    let response = skill.send(CallIntent::new(name.clone(), params)).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        error!("Intent {name} was not successful");
        std::process::exit(1);
    }

    Ok(())
}

fn load_cfg(args: &ArgMatches) -> anyhow::Result<Settings> {
    let cfg_file = default_config_file(args.get_one::<String>("config").map(String::as_str));
    let mut cfg = get_configuration(cfg_file).context("Failed to read configuration")?;

    if let Some(url) = args.get_one::<String>("url") {
        cfg.hass.set_url(url);
    }
    if let Some(token) = args.get_one::<String>("token") {
        cfg.hass.set_token(token);
    }
    info!("Configuration: {}", cfg.hass);

    Ok(cfg)
}

fn parse_params(params: &str) -> anyhow::Result<Map<String, Value>> {
    serde_json::from_str(params)
        .with_context(|| format!("Intent parameters must be a JSON object: {params}"))
}
