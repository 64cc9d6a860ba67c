// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

pub mod client;
pub mod configuration;
pub mod errors;
pub mod intent;
pub mod messages;
pub mod skill;
pub mod util;

mod startup;

pub use messages::*;
pub use skill::HomeAssistantSkill;
pub use startup::*;
