// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::ffi::OsStr;
use std::str::FromStr;

/// Retrieves a boolean value from the given environment variable.
///
/// The following string values are considered true: `true` or `1`.
///
/// Returns `false` if the variable is not defined or contains an invalid value.
pub fn bool_from_env<K: AsRef<OsStr>>(key: K) -> bool {
    env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or_default()
}

/// Request & response body tracing mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MsgTracing {
    #[default]
    None,
    /// Response bodies only
    In,
    /// Request bodies only
    Out,
    All,
}

impl MsgTracing {
    /// Retrieves the tracing mode from the given environment variable.
    ///
    /// Returns [`MsgTracing::None`] if the variable is not defined or contains an invalid value.
    pub fn from_env<K: AsRef<OsStr>>(key: K) -> Self {
        env::var(key)
            .ok()
            .and_then(|v| MsgTracing::from_str(&v).ok())
            .unwrap_or_default()
    }

    pub fn incoming(&self) -> bool {
        matches!(self, MsgTracing::In | MsgTracing::All)
    }

    pub fn outgoing(&self) -> bool {
        matches!(self, MsgTracing::Out | MsgTracing::All)
    }
}
