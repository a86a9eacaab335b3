// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI defaults loaded from environment variables.

/// Defaults for values not given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Scaffold width in centimeters.
    pub scaffold_width_cm: f64,
    /// Eave height difference in centimeters.
    pub eave_difference_cm: f64,
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            scaffold_width_cm: var("FACADE_SCAFFOLD_WIDTH_CM")
                .unwrap_or_else(|| "70".into())
                .parse()
                .unwrap_or(70.0),
            eave_difference_cm: var("FACADE_EAVE_DIFFERENCE_CM")
                .unwrap_or_else(|| "0".into())
                .parse()
                .unwrap_or(0.0),
            pretty_json: var("FACADE_PRETTY_JSON")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
