use std::{fs, path::Path};

use color_eyre::eyre::{self, WrapErr};
use serde::Deserialize;
use starchart::viewmode::ViewModeId;
use tracing::warn;

use crate::session::SystemSession;

const CONFIG_PATH: &str = "starchart.toml";

/// Optional viewer configuration, read from `starchart.toml` next to
/// the executable. Every field has a sensible default, so a missing
/// file is not an error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub default_mode: Option<String>,
    pub time_multiplier: Option<f64>,
    pub start_paused: Option<bool>,
}

impl ViewerConfig {
    pub fn load() -> eyre::Result<Self> {
        if !Path::new(CONFIG_PATH).exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(CONFIG_PATH)
            .wrap_err_with(|| format!("reading {CONFIG_PATH}"))?;
        toml::from_str(&text).wrap_err_with(|| format!("parsing {CONFIG_PATH}"))
    }

    pub fn apply(&self, session: &mut SystemSession) {
        if let Some(mode) = &self.default_mode {
            let id = ViewModeId::new(mode.as_str());
            if session.modes.config(&id).is_some() {
                session.mode = id;
            } else {
                warn!(mode = %mode, "configured default mode is not registered");
            }
        }
        if let Some(multiplier) = self.time_multiplier {
            session.clock.set_multiplier(multiplier);
        }
        if let Some(paused) = self.start_paused {
            session.clock.set_paused(paused);
        }
    }
}
