//! Engine settings loaded from `engine.toml`.
//! Every section and key is optional; missing values fall back to defaults.

use std::path::Path;

use serde::Deserialize;

use crate::games::hearts::HeartsSettings;

/// `[hearts]` section: defaults for matches that do not override them.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HeartsSection {
    pub target_score: Option<u32>,
    pub moon_shot_penalty: Option<u32>,
}

impl HeartsSection {
    pub fn to_settings(&self) -> HeartsSettings {
        let d = HeartsSettings::default();
        HeartsSettings {
            target_score: self.target_score.unwrap_or(d.target_score),
            moon_shot_penalty: self.moon_shot_penalty.unwrap_or(d.moon_shot_penalty),
        }
    }
}

/// `[simulation]` section, read by the `simulate` tool.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSection {
    #[serde(default = "default_max_moves")]
    pub max_moves: usize,
}

fn default_max_moves() -> usize {
    2000
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            max_moves: default_max_moves(),
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub hearts: HeartsSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

impl Settings {
    /// Reject values no engine can play with.
    pub fn validate(&self) -> Result<(), String> {
        let hearts = self.hearts.to_settings();
        if hearts.target_score == 0 {
            return Err("hearts.target_score must be positive".into());
        }
        if self.simulation.max_moves == 0 {
            return Err("simulation.max_moves must be positive".into());
        }
        Ok(())
    }
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let settings: Settings =
        toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    settings
        .validate()
        .map_err(|e| format!("Invalid settings in {}: {}", path.display(), e))?;
    Ok(settings)
}

/// Try to load settings from well-known paths, returning defaults if none found.
pub fn load_default_settings() -> Settings {
    let candidates = [
        "engine.toml",
        "../engine.toml",
        "/etc/tabletop/engine.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), "loaded engine settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load engine settings");
                }
            }
        }
    }
    tracing::info!("no engine.toml found, using built-in defaults");
    Settings::default()
}
