use crate::anim::{Breathing, Easing, Spring, SpringError};
use crate::events::AppEvent;
use crate::gui::slider::{SliderError, ValueRange};
use async_channel::Sender;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use lumen_platform::haptics::HapticCommand;
use lumen_platform::icon::IconName;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SatelliteId(String);

lumen_platform::impl_string_newtype!(SatelliteId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct EffectId(String);

lumen_platform::impl_string_newtype!(EffectId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ExecCommand(String);

lumen_platform::impl_string_newtype!(ExecCommand);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 196.0,
            damping: 28.0,
            mass: 1.0,
        }
    }
}

impl SpringConfig {
    pub fn spring(&self) -> Result<Spring, SpringError> {
        Spring::new(self.stiffness, self.damping, self.mass)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Angle of the first satellite in degrees, clockwise from the positive x axis.
    pub start_angle: f64,
    pub orbital_distance: f64,
    pub base_delay_ms: u64,
    pub stagger_ms: u64,
    /// Curve for the centre element's fade and scale in.
    pub center_easing: Easing,
    pub spring: SpringConfig,
    pub breathing_amplitude: f64,
    pub breathing_period_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            start_angle: -90.0,
            orbital_distance: 120.0,
            base_delay_ms: 150,
            stagger_ms: 70,
            center_easing: Easing::CubicOut,
            spring: SpringConfig::default(),
            breathing_amplitude: 0.04,
            breathing_period_ms: 2400,
        }
    }
}

impl MenuConfig {
    pub fn start_angle_radians(&self) -> f64 {
        self.start_angle.to_radians()
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn breathing(&self) -> Breathing {
        Breathing {
            amplitude: self.breathing_amplitude,
            period: Duration::from_millis(self.breathing_period_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SatelliteConfig {
    pub id: SatelliteId,
    pub label: String,
    pub icon: IconName,
    #[serde(default)]
    pub exec: Option<ExecCommand>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EffectConfig {
    pub id: EffectId,
    pub label: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub step: Option<f64>,
    pub initial: f64,
}

impl EffectConfig {
    pub fn range(&self) -> Result<ValueRange, SliderError> {
        ValueRange::new(self.min, self.max, self.step)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct HapticsConfig {
    #[serde(default)]
    pub command: Option<HapticCommand>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Forces reduced motion on or off; unset follows the desktop's animation setting.
    pub reduced_motion: Option<bool>,
    pub haptics: HapticsConfig,
    pub menu: MenuConfig,
    pub satellites: Vec<SatelliteConfig>,
    pub effects: Vec<EffectConfig>,
}

fn satellite(id: &str, label: &str, icon: &str) -> SatelliteConfig {
    SatelliteConfig {
        id: SatelliteId::from(id),
        label: label.to_string(),
        icon: IconName::from(icon),
        exec: None,
    }
}

fn effect(id: &str, label: &str, range: (f64, f64), step: f64, initial: f64) -> EffectConfig {
    EffectConfig {
        id: EffectId::from(id),
        label: label.to_string(),
        min: range.0,
        max: range.1,
        step: Some(step),
        initial,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reduced_motion: None,
            haptics: HapticsConfig::default(),
            menu: MenuConfig::default(),
            satellites: vec![
                satellite("capture", "Capture", "camera-photo-symbolic"),
                satellite("library", "Library", "image-x-generic-symbolic"),
                satellite("adjust", "Adjust", "preferences-color-symbolic"),
                satellite("filters", "Filters", "applications-graphics-symbolic"),
                satellite("share", "Share", "emblem-shared-symbolic"),
            ],
            effects: vec![
                effect("brightness", "Brightness", (-1.0, 1.0), 0.05, 0.0),
                effect("contrast", "Contrast", (0.5, 3.0), 0.1, 1.0),
                effect("saturation", "Saturation", (0.0, 2.0), 0.1, 1.0),
                effect("blur", "Blur", (0.0, 20.0), 1.0, 0.0),
            ],
        }
    }
}

impl Config {
    pub fn reduced_motion(&self, system_reduced_motion: bool) -> bool {
        self.reduced_motion.unwrap_or(system_reduced_motion)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.menu.spring.spring()?;

        let mut seen = HashSet::new();
        for sat in &self.satellites {
            if sat.id.trim().is_empty() {
                return Err(ConfigError::EmptySatelliteId);
            }
            if !seen.insert(&sat.id) {
                return Err(ConfigError::DuplicateSatellite(sat.id.clone()));
            }
        }

        for effect in &self.effects {
            effect.range().map_err(|source| ConfigError::Effect {
                id: effect.id.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid menu spring: {0}")]
    Spring(#[from] SpringError),
    #[error("Satellite ids must not be empty")]
    EmptySatelliteId,
    #[error("Satellite '{0}' is defined twice")]
    DuplicateSatellite(SatelliteId),
    #[error("Effect '{id}' has an invalid range: {source}")]
    Effect {
        id: EffectId,
        #[source]
        source: SliderError,
    },
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "lumen", "lumen").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("LUMEN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    finish(
        config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(environment()),
    )
}

/// Parses a TOML document on its own, without the config file or environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    finish(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Falling back to built-in configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(PathBuf::from) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_matches_builtin_defaults() {
        assert_eq!(parse_config(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_menu_section() {
        let config = parse_config(
            r#"
            reduced_motion = true

            [menu]
            stagger_ms = 20
            center_easing = "Exponential-Out"

            [menu.spring]
            damping = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.reduced_motion, Some(true));
        assert!(config.reduced_motion(false));
        assert_eq!(config.menu.stagger(), Duration::from_millis(20));
        assert_eq!(config.menu.base_delay_ms, 150);
        assert_eq!(config.menu.center_easing, Easing::ExponentialOut);
        assert_eq!(config.menu.spring.damping, 10.0);
        assert_eq!(config.menu.spring.stiffness, 196.0);
        assert_eq!(config.satellites.len(), 5);
    }

    #[test]
    fn test_satellites_and_effects() {
        let config = parse_config(
            r#"
            [haptics]
            command = "fbcli -E button-pressed"

            [[satellites]]
            id = "crop"
            label = "Crop"
            icon = "✂"
            exec = "gimp"

            [[effects]]
            id = "exposure"
            label = "Exposure"
            min = -2.0
            max = 2.0
            initial = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.satellites.len(), 1);
        assert_eq!(config.satellites[0].exec, Some(ExecCommand::from("gimp")));
        assert_eq!(config.effects[0].step, None);
        assert_eq!(
            config.haptics.command,
            Some(HapticCommand::from("fbcli -E button-pressed"))
        );
        assert!(!config.reduced_motion(false));
        assert!(config.reduced_motion(true));
    }

    #[test]
    fn test_validation_errors() {
        let duplicate = r#"
            [[satellites]]
            id = "a"
            label = "A"
            icon = "a"
            [[satellites]]
            id = "a"
            label = "Again"
            icon = "b"
        "#;
        assert!(matches!(
            parse_config(duplicate),
            Err(ConfigError::DuplicateSatellite(id)) if id.as_str() == "a"
        ));

        let empty_id = r#"
            [[satellites]]
            id = " "
            label = "A"
            icon = "a"
        "#;
        assert!(matches!(
            parse_config(empty_id),
            Err(ConfigError::EmptySatelliteId)
        ));

        let zero_step = r#"
            [[effects]]
            id = "blur"
            label = "Blur"
            min = 0.0
            max = 10.0
            step = 0.0
            initial = 0.0
        "#;
        assert!(matches!(
            parse_config(zero_step),
            Err(ConfigError::Effect {
                source: SliderError::InvalidStep(_),
                ..
            })
        ));

        let bad_spring = "[menu.spring]\nstiffness = 0.0\n";
        assert!(matches!(
            parse_config(bad_spring),
            Err(ConfigError::Spring(SpringError::Stiffness(_)))
        ));
    }

    #[test]
    fn test_satellite_deserialization() {
        let json = r#"{"id": "share", "label": "Share", "icon": "emblem-shared-symbolic"}"#;
        let sat: SatelliteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(sat.id, SatelliteId::from("share"));
        assert_eq!(sat.exec, None);
    }
}
