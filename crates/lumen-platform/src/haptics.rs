use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use crate::process;
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Semantic feedback intents. Callers say what happened, sinks decide how it feels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
    Selection,
    Success,
    Warning,
    Error,
}

/// One vibration burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub duration: Duration,
    pub intensity: f64,
}

impl Pulse {
    const fn new(millis: u64, intensity: f64) -> Self {
        Self {
            duration: Duration::from_millis(millis),
            intensity,
        }
    }
}

/// Gap left between the bursts of a notification pattern.
pub const PATTERN_GAP: Duration = Duration::from_millis(60);

impl HapticKind {
    /// Vibration pattern for this intent. Impacts are a single burst, notifications
    /// are two or three.
    pub fn pattern(self) -> &'static [Pulse] {
        const LIGHT: &[Pulse] = &[Pulse::new(10, 0.3)];
        const MEDIUM: &[Pulse] = &[Pulse::new(15, 0.6)];
        const HEAVY: &[Pulse] = &[Pulse::new(20, 1.0)];
        const SELECTION: &[Pulse] = &[Pulse::new(5, 0.4)];
        const SUCCESS: &[Pulse] = &[Pulse::new(15, 0.5), Pulse::new(25, 0.8)];
        const WARNING: &[Pulse] = &[Pulse::new(25, 0.8), Pulse::new(15, 0.5)];
        const ERROR: &[Pulse] = &[
            Pulse::new(20, 0.9),
            Pulse::new(20, 0.9),
            Pulse::new(30, 1.0),
        ];

        match self {
            Self::Light => LIGHT,
            Self::Medium => MEDIUM,
            Self::Heavy => HEAVY,
            Self::Selection => SELECTION,
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::Error => ERROR,
        }
    }

    pub fn total_duration(self) -> Duration {
        let pattern = self.pattern();
        let pulses: Duration = pattern.iter().map(|p| p.duration).sum();
        pulses + PATTERN_GAP * (pattern.len() as u32 - 1)
    }
}

#[derive(Debug, Error)]
pub enum HapticError {
    #[error("haptic command is empty")]
    EmptyCommand,
    #[error("haptic command could not be parsed: {0}")]
    Parse(#[from] shell_words::ParseError),
    #[error("failed to spawn haptic command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Anything able to turn a [`HapticKind`] into physical feedback.
pub trait HapticSink {
    fn pulse(&self, kind: HapticKind) -> Result<(), HapticError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticSink for NoopHaptics {
    fn pulse(&self, _kind: HapticKind) -> Result<(), HapticError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl HapticSink for LogHaptics {
    fn pulse(&self, kind: HapticKind) -> Result<(), HapticError> {
        log::debug!(
            "haptic {} ({} pulses, {:?})",
            kind,
            kind.pattern().len(),
            kind.total_duration()
        );
        Ok(())
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct HapticCommand(String);

crate::impl_string_newtype!(HapticCommand);

/// Forwards pulses to an external vibration helper (e.g. `fbcli`). The helper receives
/// the intent and the summed pattern through the environment.
#[derive(Debug, Clone)]
pub struct CommandHaptics {
    program: String,
    args: Vec<String>,
}

impl CommandHaptics {
    pub fn new(command: &HapticCommand) -> Result<Self, HapticError> {
        let mut words = shell_words::split(command)?.into_iter();
        let program = words.next().ok_or(HapticError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    fn env(kind: HapticKind) -> [(&'static str, String); 3] {
        let peak = kind
            .pattern()
            .iter()
            .map(|p| p.intensity)
            .fold(0.0, f64::max);
        [
            ("LUMEN_HAPTIC_KIND", kind.to_string()),
            (
                "LUMEN_HAPTIC_MS",
                kind.total_duration().as_millis().to_string(),
            ),
            ("LUMEN_HAPTIC_INTENSITY", format!("{peak:.2}")),
        ]
    }
}

impl CommandHaptics {
    fn spawn(
        &self,
        kind: HapticKind,
    ) -> Result<JoinHandle<io::Result<ExitStatus>>, HapticError> {
        let handle = process::spawn_reaped(
            Command::new(&self.program)
                .args(&self.args)
                .envs(Self::env(kind))
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
        )?;
        Ok(handle)
    }
}

impl HapticSink for CommandHaptics {
    fn pulse(&self, kind: HapticKind) -> Result<(), HapticError> {
        self.spawn(kind).map(drop)
    }
}

/// Builds the sink for an optional configured command, falling back to logging when
/// none is set or the command is unusable.
pub fn sink_for(command: Option<&HapticCommand>) -> Box<dyn HapticSink> {
    match command.map(CommandHaptics::new) {
        Some(Ok(sink)) => Box::new(sink),
        Some(Err(e)) => {
            log::error!("Ignoring haptic command: {}", e);
            Box::new(LogHaptics)
        }
        None => Box::new(LogHaptics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;

    #[test]
    fn test_kind_parsing() {
        let cases = vec![
            ("light", HapticKind::Light),
            ("Light", HapticKind::Light),
            ("SELECTION", HapticKind::Selection),
            ("error", HapticKind::Error),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<HapticKind>().unwrap(), expected);
        }
        assert!("buzz".parse::<HapticKind>().is_err());
    }

    #[test]
    fn test_kind_deserialization() {
        let kind: HapticKind = serde_json::from_str("\"Warning\"").unwrap();
        assert_eq!(kind, HapticKind::Warning);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"warning\"");
    }

    #[test]
    fn test_every_pattern_is_bounded() {
        for kind in HapticKind::iter() {
            let pattern = kind.pattern();
            assert!(!pattern.is_empty());
            assert!(pattern.iter().all(|p| (0.0..=1.0).contains(&p.intensity)));
        }
        assert_eq!(
            HapticKind::Error.total_duration(),
            Duration::from_millis(70) + PATTERN_GAP * 2
        );
        assert_eq!(HapticKind::Light.total_duration(), Duration::from_millis(10));
    }

    #[test]
    fn test_command_parsing() {
        assert!(matches!(
            CommandHaptics::new(&HapticCommand::from("   ")),
            Err(HapticError::EmptyCommand)
        ));
        assert!(matches!(
            CommandHaptics::new(&HapticCommand::from("fbcli \"unterminated")),
            Err(HapticError::Parse(_))
        ));

        let sink = CommandHaptics::new(&HapticCommand::from("fbcli -E 'button pressed'")).unwrap();
        assert_eq!(sink.program, "fbcli");
        assert_eq!(sink.args, vec!["-E", "button pressed"]);
    }

    #[test]
    fn test_command_env() {
        let env = CommandHaptics::env(HapticKind::Heavy);
        assert_eq!(env[0].1, "heavy");
        assert_eq!(env[1].1, "20");
        assert_eq!(env[2].1, "1.00");
    }

    #[test]
    fn test_helper_receives_pulse_environment() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("pulse.txt");
        let command = HapticCommand::new(format!(
            "sh -c 'printf \"%s %s %s\" \"$LUMEN_HAPTIC_KIND\" \"$LUMEN_HAPTIC_MS\" \"$LUMEN_HAPTIC_INTENSITY\" > \"$0\"' {}",
            shell_words::quote(&out.to_string_lossy())
        ));
        let sink = CommandHaptics::new(&command).unwrap();

        let status = sink.spawn(HapticKind::Error).unwrap().join().unwrap().unwrap();
        assert!(status.success());
        assert_eq!(fs_err::read_to_string(&out).unwrap(), "error 190 1.00");
    }

    #[test]
    fn test_in_process_sinks_never_fail() {
        for kind in HapticKind::iter() {
            assert!(NoopHaptics.pulse(kind).is_ok());
            assert!(LogHaptics.pulse(kind).is_ok());
        }
    }

    #[test]
    fn test_missing_helper_is_an_error() {
        let sink = CommandHaptics::new(&HapticCommand::from("/nonexistent/lumen-vibrate")).unwrap();
        assert!(matches!(
            sink.pulse(HapticKind::Light),
            Err(HapticError::Spawn(_))
        ));
    }
}
