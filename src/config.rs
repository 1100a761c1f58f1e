//! Machine configuration.

use std::fmt;
use std::path::PathBuf;

use log::LevelFilter;

/// What the driving loop does when it meets an undocumented opcode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IllegalOpcodePolicy {
    /// Stop `run` and report the opcode.
    #[default]
    Halt,
    /// Log a warning, step over the byte and keep going.
    Skip,
}

/// Knobs for a `Machine` and for the demo binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum number of instructions one `run` call attempts.
    pub instruction_budget: u64,
    pub illegal_opcode: IllegalOpcodePolicy,
    /// Instructions shown by a disassembly window.
    pub lookahead: usize,
    /// Level for the binary's logger. The library itself never installs one.
    pub log_level: LevelFilter,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            instruction_budget: 10_000,
            illegal_opcode: IllegalOpcodePolicy::Halt,
            lookahead: 8,
            log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Usage,
    InvalidValue { what: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage => write!(
                f,
                "usage: nes6502 [--skip-illegal] [--log <level>] [--lookahead <n>] <rom.nes> [instructions]"
            ),
            Self::InvalidValue { what, value } => write!(f, "invalid value {value:?} for {what}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MachineConfig {
    /// Parse command-line arguments (without the program name).
    ///
    /// Returns the ROM path and the configuration.
    pub fn from_args<I>(args: I) -> Result<(PathBuf, Self), ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--skip-illegal" => config.illegal_opcode = IllegalOpcodePolicy::Skip,
                "--log" => {
                    let value = args.next().ok_or(ConfigError::Usage)?;
                    config.log_level = value.parse().map_err(|_| ConfigError::InvalidValue {
                        what: "--log",
                        value: value.clone(),
                    })?;
                }
                "--lookahead" => {
                    let value = args.next().ok_or(ConfigError::Usage)?;
                    config.lookahead = parse_number("--lookahead", &value)?;
                }
                "-h" | "--help" => return Err(ConfigError::Usage),
                _ if arg.starts_with("--") => return Err(ConfigError::Usage),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let rom = positional
            .next()
            .map(PathBuf::from)
            .ok_or(ConfigError::Usage)?;
        if let Some(budget) = positional.next() {
            config.instruction_budget = parse_number("instructions", &budget)?;
        }
        if positional.next().is_some() {
            return Err(ConfigError::Usage);
        }
        Ok((rom, config))
    }
}

fn parse_number<T: std::str::FromStr>(what: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        what,
        value: value.to_string(),
    })
}
