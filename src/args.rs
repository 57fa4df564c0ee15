//! Command-line argument parsing for the haptic-rumble CLI.

use std::env;
use std::fmt;
use std::path::PathBuf;

use haptic_rumble::CrossfadeMode;

/// CLI subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print clip statistics
    Info,
    /// Bake keyframes and optionally export CSV
    Bake,
    /// Drive a recording actuator and print the command stream
    Simulate,
}

impl Command {
    /// Parse a subcommand name.
    pub fn from_name(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "info" => Some(Command::Info),
            "bake" => Some(Command::Bake),
            "simulate" | "sim" => Some(Command::Simulate),
            _ => None,
        }
    }

    /// Canonical subcommand name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Info => "info",
            Command::Bake => "bake",
            Command::Simulate => "simulate",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed command-line arguments.
#[derive(Debug)]
pub struct CliArgs {
    /// Selected subcommand
    pub command: Option<Command>,
    /// `.haptic` clip path
    pub file_path: Option<String>,
    /// Optional JSON engine configuration
    pub config_path: Option<String>,
    /// Keyframe rate override (Hz)
    pub rate: Option<f32>,
    /// Crossfade mode override
    pub mode: Option<CrossfadeMode>,
    /// CSV output path for `bake`
    pub out: Option<PathBuf>,
    /// Export 16-bit wireless commands instead of float keyframes
    pub commands: bool,
    /// Loop during `simulate`
    pub looping: bool,
    /// Force keyframed playback during `simulate`
    pub keyframed: bool,
    /// Host tick rate for `simulate`
    pub fps: f32,
    /// Simulated wall time; defaults to the clip duration
    pub seconds: Option<f32>,
    /// Whether help was requested
    pub show_help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            command: None,
            file_path: None,
            config_path: None,
            rate: None,
            mode: None,
            out: None,
            commands: false,
            looping: false,
            keyframed: false,
            fps: 60.0,
            seconds: None,
            show_help: false,
        }
    }
}

impl CliArgs {
    /// Parse arguments from the command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (program name excluded).
    pub fn parse_from<I: IntoIterator<Item = String>>(argv: I) -> Self {
        let mut args = Self::default();
        let mut iter = argv.into_iter();

        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if arg.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str, args: &mut CliArgs| {
                let value = inline.clone().or_else(|| iter.next());
                if value.is_none() {
                    eprintln!("{name} requires an argument");
                    args.show_help = true;
                }
                value
            };

            match flag.as_str() {
                "--help" | "-h" => args.show_help = true,
                "--loop" => args.looping = true,
                "--keyframed" => args.keyframed = true,
                "--commands" => args.commands = true,
                "--rate" => {
                    if let Some(v) = value("--rate", &mut args) {
                        args.rate = parse_positive("--rate", &v, &mut args);
                    }
                }
                "--fps" => {
                    if let Some(v) = value("--fps", &mut args) {
                        if let Some(fps) = parse_positive("--fps", &v, &mut args) {
                            args.fps = fps;
                        }
                    }
                }
                "--seconds" => {
                    if let Some(v) = value("--seconds", &mut args) {
                        args.seconds = parse_positive("--seconds", &v, &mut args);
                    }
                }
                "--mode" => {
                    if let Some(v) = value("--mode", &mut args) {
                        args.mode = CrossfadeMode::from_name(&v);
                        if args.mode.is_none() {
                            eprintln!("Unknown crossfade mode: {}", v);
                            args.show_help = true;
                        }
                    }
                }
                "--out" => {
                    if let Some(v) = value("--out", &mut args) {
                        args.out = Some(PathBuf::from(v));
                    }
                }
                "--config" => {
                    if let Some(v) = value("--config", &mut args) {
                        args.config_path = Some(v);
                    }
                }
                _ if flag.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    args.show_help = true;
                }
                _ if args.command.is_none() => {
                    args.command = Command::from_name(&arg);
                    if args.command.is_none() {
                        eprintln!("Unknown command: {}", arg);
                        args.show_help = true;
                    }
                }
                _ => args.file_path = Some(arg),
            }
        }

        args
    }
}

fn parse_positive(flag: &str, value: &str, args: &mut CliArgs) -> Option<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            eprintln!("{flag} expects a positive number, got {value}");
            args.show_help = true;
            None
        }
    }
}

/// Print help text to stderr.
pub fn print_help() {
    eprintln!(
        "Usage:\n  haptic-rumble <command> <file.haptic> [flags]\n\n\
         Commands:\n\
         \x20 info                 Show duration, breakpoint and emphasis counts\n\
         \x20 bake                 Render emphasis and bake keyframes\n\
         \x20 simulate             Play the clip on a simulated actuator\n\n\
         Flags:\n\
         \x20 --config <file>      JSON engine configuration\n\
         \x20 --rate <hz>          Keyframe rate (default 25)\n\
         \x20 --mode <mode>        Crossfade: linear | equal-power (default)\n\
         \x20 --out <file.csv>     Write baked keyframes as CSV (bake)\n\
         \x20 --commands           Export 16-bit wireless commands (bake)\n\
         \x20 --loop               Loop playback (simulate)\n\
         \x20 --keyframed          Simulate a wireless actuator (simulate)\n\
         \x20 --fps <n>            Host tick rate (simulate, default 60)\n\
         \x20 --seconds <s>        Simulated time (simulate, default clip length)\n\
         \x20 -h, --help           Show this help\n\n\
         Examples:\n\
         \x20 haptic-rumble info kick.haptic\n\
         \x20 haptic-rumble bake kick.haptic --rate 25 --out kick.csv\n\
         \x20 haptic-rumble simulate kick.haptic --keyframed --fps 120\n"
    );
}
