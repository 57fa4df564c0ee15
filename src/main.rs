//! haptic-rumble command-line tool.
//!
//! Inspects `.haptic` clips, bakes keyframe tables and simulates playback
//! on an in-memory actuator.

mod args;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;

use args::{CliArgs, Command};
use haptic_rumble::actuator::{DeviceHandle, DeviceId, RecordingActuator};
use haptic_rumble::clip::{self, HapticClip};
use haptic_rumble::keyframe::{export, KeyframeTable};
use haptic_rumble::scheduler::{FrameTick, PlayOptions, PlayRequest, Scheduler};
use haptic_rumble::{Actuator, EngineConfig, RumbleCommand, Transport};

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = CliArgs::parse();
    let (Some(command), Some(path), false) =
        (args.command, args.file_path.as_deref(), args.show_help)
    else {
        args::print_help();
        return Ok(());
    };

    let config = load_config(&args)?;
    let clip = clip::load_file(path).with_context(|| format!("failed to load {path}"))?;

    match command {
        Command::Info => print_info(path, &clip),
        Command::Bake => bake(clip, &config, &args),
        Command::Simulate => simulate(clip, config, &args),
    }
}

fn load_config(args: &CliArgs) -> Result<EngineConfig> {
    let mut config = match &args.config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {path}"))?;
            EngineConfig::from_json_str(&text)
                .with_context(|| format!("invalid config {path}"))?
        }
        None => EngineConfig::default(),
    };
    if let Some(rate) = args.rate {
        config = config.keyframe_rate(rate);
    }
    if let Some(mode) = &args.mode {
        config = config.crossfade(mode.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_info(path: &str, clip: &HapticClip) -> Result<()> {
    let version = clip.version();
    println!("File:        {path}");
    println!(
        "Format:      v{}.{}.{}",
        version.major, version.minor, version.patch
    );
    println!("Duration:    {:.3}s", clip.duration());
    println!("Amplitude:   {} breakpoints", clip.amplitude().len());
    match clip.frequency() {
        Some(env) => println!("Frequency:   {} breakpoints", env.len()),
        None => println!("Frequency:   none (neutral 0.5)"),
    }
    println!("Emphasis:    {}", clip.amplitude().emphasis_count());
    if let Some(editor) = &clip.metadata().editor {
        println!("Editor:      {editor}");
    }
    Ok(())
}

fn bake(clip: HapticClip, config: &EngineConfig, args: &CliArgs) -> Result<()> {
    let clip = clip.prepare(config).context("failed to prepare clip")?;
    let Some(table) = clip.keyframes() else {
        bail!("clip produced no keyframe table");
    };

    info!(
        "baked {} keyframes at {} Hz",
        table.frame_count(),
        table.frame_rate()
    );

    match &args.out {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            write_table(table, config, args.commands, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} frames to {}", table.frame_count(), out.display());
        }
        None => write_table(table, config, args.commands, io::stdout().lock())?,
    }
    Ok(())
}

fn write_table<W: Write>(
    table: &KeyframeTable,
    config: &EngineConfig,
    commands: bool,
    writer: W,
) -> haptic_rumble::Result<()> {
    if commands {
        export::write_commands_csv(table, config.command_duration_ms, writer)
    } else {
        export::write_csv(table, writer)
    }
}

fn simulate(clip: HapticClip, config: EngineConfig, args: &CliArgs) -> Result<()> {
    let clip = Arc::new(clip.prepare(&config).context("failed to prepare clip")?);
    let actuator = Arc::new(if args.keyframed {
        RecordingActuator::wireless()
    } else {
        RecordingActuator::continuous()
    });
    let device = DeviceHandle::new(DeviceId(0), actuator.clone());

    let scheduler = Scheduler::new(config);
    let options = PlayOptions::default().looping(args.looping);
    let request = PlayRequest::new(Arc::clone(&clip), device).with_options(options);
    let session = scheduler.play(request)?;

    let dt = 1.0 / args.fps;
    let total = args.seconds.unwrap_or_else(|| clip.duration());
    let ticks = (total * args.fps).ceil() as usize;

    let hold_ms = match actuator.transport() {
        Transport::Keyframed {
            command_duration_ms,
            ..
        } => Some(command_duration_ms),
        Transport::Continuous => None,
    };

    let mut printed = 0;
    print_commands(&actuator, &mut printed, 0.0, hold_ms);
    for i in 1..=ticks {
        if !scheduler.is_valid(session) {
            break;
        }
        let report = scheduler.tick(FrameTick::variable(dt));
        if report.failed > 0 {
            bail!("simulated device rejected a command");
        }
        print_commands(&actuator, &mut printed, i as f32 * dt, hold_ms);
    }
    scheduler.stop(session);

    println!(
        "{} commands over {} ticks ({})",
        actuator.command_count(),
        ticks,
        actuator.identity()
    );
    Ok(())
}

/// Print commands recorded since the last call. Keyframed transports show
/// the 16-bit wireless form with its hold time.
fn print_commands(
    actuator: &RecordingActuator,
    printed: &mut usize,
    time: f32,
    hold_ms: Option<u32>,
) {
    let commands = actuator.commands();
    for command in &commands[*printed..] {
        match hold_ms {
            Some(ms) => {
                let wire = RumbleCommand::from_channels(command.low, command.high, ms);
                println!(
                    "{:>8.3}s  low {:>5}  high {:>5}  hold {}ms",
                    time, wire.low, wire.high, wire.duration_ms
                );
            }
            None => println!(
                "{:>8.3}s  low {:.3}  high {:.3}",
                time, command.low, command.high
            ),
        }
    }
    *printed = commands.len();
}
