mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use projlink_core::prelude::*;

use crate::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "projlink", version, about = "Projector RS-232 control")]
struct Cli {
    /// Serial port (e.g. /dev/ttyUSB0 or COM10)
    #[arg(long, env = "PROJLINK_PORT", global = true, default_value = "")]
    port: String,

    /// Baud rate
    #[arg(long, env = "PROJLINK_BAUD", global = true, default_value_t = 9600)]
    baud: u32,

    /// Two-digit projector ID, 00 for broadcast
    #[arg(long, env = "PROJLINK_ADDRESS", global = true, default_value = "00")]
    address: DeviceAddress,

    /// Talk to a simulated projector instead of a serial port
    #[arg(long, global = true)]
    demo: bool,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print power, source, picture mode and diagnostics
    Status,
    /// Capture the current settings into a file
    Save {
        file: PathBuf,
        /// File format; taken from the extension when omitted
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Capture the current settings and print them
    Show {
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
    },
    /// Apply settings from a snapshot file
    Load {
        file: PathBuf,
        /// Also restore the power state
        #[arg(long)]
        include_power: bool,
    },
    /// Send a single command and print the classified response
    Raw {
        feature: u16,
        sub: u16,
        #[arg(allow_negative_numbers = true)]
        arg: Option<i32>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => SnapshotFormat::Json,
            FormatArg::Yaml => SnapshotFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut projector = open(&cli)?;
    run(&mut projector, cli.command)
}

fn open(cli: &Cli) -> Result<Projector> {
    let config = ConnectionConfig {
        port_name: cli.port.clone(),
        baud_rate: cli.baud,
        address: cli.address,
        ..ConnectionConfig::default()
    };

    if cli.demo {
        tracing::info!("using simulated projector");
        let sim = SimulatedProjector::new(cli.address);
        return Ok(Projector::with_connection(Connection::with_transport(
            config,
            Box::new(sim),
        )));
    }

    if config.port_name.is_empty() {
        bail!("no serial port given; use --port, PROJLINK_PORT or --demo");
    }
    let mut projector = Projector::new(config);
    projector
        .connection_mut()
        .connect()
        .with_context(|| format!("opening {}", cli.port))?;
    Ok(projector)
}

fn run(projector: &mut Projector, command: Command) -> Result<()> {
    match command {
        Command::Status => status(projector),
        Command::Save { file, format } => {
            let format = match format {
                Some(f) => f.into(),
                None => SnapshotFormat::from_path(&file)?,
            };
            let snapshot = Snapshot::capture(projector)?;
            snapshot
                .save_as(&file, format)
                .with_context(|| format!("writing {}", file.display()))?;
            println!("Saved configuration to {}", file.display());
            Ok(())
        }
        Command::Show { format } => {
            let snapshot = Snapshot::capture(projector)?;
            let text = match format {
                FormatArg::Json => snapshot.to_json()?,
                FormatArg::Yaml => snapshot.to_yaml()?,
            };
            println!("{}", text);
            Ok(())
        }
        Command::Load {
            file,
            include_power,
        } => load(projector, &file, include_power),
        Command::Raw { feature, sub, arg } => {
            let outcome = projector.raw(feature, sub, arg)?;
            println!("{}", outcome);
            if !outcome.is_success() {
                bail!("command {} {} not accepted: {}", feature, sub, outcome);
            }
            Ok(())
        }
    }
}

fn load(projector: &mut Projector, file: &Path, include_power: bool) -> Result<()> {
    let snapshot =
        Snapshot::load(file).with_context(|| format!("reading {}", file.display()))?;
    let report = snapshot.apply(projector, ApplyOptions { include_power })?;

    for entry in &report.succeeded {
        println!("ok      {}", entry);
    }
    for entry in &report.skipped {
        println!("skipped {}", entry);
    }
    for entry in &report.failed {
        println!("FAILED  {}", entry);
    }
    println!("{}", serde_json::to_string(&summary(&report))?);

    if !report.is_clean() {
        bail!("{} setting(s) failed", report.failed.len());
    }
    Ok(())
}

fn summary(report: &ApplyReport) -> serde_json::Value {
    serde_json::json!({
        "succeeded": report.succeeded.len(),
        "failed": report.failed.len(),
        "skipped": report.skipped.len(),
    })
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}

fn status(projector: &mut Projector) -> Result<()> {
    let power = projector.power_state()?.map(|on| if on { "on" } else { "off" });
    println!("Power:        {}", show(power));
    println!("Source:       {}", show(projector.source()?));
    println!("Picture mode: {}", show(projector.picture_mode()?));
    println!("Brightness:   {}", show(projector.brightness()?));
    println!("Volume:       {}", show(projector.volume()?));
    println!("Temperature:  {}", show(projector.temperature()?.map(|t| format!("{} C", t))));
    println!("Lamp hours:   {}", show(projector.lamp_hours()?));

    let fans: Vec<String> = projector
        .fan_speeds()?
        .into_iter()
        .map(|rpm| show(rpm.map(|r| format!("{} rpm", r))))
        .collect();
    println!("Fans:         {}", fans.join(", "));
    println!("Versions:     {}", show(projector.software_versions()?));
    Ok(())
}
