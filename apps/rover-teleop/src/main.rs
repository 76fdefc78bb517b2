use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rover_command::{InputSnapshot, InputSource, Key, ScriptedInput};
use std::net::SocketAddr;
use std::path::PathBuf;
use teleop_core::{Teleop, TeleopConfig};
use tracing::{error, info};

mod keyboard;
mod listen;

use keyboard::KeyboardInput;

#[derive(Parser, Debug)]
#[command(
    name = "rover-teleop",
    version,
    about = "Keyboard teleop for the rover: WebSocket viewer + UDP command link",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the keyboard and stream drive/arm packets
    Run {
        /// JSON configuration file (missing file means defaults)
        #[arg(short, long, default_value = "rover-teleop.json")]
        config: PathBuf,
        /// Rover UDP address as HOST:PORT
        #[arg(long)]
        destination: Option<String>,
        /// WebSocket listen address as IP:PORT
        #[arg(long)]
        bind: Option<SocketAddr>,
        /// Polling period in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,
        /// Replay a scripted demo instead of reading the keyboard
        #[arg(long, action = ArgAction::SetTrue)]
        mock: bool,
        /// Print the effective configuration as JSON and exit
        #[arg(long, action = ArgAction::SetTrue)]
        print_config: bool,
    },
    /// Receive command packets on UDP and log them decoded
    Listen {
        #[arg(long, default_value = "0.0.0.0:12345")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            destination,
            bind,
            poll_ms,
            mock,
            print_config,
        } => {
            let mut cfg = TeleopConfig::load(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            if let Some(dest) = destination {
                let (host, port) = split_host_port(&dest)?;
                cfg.destination_host = host;
                cfg.destination_port = port;
            }
            if let Some(addr) = bind {
                cfg.bind_host = addr.ip().to_string();
                cfg.bind_port = addr.port();
            }
            if let Some(ms) = poll_ms {
                cfg.poll_period_ms = ms;
            }
            cfg.validate().context("invalid configuration")?;

            if print_config {
                println!("{}", cfg.to_json()?);
                return Ok(());
            }
            run_teleop(cfg, mock).await
        }
        Commands::Listen { bind } => listen::run(bind).await,
    }
}

async fn run_teleop(cfg: TeleopConfig, mock: bool) -> Result<()> {
    let input: Box<dyn InputSource> = if mock {
        info!("using scripted demo input");
        Box::new(demo_script())
    } else {
        match KeyboardInput::open() {
            Ok(kb) => Box::new(kb),
            Err(e) => {
                error!("keyboard unavailable: {e}");
                return Err(e).context("cannot read keyboard (try --mock on headless hosts)");
            }
        }
    };

    let mut teleop = Teleop::start(cfg, input)
        .await
        .context("failed to start teleop")?;
    let summary = teleop
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    info!(
        "Teleop finished: {} ticks, {} drive packets, {} arm packets",
        summary.ticks, summary.drive_packets, summary.arm_packets
    );
    Ok(())
}

/// Drive forward, turn, stop, then exercise each arm joint; repeats forever.
fn demo_script() -> ScriptedInput {
    let steps: [(&[Key], usize); 9] = [
        (&[], 10),
        (&[Key::W], 20),
        (&[Key::W, Key::A], 10),
        (&[Key::S], 10),
        (&[], 10),
        (&[Key::Q], 5),
        (&[Key::X], 5),
        (&[Key::Up], 5),
        (&[Key::Right, Key::R], 5),
    ];
    let frames = steps.iter().flat_map(|(keys, repeat)| {
        std::iter::repeat(InputSnapshot::from_keys(keys.iter().copied())).take(*repeat)
    });
    ScriptedInput::new(frames).looping()
}

fn split_host_port(s: &str) -> Result<(String, u16)> {
    let (host, port) = s
        .rsplit_once(':')
        .with_context(|| format!("expected HOST:PORT, got {s}"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        anyhow::bail!("empty host in {s}");
    }
    let port = port
        .parse::<u16>()
        .with_context(|| format!("invalid port in {s}"))?;
    Ok((host.to_string(), port))
}

fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
