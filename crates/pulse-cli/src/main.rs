use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use pulse_signals::clock::{Clock, ManualClock, MonotonicClock};
use pulse_signals::session::{RppgMonitor, SessionOutcome, Snapshot};
use pulse_signals::vision::{SyntheticCamera, SyntheticScene};
use pulse_signals::RppgConfig;

#[derive(Parser)]
#[command(name = "pulse-cli", about = "Camera heart-rate measurement (rPPG) demo")]
struct Cli {
    /// TOML config file; `PULSE_*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one measurement session against a synthetic camera
    Measure {
        /// Simulated pulse rate of the synthetic face
        #[arg(long, default_value_t = 72.0)]
        heart_rate: f64,
        /// Override the session length (seconds)
        #[arg(long)]
        duration: Option<u32>,
        /// Run on the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,
        /// Cover the face so no skin pixels are found
        #[arg(long)]
        occluded: bool,
        /// Simulate a denied camera permission
        #[arg(long)]
        deny_camera: bool,
        /// Print every snapshot instead of one per second
        #[arg(long)]
        all_snapshots: bool,
    },
    /// Print the effective configuration
    ShowConfig,
}

/// Display refresh interval the monitor loop is driven at
const TURN_STEP_MS: f64 = 1000.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = RppgConfig::load_layered(None, cli.config.as_deref())?;

    match cli.cmd {
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Measure {
            heart_rate,
            duration,
            realtime,
            occluded,
            deny_camera,
            all_snapshots,
        } => {
            if let Some(seconds) = duration {
                config.session.duration_seconds = seconds;
            }
            let scene = SyntheticScene {
                heart_rate_bpm: heart_rate,
                occluded,
                deny_access: deny_camera.then(|| "camera permission denied".to_string()),
                ..SyntheticScene::default()
            };

            if realtime {
                measure(config, scene, MonotonicClock::new(), all_snapshots)?;
            } else {
                measure(config, scene, ManualClock::new(), all_snapshots)?;
            }
        }
    }
    Ok(())
}

fn measure<C: Clock + Clone>(
    config: RppgConfig,
    scene: SyntheticScene,
    clock: C,
    all_snapshots: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = SyntheticCamera::new(clock.clone(), scene);
    let mut monitor = RppgMonitor::new(config, camera, clock)?;
    let snapshots = monitor.subscribe();

    if let Err(e) = monitor.start_session() {
        for snap in snapshots.try_iter() {
            println!("{}", serde_json::to_string(&snap)?);
        }
        return Err(e.into());
    }
    info!("measuring for {} s", monitor.session().duration_seconds());

    let mut last_printed: Option<(u32, Option<u32>)> = None;
    while monitor.session().is_running() {
        monitor.turn();
        for snap in snapshots.try_iter() {
            if all_snapshots || is_new_second(&snap, &mut last_printed) {
                println!("{}", serde_json::to_string(&snap)?);
            }
        }
        if monitor.session().is_running() {
            monitor.clock().sleep_ms(TURN_STEP_MS);
        }
    }

    let outcome = monitor.session().outcome();
    let summary = serde_json::json!({
        "final_bpm": monitor.session().final_bpm(),
        "outcome": outcome,
        "estimates": monitor.session().collected_bpm().len(),
    });
    println!("{}", serde_json::to_string(&summary)?);

    match outcome {
        Some(SessionOutcome::Measured(bpm)) => eprintln!("Heart rate: {} BPM", bpm),
        Some(SessionOutcome::NoReading) => {
            eprintln!("No usable reading: keep your face centred and well lit, then retry")
        }
        None => eprintln!("Session did not complete"),
    }
    Ok(())
}

/// Throttle output to one line per countdown second or final result
fn is_new_second(snap: &Snapshot, last: &mut Option<(u32, Option<u32>)>) -> bool {
    let key = (snap.seconds_remaining, snap.final_bpm);
    if *last == Some(key) {
        return false;
    }
    *last = Some(key);
    true
}
