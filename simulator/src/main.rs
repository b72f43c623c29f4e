use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::ReadingsModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Chirp Doppler measurement-cycle driver")]
struct Args {
    /// Run the configured rounds once and append readings to the report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Sweep end frequency in Hz; repeat for one cycle per frequency
    #[arg(long = "frequency", default_values_t = [80_000.0, 200_000.0])]
    frequencies: Vec<f64>,
    #[arg(long, default_value_t = 0.01)]
    duration: f64,
    #[arg(long, default_value_t = 1)]
    rounds: usize,
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,
    /// Capture at the firmware's fixed 400 kHz instead of the emission rate
    #[arg(long, default_value_t = false)]
    legacy_rates: bool,
    #[arg(long, default_value = "tools/data/readings.jsonl")]
    report: PathBuf,
    /// Keep the HTTP bridge alive for downstream consumers
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.frequencies,
            args.duration,
            args.rounds,
            args.pause_ms,
            args.legacy_rates,
        )
    };
    workflow_config.validate()?;

    let runner = Runner::new(workflow_config);
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));

    if args.offline {
        let result = runner.execute()?;

        for reading in &result.readings {
            println!(
                "{:>9.0} Hz -> velocity {:.3} ({:?}, lag {:?}, {} out / {} in)",
                reading.end_frequency,
                reading.estimate.velocity,
                reading.estimate.status,
                reading.estimate.peak.map(|peak| peak.lag),
                reading.emission.samples_written,
                reading.estimate.sample_count
            );
        }

        let model = ReadingsModel::from_result(&result);
        for &frequency in &runner.config().frequencies {
            if let Some(velocity) = model.latest_velocity(frequency) {
                println!("latest {:.0} Hz velocity: {:.3}", frequency, velocity);
            }
        }
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline readings ready.");

        if let Some(parent) = args.report.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.report)
            .with_context(|| format!("opening report {}", args.report.display()))?;
        for reading in &result.readings {
            writeln!(file, "{}", reading.to_json_line()?)?;
        }
    }
    if args.serve {
        gui_bridge.spawn(args.bind)?;
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }
    if !args.offline && !args.serve {
        gui_bridge.publish_status("Nothing to do: pass --offline and/or --serve.");
    }

    Ok(())
}
