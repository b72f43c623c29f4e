use crate::generator::echo::SimulatedEchoSource;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chirpcore::peripheral::{FreeRunningPacer, Pacer, RecordingSink, ThreadPacer};
use chirpcore::processing::{CycleReading, MeasurementCycle, Peripherals};
use chirpcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use log::info;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type SimulatedPeripherals = Peripherals<RecordingSink, SimulatedEchoSource, Box<dyn Pacer>>;

pub struct WorkflowResult {
    pub readings: Vec<CycleReading>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Runs every configured round: one cycle per frequency, each followed
    /// by the configured pause.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let mut cycle = self.cycle();
        let mut peripherals = self.peripherals()?;
        let pause = Duration::from_millis(self.config.pause_ms);
        let mut readings = Vec::with_capacity(self.config.rounds * self.config.frequencies.len());

        for round in 0..self.config.rounds {
            for &frequency in &self.config.frequencies {
                let reading = self
                    .run_cycle(&mut cycle, &mut peripherals, frequency, self.config.duration)
                    .with_context(|| format!("round {round} at {frequency} Hz"))?;
                readings.push(reading);
                if !pause.is_zero() {
                    thread::sleep(pause);
                }
            }
        }

        Ok(WorkflowResult {
            readings,
            metrics: self.metrics.snapshot(),
        })
    }

    /// Single cycle outside the round schedule.
    pub fn measure_once(&self, frequency: f64, duration: f64) -> anyhow::Result<CycleReading> {
        let mut cycle = self.cycle();
        let mut peripherals = self.peripherals()?;
        self.run_cycle(&mut cycle, &mut peripherals, frequency, duration)
    }

    fn cycle(&self) -> MeasurementCycle {
        MeasurementCycle::new(self.config.signal.clone(), &self.config.device)
            .with_metrics(self.metrics.clone())
    }

    fn peripherals(&self) -> anyhow::Result<SimulatedPeripherals> {
        let pacer: Box<dyn Pacer> = if self.config.realtime {
            Box::new(ThreadPacer::new())
        } else {
            Box::new(FreeRunningPacer::new())
        };
        let mut peripherals = Peripherals::new(
            RecordingSink::new(self.config.output_range),
            SimulatedEchoSource::new(self.config.echo.clone(), self.config.device.input_range),
            pacer,
        );
        peripherals
            .initialize(&self.config.device)
            .context("initializing peripherals")?;
        Ok(peripherals)
    }

    fn run_cycle(
        &self,
        cycle: &mut MeasurementCycle,
        peripherals: &mut SimulatedPeripherals,
        frequency: f64,
        duration: f64,
    ) -> anyhow::Result<CycleReading> {
        let waveform = cycle
            .capture_waveform(frequency, duration)
            .context("building capture sweep")?;
        peripherals.source.arm(&waveform);
        let reading = cycle
            .measure(peripherals, frequency, duration)
            .context("executing measurement cycle")?;
        // The emitted stream is not retained between cycles.
        peripherals.sink.take();
        info!(
            "{:.0} Hz -> velocity {:.3} ({:?})",
            frequency, reading.estimate.velocity, reading.estimate.status
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirpcore::processing::PeakStatus;

    fn quiet_config() -> WorkflowConfig {
        let mut cfg = WorkflowConfig::from_args(vec![40e3, 100e3], 0.002, 2, 0, false);
        cfg.echo.noise = 0.0;
        cfg
    }

    #[test]
    fn runner_executes_every_round() {
        let runner = Runner::new(quiet_config());
        let result = runner.execute().unwrap();
        assert_eq!(result.readings.len(), 4);
        assert_eq!(result.metrics.cycles, 4);
        assert_eq!(result.readings[0].emission.samples_written, 160);
        assert_eq!(result.readings[1].emission.samples_written, 400);
    }

    #[test]
    fn runner_recovers_the_simulated_delay() {
        let mut cfg = quiet_config();
        cfg.echo.delay_samples = 9;
        let reading = Runner::new(cfg).measure_once(40e3, 0.002).unwrap();
        assert_eq!(reading.estimate.status, PeakStatus::Resolved);
        assert_eq!(reading.estimate.peak.map(|p| p.lag), Some(9));
    }

    #[test]
    fn runner_reports_invalid_frequency_with_context() {
        let runner = Runner::new(quiet_config());
        let err = runner.measure_once(1e3, 0.002).unwrap_err();
        assert!(format!("{err:#}").contains("building capture sweep"));
        assert_eq!(runner.metrics().cycles, 0);
    }
}
