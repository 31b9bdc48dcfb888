//! Tick loop: simulate, assemble, encode, send.

use crate::assembly::{build_all, ReportContext};
use crate::config::{ConfigError, GeneratorConfig};
use crate::peer::PeerEvent;
use crate::simulation::{tick, SimulationParams, SimulationState};
use crate::transport::{TelemetrySink, TransportError};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run-level settings supplied on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Device identity reported as `node_id_str`
    pub node_id: String,
    pub interval: Duration,
    pub flap_chance: f64,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            node_id: "leaf-101".to_string(),
            interval: Duration::from_secs(5),
            flap_chance: 0.02,
            seed: None,
            max_ticks: None,
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::NotPositive { name: "interval" });
        }
        if !(0.0..=1.0).contains(&self.flap_chance) {
            return Err(ConfigError::FlapChanceOutOfRange(self.flap_chance));
        }
        Ok(())
    }
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub flaps: u64,
    pub recoveries: u64,
}

/// Owns the simulation state and drives it one tick at a time.
pub struct Generator {
    options: RunOptions,
    params: SimulationParams,
    state: SimulationState,
    rng: StdRng,
    req_id: i64,
    summary: RunSummary,
}

impl Generator {
    /// Validates the inputs and builds the initial state as of `now`.
    pub fn new(
        config: &GeneratorConfig,
        options: RunOptions,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        options.validate()?;

        let seed = options.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        let req_id = rng.gen_range(1..=i64::MAX);
        info!(seed, req_id, "Simulation initialized");

        Ok(Self {
            params: SimulationParams::from_config(config, options.flap_chance),
            state: SimulationState::from_config(config, now),
            options,
            rng,
            req_id,
            summary: RunSummary::default(),
        })
    }

    /// Correlation id carried by every frame of this run
    pub fn req_id(&self) -> i64 {
        self.req_id
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Runs one tick at `now` and sends its four messages in order. Stops at
    /// the first send failure.
    pub async fn step<S: TelemetrySink + ?Sized>(
        &mut self,
        sink: &mut S,
        now: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        let events = tick(&mut self.state, &self.params, &mut self.rng, now);
        for event in &events {
            match event {
                PeerEvent::Flapped {
                    address,
                    flap_count,
                } => {
                    self.summary.flaps += 1;
                    warn!("BGP neighbor {} FLAPPED to Idle (flap #{})", address, flap_count);
                }
                PeerEvent::Recovered {
                    address,
                    prefixes_received,
                } => {
                    self.summary.recoveries += 1;
                    info!(
                        "BGP neighbor {} RECOVERED to Established ({} prefixes)",
                        address, prefixes_received
                    );
                }
            }
        }

        let ctx = ReportContext {
            node_id: &self.options.node_id,
            timestamp_ms: now.timestamp_millis().max(0) as u64,
            collection_id: self.state.tick,
        };

        for message in build_all(&self.state, &ctx) {
            let payload = message.encode();
            let len = payload.len() as u64;
            sink.send(self.req_id, payload).await?;
            self.summary.messages_sent += 1;
            self.summary.bytes_sent += len;
        }
        self.summary.ticks += 1;

        info!(
            "Sent telemetry: vxlan={}/{}, bgp_neighbors={}, evpn_routes={}, vnis={}",
            self.state.overlay.ingress_bytes,
            self.state.overlay.egress_bytes,
            self.state.peers.len(),
            self.state.routes.total_routes,
            self.state.vnis.len()
        );

        Ok(())
    }

    /// Ticks every `interval` until cancelled, the tick limit is reached, or
    /// a send fails. The first tick fires one interval after start. The sink
    /// is closed on a clean exit.
    pub async fn run<S: TelemetrySink + ?Sized>(
        &mut self,
        sink: &mut S,
        shutdown: CancellationToken,
    ) -> Result<RunSummary, TransportError> {
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!(
            "Sending telemetry every {:?} as {}",
            self.options.interval, self.options.node_id
        );

        loop {
            if let Some(max) = self.options.max_ticks {
                if self.summary.ticks >= max {
                    info!("Reached tick limit ({})", max);
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.step(sink, Utc::now()).await?;
                }
            }
        }

        sink.close().await?;

        let summary = self.summary;
        info!(
            "Run complete: {} ticks, {} messages, {} bytes, {} flaps, {} recoveries",
            summary.ticks,
            summary.messages_sent,
            summary.bytes_sent,
            summary.flaps,
            summary.recoveries
        );
        Ok(summary)
    }
}
