//! BGP peer flap/recovery state machine.
//!
//! Each tick a peer in `Established` may flap to `Idle` with the configured
//! probability. An `Idle` peer returns to `Established` once the time since
//! the flap exceeds a recovery threshold that is drawn again on every tick,
//! so recovery time stays random even with a fixed seed.

use crate::counters::{fluctuate, IncrementRange};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Received-prefix count after recovery is drawn from `[140, 160)`.
const RECOVERY_PREFIXES_BASE: u32 = 140;
const RECOVERY_PREFIXES_SPREAD: u32 = 20;

/// BGP finite state machine states.
///
/// `Connect` and `Active` are part of the model but no transition enters
/// them yet. A peer placed in either is left untouched by [`BgpPeer::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Idle,
    Connect,
    Active,
    Established,
}

impl PeerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerState::Idle => "Idle",
            PeerState::Connect => "Connect",
            PeerState::Active => "Active",
            PeerState::Established => "Established",
        }
    }

    /// NX-OS numeric state code
    pub fn code(&self) -> u32 {
        match self {
            PeerState::Idle => 1,
            PeerState::Connect => 2,
            PeerState::Active => 3,
            PeerState::Established => 6,
        }
    }
}

/// Per-tick parameters for peer evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerParams {
    /// Probability in `[0, 1]` that an established peer flaps on a tick
    pub flap_chance: f64,
    pub prefix_fluctuation: u32,
    /// Recovery threshold range in seconds
    pub recovery: IncrementRange,
}

/// A state change worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Flapped { address: String, flap_count: u32 },
    Recovered { address: String, prefixes_received: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BgpPeer {
    pub address: String,
    pub remote_as: u32,
    pub state: PeerState,
    /// When the current state was entered
    pub state_since: DateTime<Utc>,
    pub prefixes_received: u32,
    pub prefixes_sent: u32,
    pub uptime_secs: u64,
    pub flap_count: u32,
}

impl BgpPeer {
    /// A peer that has been `Established` since `now`
    pub fn established(
        address: impl Into<String>,
        remote_as: u32,
        prefixes_received: u32,
        prefixes_sent: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            remote_as,
            state: PeerState::Established,
            state_since: now,
            prefixes_received,
            prefixes_sent,
            uptime_secs: 0,
            flap_count: 0,
        }
    }

    /// Advances the peer by one tick.
    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        params: &PeerParams,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<PeerEvent> {
        match self.state {
            PeerState::Established => {
                if rng.gen::<f64>() < params.flap_chance {
                    self.state = PeerState::Idle;
                    self.state_since = now;
                    self.prefixes_received = 0;
                    self.uptime_secs = 0;
                    self.flap_count = self.flap_count.saturating_add(1);
                    return Some(PeerEvent::Flapped {
                        address: self.address.clone(),
                        flap_count: self.flap_count,
                    });
                }

                self.uptime_secs = (now - self.state_since).num_seconds().max(0) as u64;
                self.prefixes_received =
                    fluctuate(self.prefixes_received, params.prefix_fluctuation, rng);
                None
            }
            PeerState::Idle => {
                let threshold_ms = params.recovery.sample(rng).saturating_mul(1000);
                let elapsed_ms = (now - self.state_since).num_milliseconds();
                if elapsed_ms <= 0 || (elapsed_ms as u64) <= threshold_ms {
                    return None;
                }

                self.state = PeerState::Established;
                self.state_since = now;
                self.uptime_secs = 0;
                self.prefixes_received =
                    RECOVERY_PREFIXES_BASE + rng.gen_range(0..RECOVERY_PREFIXES_SPREAD);
                Some(PeerEvent::Recovered {
                    address: self.address.clone(),
                    prefixes_received: self.prefixes_received,
                })
            }
            PeerState::Connect | PeerState::Active => None,
        }
    }
}
