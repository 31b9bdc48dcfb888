//! Synthetic Cisco NX-OS leaf for exercising MDT telemetry collectors.
//!
//! The generator keeps a small model of a VXLAN EVPN leaf (overlay byte
//! counters, BGP EVPN peers that flap and recover, EVPN route counts and
//! per-VNI MAC/VTEP/ARP counts), advances it on a fixed tick and streams
//! one GPB-KV `Telemetry` message per sensor path over a gRPC dial-out
//! session.
//!
//! # Sensor paths
//! - `vxlan_stats`: overlay interface ingress/egress bytes
//! - `bgp_neighbors`: one row per peer with state, prefixes, uptime and flaps
//! - `evpn_routes`: type-2/3/5 route counts and their total
//! - `vni_state`: one row per VNI
//!
//! # Usage
//! ```bash
//! # Stream to a collector every 5 seconds
//! mdtgen run --server 10.10.20.10:57500 --node leaf-101
//!
//! # Check a configuration file
//! mdtgen validate --config config/generator.yaml
//!
//! # Write the defaults as a starting point
//! mdtgen init-config --output config/generator.yaml
//! ```

pub mod assembly;
pub mod config;
pub mod counters;
pub mod generator;
pub mod logging;
pub mod peer;
pub mod simulation;
pub mod transport;

pub use assembly::{build_all, Category, ReportContext};
pub use config::{ConfigError, ConfigSource, GeneratorConfig};
pub use generator::{Generator, RunOptions, RunSummary};
pub use peer::{BgpPeer, PeerEvent, PeerState};
pub use simulation::{tick, SimulationParams, SimulationState};
pub use transport::{DialoutStream, TelemetrySink, TransportError};
