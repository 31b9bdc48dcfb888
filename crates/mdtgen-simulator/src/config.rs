//! Configuration structs for the telemetry generator.
//!
//! The YAML layout follows `config/generator.yaml`. Every section carries
//! `#[serde(default)]`, so a partial file is overlaid on the built-in
//! defaults, and a missing file means "use the defaults".

use crate::counters::SegmentStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{name} must be positive")]
    NotPositive { name: &'static str },

    #[error("{min_name} ({min}) cannot be greater than {max_name} ({max})")]
    InvalidRange {
        min_name: &'static str,
        max_name: &'static str,
        min: u64,
        max: u64,
    },

    #[error("flap chance must be within [0.0, 1.0], got {0}")]
    FlapChanceOutOfRange(f64),

    #[error("at least one BGP neighbor must be configured")]
    NoBgpNeighbors,

    #[error("at least one VNI state must be configured")]
    NoVniStates,
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Complete generator configuration - can be loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Simulation behavior
    pub simulation: SimulationSettings,
    /// VXLAN overlay interface
    pub vxlan: VxlanSettings,
    /// BGP EVPN neighbors
    pub bgp_neighbors: Vec<BgpNeighborSettings>,
    /// EVPN route counts
    pub evpn: EvpnSettings,
    /// Per-VNI state
    pub vni_states: Vec<VniSettings>,
}

/// Simulation behavior parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    /// Lower bound of the recovery threshold, in seconds
    pub flap_recovery_min: u64,
    /// Upper bound (exclusive) of the recovery threshold, in seconds
    pub flap_recovery_max: u64,
    pub counters: CounterSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            flap_recovery_min: 15,
            flap_recovery_max: 30,
            counters: CounterSettings::default(),
        }
    }
}

/// Per-tick increment ranges and fluctuation bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterSettings {
    pub vxlan_ingress_min: u64,
    pub vxlan_ingress_max: u64,
    pub vxlan_egress_min: u64,
    pub vxlan_egress_max: u64,
    pub bgp_prefix_fluctuation: u32,
    pub evpn_type2_fluctuation: u32,
    pub evpn_type3_fluctuation: u32,
    pub evpn_type5_fluctuation: u32,
    pub vni_mac_fluctuation: u32,
    pub vni_arp_fluctuation: u32,
    /// 0 keeps the VTEP count constant
    pub vni_vtep_fluctuation: u32,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            vxlan_ingress_min: 1000,
            vxlan_ingress_max: 5000,
            vxlan_egress_min: 1500,
            vxlan_egress_max: 5000,
            bgp_prefix_fluctuation: 5,
            evpn_type2_fluctuation: 5,
            evpn_type3_fluctuation: 3,
            evpn_type5_fluctuation: 3,
            vni_mac_fluctuation: 5,
            vni_arp_fluctuation: 3,
            vni_vtep_fluctuation: 0,
        }
    }
}

/// VXLAN interface initial state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VxlanSettings {
    pub initial_ingress_bytes: u64,
    pub initial_egress_bytes: u64,
    pub vni_id: u32,
    pub interface_name: String,
}

impl Default for VxlanSettings {
    fn default() -> Self {
        Self {
            initial_ingress_bytes: 1_000_000,
            initial_egress_bytes: 2_000_000,
            vni_id: 5000,
            interface_name: "VNI-Leaf-Tenant-A".to_string(),
        }
    }
}

/// One BGP neighbor's initial configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BgpNeighborSettings {
    pub address: String,
    #[serde(default)]
    pub remote_as: u32,
    #[serde(default)]
    pub initial_prefixes_recv: u32,
    #[serde(default)]
    pub initial_prefixes_sent: u32,
}

impl BgpNeighborSettings {
    fn new(address: &str, remote_as: u32, recv: u32, sent: u32) -> Self {
        Self {
            address: address.to_string(),
            remote_as,
            initial_prefixes_recv: recv,
            initial_prefixes_sent: sent,
        }
    }
}

/// EVPN route initial counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvpnSettings {
    pub type2_routes: u32,
    pub type3_routes: u32,
    pub type5_routes: u32,
}

impl Default for EvpnSettings {
    fn default() -> Self {
        Self {
            type2_routes: 120,
            type3_routes: 8,
            type5_routes: 45,
        }
    }
}

/// One VNI's initial state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VniSettings {
    pub vni_id: u32,
    #[serde(default)]
    pub initial_mac_count: u32,
    #[serde(default)]
    pub initial_vtep_count: u32,
    #[serde(default)]
    pub initial_arp_count: u32,
    #[serde(default)]
    pub state: SegmentStatus,
}

impl VniSettings {
    fn new(vni_id: u32, mac: u32, vtep: u32, arp: u32) -> Self {
        Self {
            vni_id,
            initial_mac_count: mac,
            initial_vtep_count: vtep,
            initial_arp_count: arp,
            state: SegmentStatus::Up,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            vxlan: VxlanSettings::default(),
            bgp_neighbors: vec![
                BgpNeighborSettings::new("10.0.0.1", 65001, 150, 50),
                BgpNeighborSettings::new("10.0.0.2", 65001, 148, 50),
                BgpNeighborSettings::new("10.0.0.3", 65002, 145, 50),
            ],
            evpn: EvpnSettings::default(),
            vni_states: vec![
                VniSettings::new(5000, 45, 3, 42),
                VniSettings::new(5001, 32, 3, 30),
                VniSettings::new(5002, 28, 3, 25),
            ],
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file, falling back to the defaults when
    /// the file does not exist. The result is validated either way.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path = path.as_ref();

        let (config, source) = match std::fs::read_to_string(path) {
            Ok(content) => (
                Self::from_yaml_str(&content)?,
                ConfigSource::File(path.to_path_buf()),
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Self::default(), ConfigSource::Defaults)
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.validate()?;
        Ok((config, source))
    }

    /// Parse YAML over the defaults. Does not validate.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write default config to a file (for generating an example config)
    pub fn write_default(path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = Self::default().to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Ensure configuration values are sensible
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.flap_recovery_min == 0 {
            return Err(ConfigError::NotPositive {
                name: "flap_recovery_min",
            });
        }
        if sim.flap_recovery_max == 0 {
            return Err(ConfigError::NotPositive {
                name: "flap_recovery_max",
            });
        }
        check_range(
            "flap_recovery_min",
            sim.flap_recovery_min,
            "flap_recovery_max",
            sim.flap_recovery_max,
        )?;

        let counters = &sim.counters;
        check_range(
            "vxlan_ingress_min",
            counters.vxlan_ingress_min,
            "vxlan_ingress_max",
            counters.vxlan_ingress_max,
        )?;
        check_range(
            "vxlan_egress_min",
            counters.vxlan_egress_min,
            "vxlan_egress_max",
            counters.vxlan_egress_max,
        )?;

        if self.bgp_neighbors.is_empty() {
            return Err(ConfigError::NoBgpNeighbors);
        }
        if self.vni_states.is_empty() {
            return Err(ConfigError::NoVniStates);
        }

        Ok(())
    }
}

fn check_range(
    min_name: &'static str,
    min: u64,
    max_name: &'static str,
    max: u64,
) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            min_name,
            max_name,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bgp_neighbors.len(), 3);
        assert_eq!(config.vni_states.len(), 3);
        assert_eq!(config.vxlan.interface_name, "VNI-Leaf-Tenant-A");
    }

    #[test]
    fn test_partial_yaml_overlays_defaults() {
        let yaml = r#"
            simulation:
              flap_recovery_min: 5
              counters:
                bgp_prefix_fluctuation: 0
            evpn:
              type2_routes: 200
        "#;

        let config = GeneratorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.simulation.flap_recovery_min, 5);
        assert_eq!(config.simulation.flap_recovery_max, 30);
        assert_eq!(config.simulation.counters.bgp_prefix_fluctuation, 0);
        assert_eq!(config.simulation.counters.vxlan_ingress_min, 1000);
        assert_eq!(config.evpn.type2_routes, 200);
        assert_eq!(config.evpn.type3_routes, 8);
        assert_eq!(config.bgp_neighbors.len(), 3);
    }

    #[test]
    fn test_lists_replace_defaults() {
        let yaml = r#"
            bgp_neighbors:
              - address: 192.168.1.1
                remote_as: 65100
            vni_states:
              - vni_id: 7000
                initial_mac_count: 10
                state: down
        "#;

        let config = GeneratorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.bgp_neighbors.len(), 1);
        assert_eq!(config.bgp_neighbors[0].address, "192.168.1.1");
        assert_eq!(config.bgp_neighbors[0].initial_prefixes_recv, 0);
        assert_eq!(config.vni_states.len(), 1);
        assert_eq!(config.vni_states[0].state, SegmentStatus::Down);
        assert_eq!(config.vni_states[0].initial_vtep_count, 0);
    }

    #[test]
    fn test_min_greater_than_max_rejected() {
        let mut config = GeneratorConfig::default();
        config.simulation.flap_recovery_min = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                min_name: "flap_recovery_min",
                ..
            })
        ));

        let mut config = GeneratorConfig::default();
        config.simulation.counters.vxlan_egress_min = 6000;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "vxlan_egress_min (6000) cannot be greater than vxlan_egress_max (5000)"
        );
    }

    #[test]
    fn test_zero_recovery_rejected() {
        let mut config = GeneratorConfig::default();
        config.simulation.flap_recovery_max = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_empty_lists_rejected() {
        let mut config = GeneratorConfig::default();
        config.bgp_neighbors.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoBgpNeighbors)));

        let mut config = GeneratorConfig::default();
        config.vni_states.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoVniStates)));
    }

    #[test]
    fn test_negative_counter_is_parse_error() {
        let yaml = "simulation:\n  counters:\n    vxlan_ingress_min: -1\n";
        assert!(matches!(
            GeneratorConfig::from_yaml_str(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = GeneratorConfig::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_write_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.yaml");
        GeneratorConfig::write_default(&path).unwrap();

        let (config, source) = GeneratorConfig::load(&path).unwrap();
        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");

        std::fs::write(&path, "evpn: [not, a, map]\n").unwrap();
        assert!(matches!(
            GeneratorConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));

        std::fs::write(&path, "simulation:\n  flap_recovery_min: 60\n").unwrap();
        assert!(matches!(
            GeneratorConfig::load(&path),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let yaml = GeneratorConfig::default().to_yaml().unwrap();
        let parsed = GeneratorConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, GeneratorConfig::default());
    }
}
