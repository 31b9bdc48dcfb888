//! Simulation state and the single-tick update.

use crate::config::GeneratorConfig;
use crate::counters::{
    IncrementRange, OverlayCounters, RouteFluctuation, RouteSummary, SegmentFluctuation, VniState,
};
use crate::peer::{BgpPeer, PeerEvent, PeerParams};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Update bounds derived once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub peer: PeerParams,
    pub ingress: IncrementRange,
    pub egress: IncrementRange,
    pub routes: RouteFluctuation,
    pub segments: SegmentFluctuation,
}

impl SimulationParams {
    pub fn from_config(config: &GeneratorConfig, flap_chance: f64) -> Self {
        let sim = &config.simulation;
        let counters = &sim.counters;
        Self {
            peer: PeerParams {
                flap_chance,
                prefix_fluctuation: counters.bgp_prefix_fluctuation,
                recovery: IncrementRange::new(sim.flap_recovery_min, sim.flap_recovery_max),
            },
            ingress: IncrementRange::new(counters.vxlan_ingress_min, counters.vxlan_ingress_max),
            egress: IncrementRange::new(counters.vxlan_egress_min, counters.vxlan_egress_max),
            routes: RouteFluctuation {
                type2: counters.evpn_type2_fluctuation,
                type3: counters.evpn_type3_fluctuation,
                type5: counters.evpn_type5_fluctuation,
            },
            segments: SegmentFluctuation {
                mac: counters.vni_mac_fluctuation,
                vtep: counters.vni_vtep_fluctuation,
                arp: counters.vni_arp_fluctuation,
            },
        }
    }
}

/// Everything the simulation mutates between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub overlay: OverlayCounters,
    pub peers: Vec<BgpPeer>,
    pub routes: RouteSummary,
    pub vnis: Vec<VniState>,
    /// Number of ticks applied so far
    pub tick: u64,
}

impl SimulationState {
    /// Initial state; every peer starts `Established` as of `now`.
    pub fn from_config(config: &GeneratorConfig, now: DateTime<Utc>) -> Self {
        let overlay = OverlayCounters {
            vni_id: config.vxlan.vni_id,
            interface_name: config.vxlan.interface_name.clone(),
            ingress_bytes: config.vxlan.initial_ingress_bytes,
            egress_bytes: config.vxlan.initial_egress_bytes,
        };

        let peers = config
            .bgp_neighbors
            .iter()
            .map(|n| {
                BgpPeer::established(
                    n.address.clone(),
                    n.remote_as,
                    n.initial_prefixes_recv,
                    n.initial_prefixes_sent,
                    now,
                )
            })
            .collect();

        let vnis = config
            .vni_states
            .iter()
            .map(|v| VniState {
                vni_id: v.vni_id,
                status: v.state,
                mac_count: v.initial_mac_count,
                vtep_count: v.initial_vtep_count,
                arp_count: v.initial_arp_count,
            })
            .collect();

        Self {
            overlay,
            peers,
            routes: RouteSummary::new(
                config.evpn.type2_routes,
                config.evpn.type3_routes,
                config.evpn.type5_routes,
            ),
            vnis,
            tick: 0,
        }
    }
}

/// Applies one tick to `state` and returns the peer transitions it caused.
///
/// Order is fixed: overlay counters, peers, route summary, VNIs.
pub fn tick<R: Rng + ?Sized>(
    state: &mut SimulationState,
    params: &SimulationParams,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<PeerEvent> {
    state.tick += 1;

    state.overlay.advance(params.ingress, params.egress, rng);

    let events = state
        .peers
        .iter_mut()
        .filter_map(|peer| peer.evaluate(&params.peer, rng, now))
        .collect();

    state.routes.advance(params.routes, rng);

    for vni in &mut state.vnis {
        vni.advance(params.segments, rng);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerState;
    use chrono::TimeZone;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        start() + chrono::Duration::seconds(secs)
    }

    fn quiet_config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        let counters = &mut config.simulation.counters;
        counters.bgp_prefix_fluctuation = 0;
        counters.evpn_type2_fluctuation = 0;
        counters.evpn_type3_fluctuation = 0;
        counters.evpn_type5_fluctuation = 0;
        counters.vni_mac_fluctuation = 0;
        counters.vni_arp_fluctuation = 0;
        counters.vni_vtep_fluctuation = 0;
        config
    }

    #[test]
    fn test_initial_state_from_defaults() {
        let state = SimulationState::from_config(&GeneratorConfig::default(), start());
        assert_eq!(state.overlay.ingress_bytes, 1_000_000);
        assert_eq!(state.overlay.egress_bytes, 2_000_000);
        assert_eq!(state.peers.len(), 3);
        assert!(state.peers.iter().all(|p| p.state == PeerState::Established));
        assert_eq!(state.routes.total_routes, 173);
        assert_eq!(state.vnis[1].vni_id, 5001);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn test_ingress_after_one_tick() {
        let config = GeneratorConfig::default();
        let params = SimulationParams::from_config(&config, 0.0);

        for seed in 0..50 {
            let mut state = SimulationState::from_config(&config, start());
            let mut rng = StdRng::seed_from_u64(seed);
            tick(&mut state, &params, &mut rng, at(5));
            assert!((1_001_000..1_005_000).contains(&state.overlay.ingress_bytes));
            assert!((2_001_500..2_005_000).contains(&state.overlay.egress_bytes));
            assert_eq!(state.tick, 1);
        }
    }

    #[test]
    fn test_zero_fluctuation_keeps_routes() {
        let config = quiet_config();
        let params = SimulationParams::from_config(&config, 0.0);
        let mut state = SimulationState::from_config(&config, start());
        let mut rng = StdRng::seed_from_u64(5);

        tick(&mut state, &params, &mut rng, at(5));

        assert_eq!(state.routes, RouteSummary::new(120, 8, 45));
        assert_eq!(state.routes.total_routes, 173);
        assert_eq!(state.vnis[0].mac_count, 45);
        assert_eq!(state.vnis[0].vtep_count, 3);
    }

    #[test]
    fn test_forced_flap_through_tick() {
        let config = GeneratorConfig::default();
        let params = SimulationParams::from_config(&config, 0.02);
        let mut state = SimulationState::from_config(&config, start());
        let mut rng = StepRng::new(0, 0);

        let events = tick(&mut state, &params, &mut rng, at(5));

        assert_eq!(events.len(), 3);
        let first = &state.peers[0];
        assert_eq!(first.state, PeerState::Idle);
        assert_eq!(first.prefixes_received, 0);
        assert_eq!(first.flap_count, 1);
    }

    #[test]
    fn test_counters_never_negative_under_minimum_draws() {
        // Every draw at its lower bound drives oscillating counters down as
        // fast as possible.
        let config = GeneratorConfig::default();
        let params = SimulationParams::from_config(&config, 0.0);
        let mut state = SimulationState::from_config(&config, start());
        let mut rng = StepRng::new(0, 0);

        for n in 1..=100 {
            tick(&mut state, &params, &mut rng, at(5 * n));
        }

        assert_eq!(state.routes.type2_routes, 0);
        assert_eq!(state.routes.type3_routes, 0);
        assert_eq!(state.routes.type5_routes, 0);
        assert_eq!(state.routes.total_routes, 0);
        for vni in &state.vnis {
            assert_eq!(vni.mac_count, 0);
            assert_eq!(vni.arp_count, 0);
            assert_eq!(vni.vtep_count, 3);
        }
        for peer in &state.peers {
            assert_eq!(peer.prefixes_received, 0);
        }
    }

    #[test]
    fn test_random_walk_stays_consistent() {
        let config = GeneratorConfig::default();
        let params = SimulationParams::from_config(&config, 0.3);
        let mut state = SimulationState::from_config(&config, start());
        let mut rng = StdRng::seed_from_u64(2024);
        let mut last_ingress = state.overlay.ingress_bytes;

        for n in 1..=500 {
            tick(&mut state, &params, &mut rng, at(5 * n));
            assert!(state.overlay.ingress_bytes > last_ingress);
            last_ingress = state.overlay.ingress_bytes;
            assert_eq!(
                state.routes.total_routes,
                state.routes.type2_routes + state.routes.type3_routes + state.routes.type5_routes
            );
            for peer in &state.peers {
                if peer.state == PeerState::Idle {
                    assert_eq!(peer.prefixes_received, 0);
                }
            }
        }
        assert_eq!(state.tick, 500);
        assert!(state.peers.iter().any(|p| p.flap_count > 0));
    }
}
