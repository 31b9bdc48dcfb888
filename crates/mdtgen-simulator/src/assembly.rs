//! Maps simulation state onto `Telemetry` messages, one per sensor path.

use crate::counters::{OverlayCounters, RouteSummary, VniState};
use crate::peer::BgpPeer;
use crate::simulation::SimulationState;
use mdtgen_wire::{Telemetry, TelemetryField};

/// Telemetry categories, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    VxlanStats,
    BgpNeighbors,
    EvpnRoutes,
    VniState,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::VxlanStats,
        Category::BgpNeighbors,
        Category::EvpnRoutes,
        Category::VniState,
    ];

    pub fn subscription_id(&self) -> &'static str {
        match self {
            Category::VxlanStats => "vxlan_stats",
            Category::BgpNeighbors => "bgp_neighbors",
            Category::EvpnRoutes => "evpn_routes",
            Category::VniState => "vni_state",
        }
    }

    pub fn encoding_path(&self) -> &'static str {
        match self {
            Category::VxlanStats => "Cisco-NX-OS-device:System/vxlan-items/inst-items",
            Category::BgpNeighbors => {
                "Cisco-NX-OS-device:System/bgp-items/inst-items/dom-items/Dom-list/peer-items/Peer-list"
            }
            Category::EvpnRoutes => "Cisco-NX-OS-device:System/evpn-items/bdevi-items/BDEvi-list",
            Category::VniState => {
                "Cisco-NX-OS-device:System/eps-items/epId-items/Ep-list/nws-items/vni-items/Nw-list"
            }
        }
    }
}

/// Per-tick envelope metadata shared by every category.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub node_id: &'a str,
    /// Tick time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub collection_id: u64,
}

impl ReportContext<'_> {
    fn envelope(&self, category: Category, rows: Vec<TelemetryField>) -> Telemetry {
        Telemetry {
            node_id: self.node_id.to_string(),
            subscription_id: category.subscription_id().to_string(),
            encoding_path: category.encoding_path().to_string(),
            collection_id: self.collection_id,
            collection_start_time: self.timestamp_ms,
            msg_timestamp: self.timestamp_ms,
            collection_end_time: self.timestamp_ms,
            data_gpbkv: rows,
        }
    }
}

pub fn build_vxlan_telemetry(overlay: &OverlayCounters, ctx: &ReportContext<'_>) -> Telemetry {
    let ts = ctx.timestamp_ms;
    let row = TelemetryField::row(
        vec![
            TelemetryField::leaf("vni-id", overlay.vni_id, ts),
            TelemetryField::leaf("name", overlay.interface_name.as_str(), ts),
        ],
        vec![
            TelemetryField::leaf("ingress-bytes", overlay.ingress_bytes, ts),
            TelemetryField::leaf("egress-bytes", overlay.egress_bytes, ts),
        ],
        ts,
    );
    ctx.envelope(Category::VxlanStats, vec![row])
}

pub fn build_bgp_telemetry(peers: &[BgpPeer], ctx: &ReportContext<'_>) -> Telemetry {
    let ts = ctx.timestamp_ms;
    let rows = peers
        .iter()
        .map(|peer| {
            TelemetryField::row(
                vec![
                    TelemetryField::leaf("neighbor-address", peer.address.as_str(), ts),
                    TelemetryField::leaf("remote-as", peer.remote_as, ts),
                ],
                vec![
                    TelemetryField::leaf("state", peer.state.as_str(), ts),
                    TelemetryField::leaf("state-code", peer.state.code(), ts),
                    TelemetryField::leaf("prefixes-received", peer.prefixes_received, ts),
                    TelemetryField::leaf("prefixes-sent", peer.prefixes_sent, ts),
                    TelemetryField::leaf("uptime-seconds", peer.uptime_secs, ts),
                    TelemetryField::leaf("flap-count", peer.flap_count, ts),
                ],
                ts,
            )
        })
        .collect();
    ctx.envelope(Category::BgpNeighbors, rows)
}

pub fn build_evpn_telemetry(routes: &RouteSummary, ctx: &ReportContext<'_>) -> Telemetry {
    let ts = ctx.timestamp_ms;
    let row = TelemetryField::row(
        vec![TelemetryField::leaf("address-family", "l2vpn-evpn", ts)],
        vec![
            TelemetryField::leaf("type2-routes", routes.type2_routes, ts),
            TelemetryField::leaf("type3-routes", routes.type3_routes, ts),
            TelemetryField::leaf("type5-routes", routes.type5_routes, ts),
            TelemetryField::leaf("total-routes", routes.total_routes, ts),
        ],
        ts,
    );
    ctx.envelope(Category::EvpnRoutes, vec![row])
}

pub fn build_vni_telemetry(vnis: &[VniState], ctx: &ReportContext<'_>) -> Telemetry {
    let ts = ctx.timestamp_ms;
    let rows = vnis
        .iter()
        .map(|vni| {
            TelemetryField::row(
                vec![TelemetryField::leaf("vni-id", vni.vni_id, ts)],
                vec![
                    TelemetryField::leaf("state", vni.status.as_str(), ts),
                    TelemetryField::leaf("state-code", vni.status.code(), ts),
                    TelemetryField::leaf("mac-count", vni.mac_count, ts),
                    TelemetryField::leaf("vtep-count", vni.vtep_count, ts),
                    TelemetryField::leaf("arp-count", vni.arp_count, ts),
                ],
                ts,
            )
        })
        .collect();
    ctx.envelope(Category::VniState, rows)
}

/// All four messages for a tick, in [`Category::ALL`] order.
pub fn build_all(state: &SimulationState, ctx: &ReportContext<'_>) -> Vec<Telemetry> {
    vec![
        build_vxlan_telemetry(&state.overlay, ctx),
        build_bgp_telemetry(&state.peers, ctx),
        build_evpn_telemetry(&state.routes, ctx),
        build_vni_telemetry(&state.vnis, ctx),
    ]
}
