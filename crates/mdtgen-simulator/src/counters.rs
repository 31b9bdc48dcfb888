//! Counter entities and the shared per-tick update rules.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-open `[min, max)` increment range for monotonic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementRange {
    pub min: u64,
    pub max: u64,
}

impl IncrementRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Draws a delta in `[min, max)`. A degenerate range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}

/// Applies a signed perturbation in `[-magnitude, +magnitude]`, clamped to
/// the `u32` range.
pub fn fluctuate<R: Rng + ?Sized>(value: u32, magnitude: u32, rng: &mut R) -> u32 {
    if magnitude == 0 {
        return value;
    }
    let magnitude = i64::from(magnitude);
    let delta = rng.gen_range(-magnitude..=magnitude);
    (i64::from(value) + delta).clamp(0, i64::from(u32::MAX)) as u32
}

/// VXLAN overlay interface byte counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayCounters {
    pub vni_id: u32,
    pub interface_name: String,
    pub ingress_bytes: u64,
    pub egress_bytes: u64,
}

impl OverlayCounters {
    /// Both counters only ever grow; they saturate instead of wrapping.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        ingress: IncrementRange,
        egress: IncrementRange,
        rng: &mut R,
    ) {
        self.ingress_bytes = self.ingress_bytes.saturating_add(ingress.sample(rng));
        self.egress_bytes = self.egress_bytes.saturating_add(egress.sample(rng));
    }
}

/// Fluctuation bounds for the EVPN route-type counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteFluctuation {
    pub type2: u32,
    pub type3: u32,
    pub type5: u32,
}

/// EVPN route counts by route type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSummary {
    pub type2_routes: u32,
    pub type3_routes: u32,
    pub type5_routes: u32,
    pub total_routes: u32,
}

impl RouteSummary {
    pub fn new(type2_routes: u32, type3_routes: u32, type5_routes: u32) -> Self {
        let mut summary = Self {
            type2_routes,
            type3_routes,
            type5_routes,
            total_routes: 0,
        };
        summary.recompute_total();
        summary
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, bounds: RouteFluctuation, rng: &mut R) {
        self.type2_routes = fluctuate(self.type2_routes, bounds.type2, rng);
        self.type3_routes = fluctuate(self.type3_routes, bounds.type3, rng);
        self.type5_routes = fluctuate(self.type5_routes, bounds.type5, rng);
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total_routes = self
            .type2_routes
            .saturating_add(self.type3_routes)
            .saturating_add(self.type5_routes);
    }
}

/// Administrative state of a VNI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    #[default]
    Up,
    Down,
}

impl SegmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStatus::Up => "Up",
            SegmentStatus::Down => "Down",
        }
    }

    /// 1 = Up, 0 = Down
    pub fn code(&self) -> u32 {
        match self {
            SegmentStatus::Up => 1,
            SegmentStatus::Down => 0,
        }
    }
}

/// Fluctuation bounds for per-VNI counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentFluctuation {
    pub mac: u32,
    pub vtep: u32,
    pub arp: u32,
}

/// Per-VNI state. The status is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VniState {
    pub vni_id: u32,
    pub status: SegmentStatus,
    pub mac_count: u32,
    pub vtep_count: u32,
    pub arp_count: u32,
}

impl VniState {
    pub fn advance<R: Rng + ?Sized>(&mut self, bounds: SegmentFluctuation, rng: &mut R) {
        self.mac_count = fluctuate(self.mac_count, bounds.mac, rng);
        self.vtep_count = fluctuate(self.vtep_count, bounds.vtep, rng);
        self.arp_count = fluctuate(self.arp_count, bounds.arp, rng);
    }
}
