//! Routing table between shards (spec section 4.3, "Route selection").

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityBand {
    Band1,
    Band2,
    Band3,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub from: u32,
    pub to: u32,
    pub relays: Vec<u32>,
    pub current_load: u32,
    pub capacity: u32,
    pub last_used: u64,
    pub latency_ms: f64,
    pub reliability: f64,
    pub band: PriorityBand,
}

impl Route {
    pub fn direct(from: u32, to: u32, capacity: u32, now: u64) -> Self {
        Self::with_relays(from, to, Vec::new(), capacity, now)
    }

    fn with_relays(from: u32, to: u32, relays: Vec<u32>, capacity: u32, now: u64) -> Self {
        let mut route = Self {
            from,
            to,
            relays,
            current_load: 0,
            capacity,
            last_used: now,
            latency_ms: 0.0,
            reliability: 0.0,
            band: PriorityBand::Band3,
        };
        route.recompute();
        route
    }

    /// A fresh route for `(from, to)` with default metrics (spec section
    /// 4.3, "Route selection"). Pairs more than two shards apart get a
    /// single relay hop at their midpoint shard, satisfying the
    /// invariant that distant pairs are not routed directly (spec
    /// section 3, Route invariant).
    pub fn for_pair(from: u32, to: u32, capacity: u32, now: u64) -> Self {
        let relays = if (from as i64 - to as i64).abs() > 2 {
            vec![(from + to) / 2]
        } else {
            Vec::new()
        };
        Self::with_relays(from, to, relays, capacity, now)
    }

    fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.current_load as f64 / self.capacity as f64
        }
    }

    /// Recompute latency, reliability, and priority band from the
    /// route's current relay count and load (spec section 4.3, "Route
    /// selection"): `base(5ms) + 10ms * |relays| + (load_factor * 50ms
    /// when load_factor > 0.8)`; reliability `0.95 * 0.98^|relays|`,
    /// multiplied by 0.9 when load_factor > 0.9.
    pub fn recompute(&mut self) {
        let load_factor = self.load_factor();
        let relay_count = self.relays.len() as i32;

        let mut latency = 5.0 + 10.0 * relay_count as f64;
        if load_factor > 0.8 {
            latency += load_factor * 50.0;
        }
        self.latency_ms = latency;

        let mut reliability = 0.95 * 0.98_f64.powi(relay_count);
        if load_factor > 0.9 {
            reliability *= 0.9;
        }
        self.reliability = reliability;

        self.band = if self.reliability > 0.9 && self.latency_ms < 50.0 {
            PriorityBand::Band1
        } else if self.reliability > 0.7 && self.latency_ms < 100.0 {
            PriorityBand::Band2
        } else {
            PriorityBand::Band3
        };
    }

    pub fn record_use(&mut self, now: u64) {
        self.current_load += 1;
        self.last_used = now;
        self.recompute();
    }
}

/// Routing table keyed by `(from, to)`. Exactly one route exists per
/// ordered pair at all times (spec section 8, invariant 4).
pub struct RoutingTable {
    routes: DashMap<(u32, u32), Route>,
    default_capacity: u32,
}

impl RoutingTable {
    pub fn new(default_capacity: u32) -> Self {
        Self {
            routes: DashMap::new(),
            default_capacity,
        }
    }

    /// `FindRoute(from, to)`: look up or create a direct route with
    /// default metrics, then record a use against it.
    pub fn find_route(&self, from: u32, to: u32, now: u64) -> Route {
        let mut entry = self
            .routes
            .entry((from, to))
            .or_insert_with(|| Route::for_pair(from, to, self.default_capacity, now));
        entry.record_use(now);
        entry.clone()
    }

    pub fn get(&self, from: u32, to: u32) -> Option<Route> {
        self.routes.get(&(from, to)).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Periodic route updater (spec section 4.3): recompute latency and
    /// reliability for every route, refreshing its priority band.
    pub fn refresh_all(&self) {
        for mut entry in self.routes.iter_mut() {
            entry.recompute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_route_per_pair() {
        let table = RoutingTable::new(10);
        table.find_route(0, 1, 1_000);
        table.find_route(0, 1, 1_001);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn low_load_direct_route_is_band_one() {
        let table = RoutingTable::new(100);
        let route = table.find_route(0, 1, 1_000);
        assert_eq!(route.band, PriorityBand::Band1);
    }

    #[test]
    fn high_load_increases_latency_and_drops_band() {
        let table = RoutingTable::new(10);
        let mut route = None;
        for i in 0..9 {
            route = Some(table.find_route(0, 1, 1_000 + i));
        }
        let route = route.unwrap();
        assert!(route.current_load >= 9);
        assert_ne!(route.band, PriorityBand::Band1);
    }

    #[test]
    fn distant_pairs_get_a_relay_hop() {
        let table = RoutingTable::new(100);
        let near = table.find_route(0, 2, 1_000);
        assert!(near.relays.is_empty());
        let far = table.find_route(0, 5, 1_000);
        assert_eq!(far.relays, vec![2]);
    }

    #[test]
    fn relays_reduce_reliability_geometrically() {
        let mut route = Route::direct(0, 1, 10, 1_000);
        route.relays = vec![7, 8];
        route.recompute();
        let expected = 0.95 * 0.98_f64.powi(2);
        assert!((route.reliability - expected).abs() < 1e-9);
    }
}
