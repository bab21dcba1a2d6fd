//! Path resolution over the cable graph
//!
//! Routes are computed once, when a ping or handshake is requested. A packet
//! keeps the route it was launched with even if cables change while it is in
//! flight.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::RoutingError;
use crate::identity::DeviceId;
use crate::traits::NetworkTopology;

/// An ordered hop list from source to destination, both inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DeviceId>", into = "Vec<DeviceId>")]
pub struct Route(Vec<DeviceId>);

impl TryFrom<Vec<DeviceId>> for Route {
    type Error = &'static str;

    fn try_from(hops: Vec<DeviceId>) -> Result<Self, Self::Error> {
        Route::new(hops).ok_or("route must contain at least one device")
    }
}

impl From<Route> for Vec<DeviceId> {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl Route {
    /// Wrap an explicit hop list; returns `None` when empty
    pub fn new(hops: Vec<DeviceId>) -> Option<Self> {
        if hops.is_empty() { None } else { Some(Self(hops)) }
    }

    /// A direct single-cable route
    pub fn direct(from: DeviceId, to: DeviceId) -> Self {
        Self(vec![from, to])
    }

    pub fn hops(&self) -> &[DeviceId] {
        &self.0
    }

    pub fn source(&self) -> DeviceId {
        self.0[0]
    }

    pub fn destination(&self) -> DeviceId {
        self.0[self.0.len() - 1]
    }

    /// Number of cables the route crosses
    pub fn segment_count(&self) -> usize {
        self.0.len() - 1
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        self.0.contains(&device)
    }

    /// Every consecutive pair is a direct cable in `topology`
    pub fn is_walkable<T: NetworkTopology + ?Sized>(&self, topology: &T) -> bool {
        self.0.windows(2).all(|pair| topology.are_connected(pair[0], pair[1]))
    }

    pub fn into_hops(self) -> Vec<DeviceId> {
        self.0
    }
}

/// True iff a cable joins `a` and `b` directly
pub fn is_connected<T: NetworkTopology + ?Sized>(topology: &T, a: DeviceId, b: DeviceId) -> bool {
    topology.are_connected(a, b)
}

/// Shortest route from `from` to `to`, or `None` when unreachable
///
/// Breadth-first search; neighbours are expanded in cable-insertion order so
/// the result is deterministic for a given editing history.
pub fn find_path<T: NetworkTopology + ?Sized>(topology: &T, from: DeviceId, to: DeviceId) -> Option<Route> {
    resolve(topology, from, to).ok()
}

/// Like [`find_path`] but says why no route was found
pub fn resolve<T: NetworkTopology + ?Sized>(
    topology: &T,
    from: DeviceId,
    to: DeviceId,
) -> Result<Route, RoutingError> {
    if !topology.contains(from) {
        return Err(RoutingError::UnknownDevice(from));
    }
    if !topology.contains(to) {
        return Err(RoutingError::UnknownDevice(to));
    }
    if from == to {
        return Ok(Route(vec![from]));
    }

    let mut parent: HashMap<DeviceId, DeviceId> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    parent.insert(from, from);

    while let Some(current) = queue.pop_front() {
        for next in topology.neighbors(current) {
            if parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, current);
            if next == to {
                let route = walk_back(&parent, from, to);
                trace!(%from, %to, hops = route.len(), "route resolved");
                return Ok(Route(route));
            }
            queue.push_back(next);
        }
    }

    Err(RoutingError::Unreachable { from, to })
}

fn walk_back(parent: &HashMap<DeviceId, DeviceId>, from: DeviceId, to: DeviceId) -> Vec<DeviceId> {
    let mut hops = vec![to];
    let mut cursor = to;
    while cursor != from {
        cursor = parent[&cursor];
        hops.push(cursor);
    }
    hops.reverse();
    hops
}
