use serde::Serialize;
use system::Participant;

use crate::allocator::Allocate;
use crate::registry::Registry;

/// Counters shown on the admin page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub joins: usize,
    pub leaves: usize,
    pub frames_relayed: usize,
    pub frames_dropped: usize,
    pub strokes_relayed: usize,
    pub lagging_evictions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomDescription {
    pub participants: Vec<Participant>,
    pub stats: RelayStats,
}

/// Everything the server loop owns. Mutated only from that loop, one command
/// at a time; see `lifecycle` and `relay` for the operations.
pub struct ServerState<A> {
    pub(crate) registry: Registry,
    pub(crate) allocator: A,
    pub(crate) stats: RelayStats,
}

impl<A: Allocate> ServerState<A> {
    pub fn new(allocator: A) -> Self {
        Self {
            registry: Registry::new(),
            allocator,
            stats: RelayStats::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    pub fn describe(&self) -> RoomDescription {
        RoomDescription {
            participants: self.registry.snapshot(None),
            stats: self.stats.clone(),
        }
    }
}
