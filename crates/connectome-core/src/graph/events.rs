//! Per-graph edge event bus.
//!
//! Listeners are notified synchronously, in registration order, after a
//! mutation has been committed to the adjacency lists. A listener sees the
//! graph in its post-mutation state and cannot veto or alter the change.
//!
//! Listener ids are allocated per bus, so two graphs never share an id
//! space.

use std::fmt;

use super::Graph;

/// Opaque handle returned by [`Graph::register_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Which kind of edge mutation is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEventKind {
    Added,
    Removed,
}

/// Positions touched by an edge mutation.
///
/// `u_idx` is the slot in `u`'s adjacency list where `v` was inserted (or
/// from where it was removed). For undirected graphs `v_idx` is the mirrored
/// slot in `v`'s list; directed graphs only touch `u`'s list and report
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeChange {
    pub u: u32,
    pub v: u32,
    pub u_idx: usize,
    pub v_idx: Option<usize>,
    pub weight: f32,
}

/// Receives edge notifications from a graph.
///
/// Both methods default to no-ops so a listener only implements the events
/// it cares about.
pub trait EdgeListener {
    fn edge_added(&mut self, _graph: &Graph, _change: &EdgeChange) {}

    fn edge_removed(&mut self, _graph: &Graph, _change: &EdgeChange) {}
}

struct Registration {
    id: ListenerId,
    listener: Box<dyn EdgeListener>,
}

/// Registry of listeners attached to a single graph.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<Registration>,
}

impl EventBus {
    /// Add a listener and return its id.
    pub fn register(&mut self, listener: Box<dyn EdgeListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration { id, listener });
        id
    }

    /// Remove the listener with `id`. Returns false when no such listener
    /// is registered.
    pub fn deregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|reg| reg.id != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Dispatch one event to every listener in registration order.
    pub fn fire(&mut self, kind: EdgeEventKind, graph: &Graph, change: &EdgeChange) {
        for reg in &mut self.listeners {
            match kind {
                EdgeEventKind::Added => reg.listener.edge_added(graph, change),
                EdgeEventKind::Removed => reg.listener.edge_removed(graph, change),
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("next_id", &self.next_id)
            .field(
                "listeners",
                &self.listeners.iter().map(|r| r.id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
