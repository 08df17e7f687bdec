//! Per-edge auxiliary values aligned with a graph's adjacency lists.
//!
//! [`EdgeValues`] is a plain snapshot: one vector per node, index-aligned
//! with that node's neighbour list at the time it was built. It is what the
//! centrality algorithms read and write.
//!
//! [`EdgeArray`] wraps an `EdgeValues` in shared storage and registers a
//! listener on the graph that inserts or removes a slot at the reported
//! index whenever an edge is added or removed, so its shape keeps mirroring
//! the live adjacency.
//!
//! # Ownership
//!
//! The listener only holds a weak handle to the storage and the array holds
//! no reference to the graph. Call [`EdgeArray::detach`] to deregister;
//! dropping an array without detaching leaves an inert listener on the
//! graph.
//!
//! Do not hold a [`EdgeArray::values_mut`] guard across a graph mutation:
//! the listener borrows the same storage when the event fires.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use super::Graph;
use super::events::{EdgeChange, EdgeListener, ListenerId};

/// One value per adjacency slot.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeValues<T> {
    slots: Vec<Vec<T>>,
}

impl<T> EdgeValues<T> {
    /// Apply `f` to every slot, keeping the shape.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> EdgeValues<U> {
        EdgeValues {
            slots: self
                .slots
                .iter()
                .map(|row| row.iter().map(&mut f).collect())
                .collect(),
        }
    }

    /// Like [`EdgeValues::map`], but `None` as soon as `f` yields `None`
    /// for any slot.
    #[must_use]
    pub fn try_map<U>(&self, mut f: impl FnMut(&T) -> Option<U>) -> Option<EdgeValues<U>> {
        let slots = self
            .slots
            .iter()
            .map(|row| row.iter().map(&mut f).collect::<Option<Vec<U>>>())
            .collect::<Option<Vec<_>>>()?;
        Some(EdgeValues { slots })
    }
}

impl<T: Clone> EdgeValues<T> {
    /// Allocate a value for every adjacency slot of `graph`.
    #[must_use]
    pub fn for_graph(graph: &Graph, init: T) -> Self {
        let slots = (0..graph.num_nodes())
            .map(|u| vec![init.clone(); graph.degree(u as u32)])
            .collect();
        Self { slots }
    }

    /// Value at slot `idx` of node `u`.
    #[must_use]
    pub fn get(&self, u: u32, idx: usize) -> Option<&T> {
        self.slots.get(u as usize).and_then(|row| row.get(idx))
    }

    pub fn get_mut(&mut self, u: u32, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(u as usize).and_then(|row| row.get_mut(idx))
    }

    /// Value of the edge `u -> v`, looked up through `graph`'s adjacency.
    #[must_use]
    pub fn edge(&self, graph: &Graph, u: u32, v: u32) -> Option<&T> {
        graph
            .neighbour_index(u, v)
            .and_then(|idx| self.get(u, idx))
    }

    /// Overwrite slot `idx` of node `u`. Out-of-range slots are ignored and
    /// reported as `false`.
    pub fn set(&mut self, u: u32, idx: usize, value: T) -> bool {
        match self.get_mut(u, idx) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// All values of node `u`'s slots.
    #[must_use]
    pub fn node(&self, u: u32) -> &[T] {
        match self.slots.get(u as usize) {
            Some(row) => row,
            None => &[],
        }
    }

    pub fn node_mut(&mut self, u: u32) -> &mut [T] {
        match self.slots.get_mut(u as usize) {
            Some(row) => row,
            None => &mut [],
        }
    }

    pub fn fill(&mut self, value: &T) {
        for row in &mut self.slots {
            for slot in row.iter_mut() {
                slot.clone_from(value);
            }
        }
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.slots.len()
    }

    /// Total number of slots (twice the edge count for undirected graphs).
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// True when every row has the same length as the node's adjacency.
    #[must_use]
    pub fn matches(&self, graph: &Graph) -> bool {
        self.slots.len() == graph.num_nodes()
            && self
                .slots
                .iter()
                .enumerate()
                .all(|(u, row)| row.len() == graph.degree(u as u32))
    }

    fn insert_slots(&mut self, change: &EdgeChange, init: &T) {
        if let Some(row) = self.slots.get_mut(change.u as usize) {
            row.insert(change.u_idx.min(row.len()), init.clone());
        }
        if let (Some(v_idx), Some(row)) = (change.v_idx, self.slots.get_mut(change.v as usize)) {
            row.insert(v_idx.min(row.len()), init.clone());
        }
    }

    fn remove_slots(&mut self, change: &EdgeChange) {
        if let Some(row) = self.slots.get_mut(change.u as usize) {
            if change.u_idx < row.len() {
                row.remove(change.u_idx);
            }
        }
        if let (Some(v_idx), Some(row)) = (change.v_idx, self.slots.get_mut(change.v as usize)) {
            if v_idx < row.len() {
                row.remove(v_idx);
            }
        }
    }
}

struct SlotSync<T> {
    values: Weak<RefCell<EdgeValues<T>>>,
    init: T,
}

impl<T: Clone> EdgeListener for SlotSync<T> {
    fn edge_added(&mut self, _graph: &Graph, change: &EdgeChange) {
        if let Some(values) = self.values.upgrade() {
            values.borrow_mut().insert_slots(change, &self.init);
        }
    }

    fn edge_removed(&mut self, _graph: &Graph, change: &EdgeChange) {
        if let Some(values) = self.values.upgrade() {
            values.borrow_mut().remove_slots(change);
        }
    }
}

/// Edge values kept in shape with a live graph through edge events.
#[derive(Debug)]
pub struct EdgeArray<T> {
    values: Rc<RefCell<EdgeValues<T>>>,
    listener: ListenerId,
}

impl<T: Clone + 'static> EdgeArray<T> {
    /// Build the array from `graph`'s current adjacency and subscribe to its
    /// edge events. Slots created by later insertions start at `init`.
    pub fn attach(graph: &mut Graph, init: T) -> Self {
        let values = Rc::new(RefCell::new(EdgeValues::for_graph(graph, init.clone())));
        let listener = graph.register_listener(Box::new(SlotSync {
            values: Rc::downgrade(&values),
            init,
        }));
        Self { values, listener }
    }

    #[must_use]
    pub fn values(&self) -> Ref<'_, EdgeValues<T>> {
        self.values.borrow()
    }

    #[must_use]
    pub fn values_mut(&self) -> RefMut<'_, EdgeValues<T>> {
        self.values.borrow_mut()
    }

    /// Replace the stored values wholesale (e.g. with a freshly computed
    /// snapshot of the same graph).
    pub fn replace(&self, values: EdgeValues<T>) {
        *self.values.borrow_mut() = values;
    }

    #[must_use]
    pub const fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Deregister from `graph` and return the final values.
    pub fn detach(self, graph: &mut Graph) -> EdgeValues<T> {
        graph.deregister_listener(self.listener);
        match Rc::try_unwrap(self.values) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        }
    }
}
