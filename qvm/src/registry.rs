//! Qubit registry: handle↔position map and entanglement bookkeeping
//!
//! Handles are random tokens; only the registry knows which state-vector bit
//! each one owns. Bit positions come from a monotonic counter and are never
//! reused after deallocation, so the state vector only ever grows.
//!
//! Entanglement sets are equivalence classes over handles maintained with a
//! union-find forest: `record_entanglement` unions two classes, and
//! membership survives deallocation of intermediate handles (dead handles
//! stay in the forest as internal links but drop out of every query).

use crate::error::{Result, VmError};
use crate::qubit::QubitHandle;
use ahash::AHashMap;
use qvm_state::StateVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Handle↔bit-position map with entanglement tracking
#[derive(Debug)]
pub struct QubitRegistry {
    max_qubits: usize,
    positions: AHashMap<QubitHandle, usize>,
    parent: AHashMap<QubitHandle, QubitHandle>,
    // Token generator; deliberately not the VM's seeded measurement stream,
    // so seeding a VM fixes measurement statistics without fixing handles.
    token_rng: StdRng,
}

impl QubitRegistry {
    /// Create a registry allowing at most `max_qubits` live handles
    pub fn new(max_qubits: usize) -> Self {
        Self {
            max_qubits,
            positions: AHashMap::new(),
            parent: AHashMap::new(),
            token_rng: StdRng::from_entropy(),
        }
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no handles are live
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Allocate a qubit: doubles the state vector and returns a fresh handle
    ///
    /// # Errors
    /// [`VmError::CapacityExceeded`] when the live-handle limit is reached;
    /// state-vector failures propagate. Nothing is mutated on failure.
    pub fn allocate(&mut self, state: &mut StateVector) -> Result<QubitHandle> {
        if self.positions.len() >= self.max_qubits {
            return Err(VmError::CapacityExceeded {
                limit: self.max_qubits,
            });
        }

        let position = state.allocate()?;
        let handle = QubitHandle::from_raw(self.token_rng.gen());
        self.positions.insert(handle, position);
        self.parent.insert(handle, handle);
        Ok(handle)
    }

    /// Allocate `count` qubits at once
    ///
    /// # Errors
    /// `count == 0` is an invalid argument. A capacity failure partway
    /// through leaves the earlier allocations in place and reports the error.
    pub fn allocate_many(
        &mut self,
        state: &mut StateVector,
        count: usize,
    ) -> Result<Vec<QubitHandle>> {
        if count == 0 {
            return Err(VmError::InvalidArgument(
                "cannot allocate zero qubits".to_string(),
            ));
        }
        let mut handles = Vec::with_capacity(count);
        for _ in 0..count {
            handles.push(self.allocate(state)?);
        }
        Ok(handles)
    }

    /// Release a handle
    ///
    /// Returns false when the handle is unknown (already released or never
    /// allocated); this is an indicator, not an error. Releasing a handle
    /// that is entangled with others logs a warning but proceeds. The state
    /// vector is not shrunk and the bit position is not recycled.
    pub fn deallocate(&mut self, handle: QubitHandle) -> bool {
        if !self.positions.contains_key(&handle) {
            return false;
        }

        let partners = self.entangled_with(handle).unwrap_or_default();
        if !partners.is_empty() {
            warn!(
                handle = %handle,
                partners = partners.len(),
                "releasing a qubit that is entangled with live qubits"
            );
        }

        self.positions.remove(&handle);
        // The forest keeps the dead handle as an internal link so the
        // remaining members of its class stay connected.
        true
    }

    /// Bit position of a handle
    pub fn index_of(&self, handle: QubitHandle) -> Result<usize> {
        self.positions
            .get(&handle)
            .copied()
            .ok_or(VmError::UnknownHandle(handle))
    }

    /// All live handles, ordered by ascending bit position
    pub fn handles(&self) -> Vec<QubitHandle> {
        let mut all: Vec<(usize, QubitHandle)> = self
            .positions
            .iter()
            .map(|(&h, &pos)| (pos, h))
            .collect();
        all.sort_unstable_by_key(|&(pos, _)| pos);
        all.into_iter().map(|(_, h)| h).collect()
    }

    fn root(&self, handle: QubitHandle) -> QubitHandle {
        let mut current = handle;
        while let Some(&next) = self.parent.get(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn compress(&mut self, handle: QubitHandle) -> QubitHandle {
        let root = self.root(handle);
        let mut current = handle;
        while current != root {
            let next = self.parent[&current];
            self.parent.insert(current, root);
            current = next;
        }
        root
    }

    /// Merge the entanglement classes of two handles
    ///
    /// Called by the executor for every multi-qubit gate. Purely
    /// bookkeeping: the numerics never consult the classes.
    pub fn record_entanglement(&mut self, a: QubitHandle, b: QubitHandle) -> Result<()> {
        self.index_of(a)?;
        self.index_of(b)?;

        let root_a = self.compress(a);
        let root_b = self.compress(b);
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
        Ok(())
    }

    /// Whether two handles share an entanglement class
    ///
    /// Reflexive, symmetric and transitive over recorded gates.
    pub fn are_entangled(&self, a: QubitHandle, b: QubitHandle) -> Result<bool> {
        self.index_of(a)?;
        self.index_of(b)?;
        Ok(self.root(a) == self.root(b))
    }

    /// Live handles entangled with `handle`, excluding itself
    ///
    /// The member list is derived lazily from the forest rather than stored.
    pub fn entangled_with(&self, handle: QubitHandle) -> Result<Vec<QubitHandle>> {
        self.index_of(handle)?;
        let root = self.root(handle);

        let mut members: Vec<(usize, QubitHandle)> = self
            .positions
            .iter()
            .filter(|(&h, _)| h != handle && self.root(h) == root)
            .map(|(&h, &pos)| (pos, h))
            .collect();
        members.sort_unstable_by_key(|&(pos, _)| pos);
        Ok(members.into_iter().map(|(_, h)| h).collect())
    }

    /// Drop all handles, classes and the position counter
    pub fn reset(&mut self) {
        self.positions.clear();
        self.parent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(max: usize) -> (QubitRegistry, StateVector) {
        (QubitRegistry::new(max), StateVector::new(max))
    }

    #[test]
    fn test_allocation_assigns_monotonic_positions() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        let b = registry.allocate(&mut state).unwrap();
        assert_eq!(registry.index_of(a).unwrap(), 0);
        assert_eq!(registry.index_of(b).unwrap(), 1);
        assert_eq!(state.dimension(), 4);
    }

    #[test]
    fn test_capacity_limit() {
        let (mut registry, mut state) = setup(2);
        registry.allocate(&mut state).unwrap();
        registry.allocate(&mut state).unwrap();
        let err = registry.allocate(&mut state).unwrap_err();
        assert_eq!(err, VmError::CapacityExceeded { limit: 2 });
        // The refused allocation must leave the state vector alone
        assert_eq!(state.dimension(), 4);
    }

    #[test]
    fn test_allocate_many_rejects_zero() {
        let (mut registry, mut state) = setup(2);
        assert!(matches!(
            registry.allocate_many(&mut state, 0),
            Err(VmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_positions_not_reused_after_deallocation() {
        let (mut registry, mut state) = setup(8);
        let a = registry.allocate(&mut state).unwrap();
        assert!(registry.deallocate(a));
        let b = registry.allocate(&mut state).unwrap();
        // The freed position 0 is not recycled
        assert_eq!(registry.index_of(b).unwrap(), 1);
        assert_eq!(state.num_qubits(), 2);
    }

    #[test]
    fn test_deallocate_unknown_returns_false() {
        let (mut registry, _) = setup(2);
        assert!(!registry.deallocate(QubitHandle::from_raw(42)));
    }

    #[test]
    fn test_entanglement_reflexive_symmetric_transitive() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        let b = registry.allocate(&mut state).unwrap();
        let c = registry.allocate(&mut state).unwrap();

        assert!(registry.are_entangled(a, a).unwrap());
        assert!(!registry.are_entangled(a, b).unwrap());

        registry.record_entanglement(a, b).unwrap();
        assert!(registry.are_entangled(a, b).unwrap());
        assert!(registry.are_entangled(b, a).unwrap());

        registry.record_entanglement(b, c).unwrap();
        assert!(registry.are_entangled(a, c).unwrap());
    }

    #[test]
    fn test_entangled_with_excludes_self() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        let b = registry.allocate(&mut state).unwrap();
        let c = registry.allocate(&mut state).unwrap();
        registry.record_entanglement(a, b).unwrap();
        registry.record_entanglement(b, c).unwrap();

        let partners = registry.entangled_with(b).unwrap();
        assert_eq!(partners.len(), 2);
        assert!(!partners.contains(&b));
        assert!(partners.contains(&a));
        assert!(partners.contains(&c));
    }

    #[test]
    fn test_class_survives_member_deallocation() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        let b = registry.allocate(&mut state).unwrap();
        let c = registry.allocate(&mut state).unwrap();
        registry.record_entanglement(a, b).unwrap();
        registry.record_entanglement(b, c).unwrap();

        // b may be the link between a and c; the class must survive it
        registry.deallocate(b);
        assert!(registry.are_entangled(a, c).unwrap());
        let partners = registry.entangled_with(a).unwrap();
        assert_eq!(partners, vec![c]);
    }

    #[test]
    fn test_queries_on_unknown_handle_fail() {
        let (mut registry, mut state) = setup(2);
        let a = registry.allocate(&mut state).unwrap();
        let ghost = QubitHandle::from_raw(7);
        assert!(matches!(
            registry.are_entangled(a, ghost),
            Err(VmError::UnknownHandle(_))
        ));
        assert!(matches!(
            registry.record_entanglement(ghost, a),
            Err(VmError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        registry.reset();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.index_of(a),
            Err(VmError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_handles_ordered_by_position() {
        let (mut registry, mut state) = setup(4);
        let a = registry.allocate(&mut state).unwrap();
        let b = registry.allocate(&mut state).unwrap();
        let c = registry.allocate(&mut state).unwrap();
        assert_eq!(registry.handles(), vec![a, b, c]);
    }
}
