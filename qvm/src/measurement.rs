//! Measurement engine
//!
//! Collapsing measurements delegate to the state vector and append to the
//! history; non-collapsing measurements sample the marginal without touching
//! the state. Multi-shot sampling builds a probability mass function over
//! the projected sub-bitstrings once and draws from its cumulative
//! distribution, so the state is never mutated no matter how many shots.
//!
//! Bit-string convention: handles are ordered by ascending bit position and
//! printed most-significant first, matching the basis-index encoding.

use crate::error::{Result, VmError};
use crate::qubit::QubitHandle;
use crate::registry::QubitRegistry;
use ahash::AHashMap;
use qvm_state::StateVector;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::time::Instant;

/// Amplitudes with squared magnitude below this are skipped when building
/// the sampling distribution
pub const SAMPLE_EPSILON: f64 = 1e-6;

/// One recorded measurement outcome
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementRecord {
    /// Measured qubit
    pub handle: QubitHandle,
    /// Observed value, 0 or 1
    pub outcome: u8,
    /// Monotonic timestamp, nanoseconds since the engine was created
    pub timestamp_ns: u128,
}

/// Aggregate measurement counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MeasurementMetrics {
    /// Total outcomes drawn (collapsing and non-collapsing)
    pub total: u64,
    /// Outcomes that read 0
    pub zeros: u64,
    /// Outcomes that read 1
    pub ones: u64,
}

impl MeasurementMetrics {
    fn record(&mut self, outcome: u8) {
        self.total += 1;
        if outcome == 0 {
            self.zeros += 1;
        } else {
            self.ones += 1;
        }
    }
}

/// Computes probabilities, samples outcomes and keeps the measurement log
#[derive(Debug)]
pub struct MeasurementEngine {
    outcomes: AHashMap<QubitHandle, u8>,
    history: Vec<MeasurementRecord>,
    metrics: MeasurementMetrics,
    epoch: Instant,
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            outcomes: AHashMap::new(),
            history: Vec::new(),
            metrics: MeasurementMetrics::default(),
            epoch: Instant::now(),
        }
    }

    /// Measure one qubit
    ///
    /// Collapsing measurements project the state and are recorded in the
    /// per-handle store and the history; non-collapsing measurements sample
    /// the marginal distribution and leave the state untouched. Both consume
    /// exactly one uniform draw and update the metrics.
    pub fn measure(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        rng: &mut StdRng,
        handle: QubitHandle,
        collapsing: bool,
    ) -> Result<u8> {
        let qubit = registry.index_of(handle)?;
        let u: f64 = rng.gen();

        let outcome = if collapsing {
            let outcome = state.measure_qubit(qubit, u)?;
            self.outcomes.insert(handle, outcome);
            self.history.push(MeasurementRecord {
                handle,
                outcome,
                timestamp_ns: self.epoch.elapsed().as_nanos(),
            });
            outcome
        } else {
            let prob_zero = state.marginal_probability(qubit, 0)?;
            if u < prob_zero {
                0
            } else {
                1
            }
        };

        self.metrics.record(outcome);
        Ok(outcome)
    }

    /// Measure several qubits in order
    ///
    /// For collapsing measurements, later qubits see the state collapsed by
    /// earlier ones.
    pub fn measure_many(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        rng: &mut StdRng,
        handles: &[QubitHandle],
        collapsing: bool,
    ) -> Result<Vec<u8>> {
        handles
            .iter()
            .map(|&h| self.measure(state, registry, rng, h, collapsing))
            .collect()
    }

    /// Marginal probability that `handle` reads `value`
    pub fn probability(
        &self,
        state: &StateVector,
        registry: &QubitRegistry,
        handle: QubitHandle,
        value: u8,
    ) -> Result<f64> {
        if value > 1 {
            return Err(VmError::InvalidArgument(format!(
                "measurement value must be 0 or 1, got {value}"
            )));
        }
        let qubit = registry.index_of(handle)?;
        Ok(state.marginal_probability(qubit, value)?)
    }

    /// Joint probability that every (handle, value) pair holds at once
    ///
    /// An empty constraint list yields 1.0.
    pub fn joint_probability(
        &self,
        state: &StateVector,
        registry: &QubitRegistry,
        constraints: &[(QubitHandle, u8)],
    ) -> Result<f64> {
        if constraints.is_empty() {
            return Ok(1.0);
        }

        let mut mask = 0usize;
        let mut wanted = 0usize;
        for &(handle, value) in constraints {
            if value > 1 {
                return Err(VmError::InvalidArgument(format!(
                    "measurement value must be 0 or 1, got {value}"
                )));
            }
            let qubit = registry.index_of(handle)?;
            let bit = 1usize << qubit;
            // Contradictory constraints on the same qubit have no support
            if mask & bit != 0 && (wanted & bit != 0) != (value == 1) {
                return Ok(0.0);
            }
            mask |= bit;
            if value == 1 {
                wanted |= bit;
            }
        }

        Ok(state
            .amplitudes()
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask == wanted)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    /// Measure every live qubit, collapsing
    ///
    /// # Returns
    /// The outcome bit string with handles ordered by ascending bit
    /// position, most-significant first.
    pub fn measure_all(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        rng: &mut StdRng,
    ) -> Result<String> {
        let handles = registry.handles();
        let outcomes = self.measure_many(state, registry, rng, &handles, true)?;
        Ok(outcomes
            .iter()
            .rev()
            .map(|&bit| if bit == 0 { '0' } else { '1' })
            .collect())
    }

    /// Draw `shots` independent samples of the chosen qubits without
    /// mutating the state
    ///
    /// `handles = None` samples every live qubit. The result maps outcome
    /// bit strings (same ordering as [`measure_all`](Self::measure_all)) to
    /// observation counts.
    pub fn sample(
        &self,
        state: &StateVector,
        registry: &QubitRegistry,
        rng: &mut StdRng,
        shots: usize,
        handles: Option<&[QubitHandle]>,
    ) -> Result<AHashMap<String, usize>> {
        if shots == 0 {
            return Err(VmError::InvalidArgument(
                "shots must be positive".to_string(),
            ));
        }

        let chosen: Vec<QubitHandle> = match handles {
            Some(list) => list.to_vec(),
            None => registry.handles(),
        };
        let mut positions = Vec::with_capacity(chosen.len());
        for &handle in &chosen {
            positions.push(registry.index_of(handle)?);
        }

        // Project each contributing basis state onto the chosen bits and
        // accumulate the mass function, skipping near-zero amplitudes.
        let mut pmf: AHashMap<u64, f64> = AHashMap::new();
        for (index, amp) in state.amplitudes().iter().enumerate() {
            let p = amp.norm_sqr();
            if p < SAMPLE_EPSILON {
                continue;
            }
            let mut key = 0u64;
            for (bit, &pos) in positions.iter().enumerate() {
                key |= (((index >> pos) & 1) as u64) << bit;
            }
            *pmf.entry(key).or_insert(0.0) += p;
        }

        let mut distribution: Vec<(u64, f64)> = pmf.into_iter().collect();
        distribution.sort_unstable_by_key(|&(key, _)| key);
        let total_mass: f64 = distribution.iter().map(|&(_, p)| p).sum();

        let mut histogram: AHashMap<String, usize> = AHashMap::new();
        for _ in 0..shots {
            let u: f64 = rng.gen::<f64>() * total_mass;
            let mut cumulative = 0.0;
            let mut drawn = distribution.last().map(|&(key, _)| key).unwrap_or(0);
            for &(key, p) in &distribution {
                cumulative += p;
                if u < cumulative {
                    drawn = key;
                    break;
                }
            }
            let label: String = (0..positions.len())
                .rev()
                .map(|bit| if (drawn >> bit) & 1 == 0 { '0' } else { '1' })
                .collect();
            *histogram.entry(label).or_insert(0) += 1;
        }

        Ok(histogram)
    }

    /// Pack stored outcomes into an integer, LSB-first over `handles`
    ///
    /// # Errors
    /// [`VmError::MissingOutcome`] when any handle has never been measured.
    pub fn outcomes_as_integer(&self, handles: &[QubitHandle]) -> Result<u64> {
        let mut value = 0u64;
        for (bit, &handle) in handles.iter().enumerate() {
            let outcome = self
                .outcomes
                .get(&handle)
                .copied()
                .ok_or(VmError::MissingOutcome(handle))?;
            value |= (outcome as u64) << bit;
        }
        Ok(value)
    }

    /// Most recent outcome for a handle, if any
    pub fn outcome_of(&self, handle: QubitHandle) -> Option<u8> {
        self.outcomes.get(&handle).copied()
    }

    /// Append-only measurement history
    pub fn history(&self) -> &[MeasurementRecord] {
        &self.history
    }

    /// Aggregate counters
    pub fn metrics(&self) -> MeasurementMetrics {
        self.metrics
    }

    /// Clear outcomes, history and metrics
    pub fn reset(&mut self) {
        self.outcomes.clear();
        self.history.clear();
        self.metrics = MeasurementMetrics::default();
    }
}
