//! Growable dense state vector
//!
//! The vector starts at zero qubits (a single unit amplitude) and doubles on
//! every allocation, with the fresh qubit in |0⟩. Basis index i encodes
//! |b_{n-1}…b_0⟩ with qubit k at bit k, so qubit 0 is the least-significant
//! bit; this convention is observable through measurement bit-string order
//! and is fixed.

use crate::error::{Result, StateError};
use crate::kernels;
use crate::prob_cache::ProbabilityCache;
use num_complex::Complex64;
use qvm_gates::matrices::{Matrix2, Matrix4};
use tracing::warn;

/// Default upper bound on allocated qubits
pub const DEFAULT_MAX_QUBITS: usize = 32;

/// Default numeric precision for normalization checks
pub const DEFAULT_PRECISION: f64 = 1e-10;

/// Qubit count above which the generic kernels split across threads
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 14;

/// Dense amplitude vector with in-place gate kernels
///
/// # Example
///
/// ```
/// use qvm_state::StateVector;
/// use qvm_gates::matrices;
///
/// let mut state = StateVector::new(4);
/// state.allocate().unwrap();
/// state.apply_single_qubit_gate(0, &matrices::HADAMARD).unwrap();
/// assert!(state.is_normalized());
/// ```
#[derive(Debug)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
    max_qubits: usize,
    precision: f64,
    parallel_threshold: usize,
    cache: ProbabilityCache,
}

impl StateVector {
    /// Create an empty register (zero qubits) bounded by `max_qubits`
    pub fn new(max_qubits: usize) -> Self {
        Self {
            amplitudes: vec![Complex64::new(1.0, 0.0)],
            num_qubits: 0,
            max_qubits,
            precision: DEFAULT_PRECISION,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cache: ProbabilityCache::default(),
        }
    }

    /// Set the normalization precision
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Set the qubit count above which kernels run in parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Number of allocated qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// State dimension (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Configured qubit limit
    #[inline]
    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    /// Configured precision
    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Read-only view of the amplitudes
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Copy of the amplitudes, for external inspection
    pub fn snapshot(&self) -> Vec<Complex64> {
        self.amplitudes.clone()
    }

    /// Allocate one more qubit, doubling the vector
    ///
    /// The upper half is zero-filled, so the new qubit starts in |0⟩. The
    /// reservation happens before any amplitude is written: on failure the
    /// state is untouched.
    ///
    /// # Returns
    /// The bit position assigned to the new qubit.
    ///
    /// # Errors
    /// [`StateError::CapacityExceeded`] at the qubit limit,
    /// [`StateError::AllocationError`] if the reservation fails.
    pub fn allocate(&mut self) -> Result<usize> {
        if self.num_qubits >= self.max_qubits {
            return Err(StateError::CapacityExceeded {
                limit: self.max_qubits,
            });
        }

        let old_len = self.amplitudes.len();
        self.amplitudes
            .try_reserve_exact(old_len)
            .map_err(|_| StateError::AllocationError {
                bytes: old_len * std::mem::size_of::<Complex64>(),
            })?;
        self.amplitudes
            .resize(old_len * 2, Complex64::new(0.0, 0.0));

        let position = self.num_qubits;
        self.num_qubits += 1;
        self.cache.invalidate();
        Ok(position)
    }

    fn validate_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    fn validate_distinct(&self, qubits: &[usize]) -> Result<()> {
        for (i, &a) in qubits.iter().enumerate() {
            self.validate_qubit(a)?;
            if qubits[i + 1..].contains(&a) {
                return Err(StateError::IdenticalQubits { index: a });
            }
        }
        Ok(())
    }

    #[inline]
    fn parallel(&self) -> bool {
        self.num_qubits >= self.parallel_threshold
    }

    /// Apply a 2×2 unitary to bit position `qubit`
    pub fn apply_single_qubit_gate(&mut self, qubit: usize, matrix: &Matrix2) -> Result<()> {
        self.validate_qubit(qubit)?;
        let parallel = self.parallel();
        kernels::apply_single_qubit_gate(&mut self.amplitudes, matrix, qubit, parallel);
        self.cache.invalidate();
        Ok(())
    }

    /// Apply a 4×4 unitary to the (control, target) pair
    pub fn apply_two_qubit_gate(
        &mut self,
        control: usize,
        target: usize,
        matrix: &Matrix4,
    ) -> Result<()> {
        self.validate_distinct(&[control, target])?;
        let parallel = self.parallel();
        kernels::apply_two_qubit_gate(&mut self.amplitudes, matrix, control, target, parallel);
        self.cache.invalidate();
        Ok(())
    }

    /// CNOT fast path: amplitude swaps only
    pub fn apply_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.validate_distinct(&[control, target])?;
        kernels::apply_cnot(&mut self.amplitudes, control, target);
        self.cache.invalidate();
        Ok(())
    }

    /// CZ fast path: single phase flip per |11⟩ pair
    pub fn apply_cz(&mut self, a: usize, b: usize) -> Result<()> {
        self.validate_distinct(&[a, b])?;
        kernels::apply_cz(&mut self.amplitudes, a, b);
        self.cache.invalidate();
        Ok(())
    }

    /// SWAP fast path
    pub fn apply_swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.validate_distinct(&[a, b])?;
        kernels::apply_swap(&mut self.amplitudes, a, b);
        self.cache.invalidate();
        Ok(())
    }

    /// Toffoli fast path
    pub fn apply_toffoli(&mut self, c1: usize, c2: usize, target: usize) -> Result<()> {
        self.validate_distinct(&[c1, c2, target])?;
        kernels::apply_toffoli(&mut self.amplitudes, c1, c2, target);
        self.cache.invalidate();
        Ok(())
    }

    /// Fredkin (controlled SWAP) fast path
    pub fn apply_fredkin(&mut self, control: usize, a: usize, b: usize) -> Result<()> {
        self.validate_distinct(&[control, a, b])?;
        kernels::apply_fredkin(&mut self.amplitudes, control, a, b);
        self.cache.invalidate();
        Ok(())
    }

    /// Controlled arbitrary 2×2 fast path
    pub fn apply_controlled_u(
        &mut self,
        control: usize,
        target: usize,
        u: &Matrix2,
    ) -> Result<()> {
        self.validate_distinct(&[control, target])?;
        kernels::apply_controlled_u(&mut self.amplitudes, control, target, u);
        self.cache.invalidate();
        Ok(())
    }

    /// Marginal probability of reading `value` on bit position `qubit`
    pub fn marginal_probability(&self, qubit: usize, value: u8) -> Result<f64> {
        self.validate_qubit(qubit)?;
        let mask = 1usize << qubit;
        let wanted = if value == 0 { 0 } else { mask };
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask == wanted)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    /// Measure bit position `qubit` and collapse the state
    ///
    /// `random_value` is the caller's uniform draw from [0, 1): the outcome
    /// is 0 iff it falls below the marginal probability of |0⟩. Amplitudes on
    /// the non-selected half are zeroed and the survivors divided by the
    /// square root of the chosen branch probability.
    ///
    /// Collapsing onto a branch whose probability is below the configured
    /// precision logs a warning; the collapse still proceeds.
    pub fn measure_qubit(&mut self, qubit: usize, random_value: f64) -> Result<u8> {
        self.validate_qubit(qubit)?;

        let prob_zero = self.marginal_probability(qubit, 0)?;
        let outcome: u8 = if random_value < prob_zero { 0 } else { 1 };
        // Clamp away negative float residue before the square root
        let chosen = if outcome == 0 {
            prob_zero
        } else {
            (1.0 - prob_zero).max(0.0)
        };

        if chosen < self.precision {
            warn!(
                qubit,
                probability = chosen,
                "collapsing onto a near-null measurement branch"
            );
        }

        let inv_norm = 1.0 / chosen.sqrt();
        let mask = 1usize << qubit;
        let wanted = if outcome == 0 { 0 } else { mask };

        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == wanted {
                *amp *= inv_norm;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }

        self.cache.invalidate();
        Ok(outcome)
    }

    /// Probability of basis state `index`, cached
    pub fn probability(&mut self, index: usize) -> Result<f64> {
        if index >= self.amplitudes.len() {
            return Err(StateError::InvalidBasisState {
                index,
                dimension: self.amplitudes.len(),
            });
        }
        let amplitudes = &self.amplitudes;
        Ok(self
            .cache
            .get_or_compute(index, || amplitudes[index].norm_sqr()))
    }

    /// Probabilities of all basis states
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// L2 norm of the state
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Whether |norm − 1| is within the configured precision
    pub fn is_normalized(&self) -> bool {
        (self.norm() - 1.0).abs() <= self.precision
    }

    /// Rescale to unit norm when the deviation exceeds the precision
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 && (norm - 1.0).abs() > self.precision {
            let inv = 1.0 / norm;
            for amp in self.amplitudes.iter_mut() {
                *amp *= inv;
            }
            self.cache.invalidate();
        }
    }

    /// Replace the amplitudes wholesale and renormalize
    ///
    /// # Errors
    /// [`StateError::DimensionMismatch`] unless `amplitudes.len() == 2^n`.
    pub fn set_amplitudes(&mut self, amplitudes: Vec<Complex64>) -> Result<()> {
        if amplitudes.len() != self.amplitudes.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: amplitudes.len(),
            });
        }
        self.amplitudes = amplitudes;
        self.cache.invalidate();
        let norm = self.norm();
        if norm > 0.0 {
            let inv = 1.0 / norm;
            for amp in self.amplitudes.iter_mut() {
                *amp *= inv;
            }
        }
        Ok(())
    }

    /// Return to zero qubits, keeping the configuration
    pub fn reset(&mut self) {
        self.amplitudes.clear();
        self.amplitudes.push(Complex64::new(1.0, 0.0));
        self.amplitudes.shrink_to_fit();
        self.num_qubits = 0;
        self.cache.invalidate();
    }
}
