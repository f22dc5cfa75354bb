//! VM configuration

use tracing::warn;

/// Environment variable overriding the qubit limit
pub const ENV_MAX_QUBITS: &str = "QVM_MAX_QUBITS";
/// Environment variable overriding the numeric precision
pub const ENV_PRECISION: &str = "QVM_PRECISION";
/// Environment variable enabling debug mode
pub const ENV_DEBUG_MODE: &str = "QVM_DEBUG_MODE";

/// Configuration for a VM instance
#[derive(Debug, Clone, PartialEq)]
pub struct VmConfig {
    /// Upper bound on qubits, both live handles and state-vector bits
    ///
    /// The state vector costs 16 bytes × 2^n, so values above ~30 are
    /// aspirational on most machines.
    ///
    /// Default: 32
    pub max_qubits: u16,

    /// Numeric precision for normalization checks and collapse warnings
    ///
    /// Default: 1e-10
    pub precision: f64,

    /// Debug mode: verify unitarity of caller-supplied matrices
    ///
    /// A failed check logs a warning; the gate is still applied.
    ///
    /// Default: false
    pub debug: bool,

    /// Random seed for reproducible measurement statistics
    ///
    /// If None, the generator is seeded from OS entropy.
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Qubit count above which gate kernels run in parallel
    ///
    /// Default: 14
    pub parallel_threshold: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_qubits: 32,
            precision: 1e-10,
            debug: false,
            seed: None,
            parallel_threshold: qvm_state::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl VmConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the `QVM_*` environment variables
    ///
    /// Unparseable values log a warning and keep the default; programmatic
    /// configuration always takes precedence over the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_MAX_QUBITS) {
            match raw.parse::<u16>() {
                Ok(v) if v > 0 => config.max_qubits = v,
                _ => warn!(value = %raw, "ignoring invalid {ENV_MAX_QUBITS}"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_PRECISION) {
            match raw.parse::<f64>() {
                Ok(v) if v > 0.0 && v.is_finite() => config.precision = v,
                _ => warn!(value = %raw, "ignoring invalid {ENV_PRECISION}"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_DEBUG_MODE) {
            config.debug = matches!(raw.as_str(), "1" | "true" | "TRUE" | "on");
        }

        config
    }

    /// Set the qubit limit
    pub fn with_max_qubits(mut self, max_qubits: u16) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the numeric precision
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the measurement-stream seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the parallel kernel threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_qubits == 0 {
            return Err("max_qubits must be at least 1".to_string());
        }
        if !(self.precision > 0.0 && self.precision.is_finite()) {
            return Err(format!("precision must be a positive finite number, got {}", self.precision));
        }
        Ok(())
    }
}
