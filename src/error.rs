//! Structured failure signaling for the core.
//!
//! The core performs no logging and no retries: every failure is a data or
//! configuration defect, reported as a `RiskError` with a kind the caller
//! (CLI here, a serving layer in production) can translate into a distinct
//! user-facing message.

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Estimation cannot proceed: too few qualifying households or jumps.
    InsufficientData,
    /// Estimated or supplied parameters violate their domain bounds.
    ParameterOutOfRange,
    /// Simulation inputs such as trial_count or horizon are non-positive.
    InvalidConfiguration,
    /// NaN/Inf detected in an intermediate or output value. Always fatal,
    /// never silently repaired.
    NumericalFault,
    /// File-level failure in the front-end (not produced by the core).
    Io,
}

#[derive(Clone)]
pub struct RiskError {
    kind: ErrorKind,
    message: String,
}

impl RiskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn parameter_out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParameterOutOfRange, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, message)
    }

    pub fn numerical_fault(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NumericalFault, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::InvalidConfiguration => 2,
            ErrorKind::InsufficientData => 3,
            ErrorKind::NumericalFault => 4,
            ErrorKind::ParameterOutOfRange => 5,
            ErrorKind::Io => 6,
        }
    }
}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for RiskError {}
