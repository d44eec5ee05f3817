//! Error handling for the nut-collections library
//!
//! Every fallible container operation reports exactly one [`NutError`] variant.
//! There is one variant per status code, so callers can tell a bad index from
//! an absent key or a refused allocation.

use thiserror::Error;

/// Main error type for the nut-collections library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NutError {
    /// Unclassified failure
    #[error("Error: {message}")]
    Generic {
        /// Error message describing the issue
        message: String,
    },

    /// Non-fatal condition the caller may want to know about
    #[error("Warning: {message}")]
    Warning {
        /// Warning message
        message: String,
    },

    /// Broken usage contract; the operation was refused
    #[error("Fatal: {message}")]
    Fatal {
        /// Description of the violated contract
        message: String,
    },

    /// The allocator refused a request
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Index outside the valid range of the container
    #[error("Out of range: index {index}, size {size}")]
    OutOfRange {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Capacity rejected at construction time
    #[error("Invalid capacity: {capacity}")]
    InvalidCapacity {
        /// The rejected capacity
        capacity: usize,
    },

    /// Sub-range request with inverted or out-of-bounds limits
    #[error("Invalid range: [{from}, {to}] for size {size}")]
    InvalidRange {
        /// Inclusive lower bound
        from: usize,
        /// Inclusive upper bound
        to: usize,
        /// The valid size/length
        size: usize,
    },

    /// Growth would exceed the largest representable capacity
    #[error("Maximum capacity reached: {capacity}")]
    MaxCapacity {
        /// The capacity that could not be grown
        capacity: usize,
    },

    /// No entry with the requested key
    #[error("Key not found")]
    KeyNotFound,

    /// No element equal to the requested value
    #[error("Value not found")]
    ValueNotFound,

    /// Iteration has no further elements
    #[error("Iterator end")]
    IteratorEnd,

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl NutError {
    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create a warning
    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create a fatal error
    pub fn fatal<S: Into<String>>(message: S) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an out of range error
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Self::OutOfRange { index, size }
    }

    /// Create an invalid capacity error
    pub fn invalid_capacity(capacity: usize) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create an invalid range error
    pub fn invalid_range(from: usize, to: usize, size: usize) -> Self {
        Self::InvalidRange { from, to, size }
    }

    /// Create a max capacity error
    pub fn max_capacity(capacity: usize) -> Self {
        Self::MaxCapacity { capacity }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors leave the container intact and the same call may
    /// succeed later (for example after memory is released).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } => true,
            Self::MaxCapacity { .. } => true,
            Self::Warning { .. } => true,
            Self::KeyNotFound => true,
            Self::ValueNotFound => true,
            Self::IteratorEnd => true,
            Self::Generic { .. } => false,
            Self::Fatal { .. } => false,
            Self::OutOfRange { .. } => false,
            Self::InvalidCapacity { .. } => false,
            Self::InvalidRange { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic",
            Self::Warning { .. } => "warning",
            Self::Fatal { .. } => "fatal",
            Self::OutOfMemory { .. } => "memory",
            Self::OutOfRange { .. } => "bounds",
            Self::InvalidCapacity { .. } => "capacity",
            Self::InvalidRange { .. } => "range",
            Self::MaxCapacity { .. } => "max_capacity",
            Self::KeyNotFound => "key",
            Self::ValueNotFound => "value",
            Self::IteratorEnd => "iterator",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NutError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(NutError::out_of_range(index, size))
    } else {
        Ok(())
    }
}

/// Assert that an inclusive range `[from, to]` lies within `size` elements
#[inline]
pub fn check_range(from: usize, to: usize, size: usize) -> Result<()> {
    if from > to || to >= size {
        return Err(NutError::invalid_range(from, to, size));
    }
    Ok(())
}
