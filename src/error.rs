use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `d4disp` library.
///
/// This enum covers every failure mode of the dispersion pipeline, from
/// malformed input shapes to numerical breakdown of the charge-equilibration
/// solve. It implements `std::error::Error`, allowing it to be composed with
/// other error types in application code.
#[derive(Error, Debug)]
pub enum D4Error {
    /// Indicates that the reference database has no record for an element,
    /// identified by its atomic number.
    ///
    /// Raised during input validation, before any computation begins.
    #[error("No reference data for element with atomic number: {0}")]
    UnknownElement(u8),

    /// A structure's atomic-number and position sequences disagree in length,
    /// or a batch row does not match the batch's padded atom count.
    #[error("Inconsistent input shapes: expected {expected} entries, found {found}")]
    ShapeMismatch {
        /// The number of entries implied by the atomic-number sequence.
        expected: usize,
        /// The number of entries actually supplied.
        found: usize,
    },

    /// The electronegativity-equilibration linear system could not be solved.
    ///
    /// Produced when the solver panics on a singular matrix, when the
    /// solution contains non-finite entries, or when the solved charges
    /// violate the total-charge constraint beyond tolerance. Degenerate or
    /// coincident geometries are the usual cause.
    #[error("EEQ charge system could not be solved: {0}")]
    SingularSystem(String),

    /// The requested functional name has no entry in the damping-parameter
    /// table.
    #[error("No damping parameters for functional: '{0}'")]
    UnknownFunctional(String),

    /// An I/O error that occurred while reading a parameter resource file.
    #[error("I/O error at path '{path}': {source}")]
    Io {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// A parameter resource failed to parse, typically indicating invalid
    /// TOML or a structural mismatch with the expected schema.
    #[error("Failed to deserialize TOML parameters: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// The input batch contained no structures, or a structure contained no
    /// real atoms. At least one real atom is required.
    #[error("Input validation failed: at least one real atom is required")]
    NoAtoms,
}
