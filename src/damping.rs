//! This module defines the rational (Becke-Johnson) damping parameters and
//! the functional-name resolver.
//!
//! Damping parameters scale and shift the short-range behavior of the
//! two-body and three-body dispersion terms. Named density functionals map to
//! fitted parameter sets through a TOML-backed table; the default table is
//! embedded in the library.

use crate::error::D4Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

fn default_s6() -> f64 {
    1.0
}

fn default_s9() -> f64 {
    1.0
}

/// Parameters of the rational damping function.
///
/// `s6` and `s9` default to 1.0 when omitted from a TOML entry, matching the
/// convention of published D4 parameter sets. Setting `s9` to 0.0 disables
/// the three-body term exactly.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DampingParams {
    /// Scale of the dipole-dipole (C6) term.
    #[serde(default = "default_s6")]
    pub s6: f64,
    /// Scale of the dipole-quadrupole (C8) term.
    pub s8: f64,
    /// Scale of the three-body (ATM) term; 0.0 disables it.
    #[serde(default = "default_s9")]
    pub s9: f64,
    /// Slope of the critical-radius shift.
    pub a1: f64,
    /// Offset of the critical-radius shift in Bohr.
    pub a2: f64,
}

impl DampingParams {
    /// Becke-Johnson critical radius for a pair with reference radius `r0`.
    #[inline]
    pub fn critical_radius(&self, r0: f64) -> f64 {
        self.a1 * r0 + self.a2
    }
}

/// A table mapping functional names to fitted damping parameters.
///
/// Lookup is case-insensitive. The default table ships with the library as
/// an embedded TOML resource; custom tables can be loaded from files or
/// strings for parameter studies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionalTable {
    /// Mapping from lowercase functional name to its damping parameters.
    pub functionals: HashMap<String, DampingParams>,
}

impl FunctionalTable {
    /// Loads a functional table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::Io`] if the file cannot be read, or
    /// [`D4Error::Deserialization`] if the TOML content is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, D4Error> {
        let content = std::fs::read_to_string(path).map_err(|io_error| D4Error::Io {
            path: path.to_path_buf(),
            source: io_error,
        })?;
        Self::load_from_str(&content)
    }

    /// Parses a functional table from a TOML string.
    ///
    /// # Arguments
    ///
    /// * `toml_str` - TOML text with a `[functionals.<name>]` entry per
    ///   parameter set.
    ///
    /// # Returns
    ///
    /// A `Result` containing the parsed `FunctionalTable` on success, or a
    /// `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::Deserialization`] if the TOML content is invalid.
    pub fn load_from_str(toml_str: &str) -> Result<Self, D4Error> {
        toml::from_str(toml_str).map_err(D4Error::from)
    }

    /// Resolves a functional name to its damping parameters.
    ///
    /// # Arguments
    ///
    /// * `functional` - The functional name; comparison is case-insensitive.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DampingParams` of the functional on
    /// success, or a `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::UnknownFunctional`] if the name has no entry in the
    /// table.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::default_functionals;
    ///
    /// let params = default_functionals().resolve("TPSSh").unwrap();
    /// assert!(params.s8 > 0.0);
    ///
    /// assert!(default_functionals().resolve("not-a-functional").is_err());
    /// ```
    pub fn resolve(&self, functional: &str) -> Result<DampingParams, D4Error> {
        self.functionals
            .get(&functional.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| D4Error::UnknownFunctional(functional.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FunctionalTable {
        FunctionalTable::load_from_str(
            r#"
            [functionals.tpssh]
            s8 = 1.85897750
            a1 = 0.44286966
            a2 = 4.60230534
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_known() {
        let params = table().resolve("TPSSh").unwrap();
        assert!((params.s6 - 1.0).abs() < 1e-14);
        assert!((params.s8 - 1.85897750).abs() < 1e-14);
        assert!((params.s9 - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_resolve_unknown() {
        let result = table().resolve("not-a-functional");
        assert!(matches!(result, Err(D4Error::UnknownFunctional(_))));
    }

    #[test]
    fn test_critical_radius() {
        let params = DampingParams {
            s6: 1.0,
            s8: 2.0,
            s9: 1.0,
            a1: 0.5,
            a2: 4.0,
        };
        assert!((params.critical_radius(6.0) - 7.0).abs() < 1e-14);
    }
}
