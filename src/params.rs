//! This module provides the tabulated reference database and utilities for
//! loading it from TOML resources.
//!
//! The database holds, per element, the EEQ charge-model parameters, the
//! covalent radius and Pauling electronegativity feeding the coordination
//! number, the r4r2 expectation-value factor for C8 coefficients, and the
//! element's tabulated reference states with their imaginary-frequency
//! polarizability samples. Element keys in the TOML source may be atomic
//! numbers or element symbols.

use crate::error::D4Error;
use crate::math::constants::N_FREQ;
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Parameters of the electronegativity-equilibration charge model for one
/// element, in Hartree atomic units.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EeqRecord {
    /// Electronegativity entering the right-hand side of the EEQ system.
    pub chi: f64,
    /// Chemical hardness on the diagonal of the EEQ system.
    pub eta: f64,
    /// Scaling of the coordination-number correction to the
    /// electronegativity.
    pub kcn: f64,
    /// Width of the atomic charge distribution; controls the erf damping of
    /// the Coulomb kernel and the Gaussian self-interaction.
    pub rad: f64,
}

/// One tabulated reference state of an element.
///
/// A reference state corresponds to a known molecular environment of the
/// element. Its coordination number and partial charge anchor the smooth
/// interpolation weights, and its polarizability samples on the shared
/// Casimir-Polder grid carry the dispersion information.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReferenceState {
    /// Coordination number of the element in the reference system.
    pub cn: f64,
    /// Reference partial charge (standard set).
    pub q: f64,
    /// Reference partial charge (alternative set).
    pub q_alt: f64,
    /// Number of Gaussian functions stacked in the CN weight of this state.
    pub ngw: u8,
    /// Dynamic polarizability samples at the 23 imaginary frequencies of the
    /// Casimir-Polder quadrature.
    pub alpha: [f64; N_FREQ],
}

/// All tabulated data for one element.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ElementRecord {
    /// Covalent radius in Bohr, already scaled for the counting function.
    pub rcov: f64,
    /// Pauling electronegativity, entering the D4 coordination number.
    pub en: f64,
    /// Square-rooted r^4/r^2 expectation-value factor; C8 derives from C6
    /// through products of these.
    pub r4r2: f64,
    /// Effective nuclear charge entering the charge-scaling function.
    pub zeff: f64,
    /// Chemical hardness entering the charge-scaling function.
    pub gam: f64,
    /// EEQ charge-model parameters.
    pub eeq: EeqRecord,
    /// Tabulated reference states, at least one per element.
    pub refs: Vec<ReferenceState>,
}

/// The immutable reference database backing the dispersion pipeline.
///
/// Initialized once (from the embedded resource or a user-supplied TOML
/// source) and only read afterwards. The database is passed by reference into
/// the pipeline rather than accessed through a hidden global, so tests can
/// inject reduced or modified tables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceDatabase {
    /// Mapping from atomic number to the element's tabulated data.
    #[serde(deserialize_with = "deserialize_element_map")]
    pub elements: HashMap<u8, ElementRecord>,
}

impl ReferenceDatabase {
    /// Loads the reference database from a TOML file.
    ///
    /// The file should contain an `[elements]` table with element data keyed
    /// by atomic number or element symbol, each entry carrying the EEQ
    /// parameters and at least one reference state.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the TOML file containing the tabulated data.
    ///
    /// # Returns
    ///
    /// A `Result` containing the parsed `ReferenceDatabase` on success, or a
    /// `D4Error` on failure.
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

    /// Parses the reference database from a TOML string.
    ///
    /// # Arguments
    ///
    /// * `toml_str` - TOML text in the same layout as the embedded resource.
    ///
    /// # Returns
    ///
    /// A `Result` containing the parsed `ReferenceDatabase` on success, or a
    /// `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::Deserialization`] if the TOML content is invalid or
    /// contains unrecognized element keys.
    pub fn load_from_str(toml_str: &str) -> Result<Self, D4Error> {
        toml::from_str(toml_str).map_err(D4Error::from)
    }

    /// Looks up an element record, failing with [`D4Error::UnknownElement`]
    /// for atomic numbers outside the tabulated coverage.
    pub fn element(&self, atomic_number: u8) -> Result<&ElementRecord, D4Error> {
        self.elements
            .get(&atomic_number)
            .ok_or(D4Error::UnknownElement(atomic_number))
    }

    /// Checks that every real atom of a padded structure row is covered by
    /// the database. Padding entries (atomic number 0) are skipped.
    pub fn check_coverage(&self, numbers: &[u8]) -> Result<(), D4Error> {
        for &z in numbers.iter().filter(|&&z| z != 0) {
            self.element(z)?;
        }
        Ok(())
    }
}

/// Deserializes the element map with flexible key types.
///
/// Keys may be atomic numbers rendered as strings ("6") or element symbols
/// ("C"); symbols are converted to atomic numbers for internal storage.
fn deserialize_element_map<'de, D>(deserializer: D) -> Result<HashMap<u8, ElementRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ElementMapVisitor;

    impl<'de> Visitor<'de> for ElementMapVisitor {
        type Value = HashMap<u8, ElementRecord>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map from atomic number or symbol to element data")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut elements = HashMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, ElementRecord>()? {
                let atomic_number = key.parse::<u8>().or_else(|_| {
                    element_symbol_to_atomic_number(&key)
                        .ok_or_else(|| de::Error::custom(format!("invalid element key: '{}'", key)))
                })?;
                elements.insert(atomic_number, value);
            }
            Ok(elements)
        }
    }

    deserializer.deserialize_map(ElementMapVisitor)
}

/// Converts an element symbol (case-sensitive) to its atomic number.
///
/// Covers the full periodic table, independent of which elements the loaded
/// tables happen to cover; a parsed element without tabulated data surfaces
/// later as [`D4Error::UnknownElement`] at lookup time.
fn element_symbol_to_atomic_number(symbol: &str) -> Option<u8> {
    match symbol {
        "H" => Some(1),
        "He" => Some(2),
        "Li" => Some(3),
        "Be" => Some(4),
        "B" => Some(5),
        "C" => Some(6),
        "N" => Some(7),
        "O" => Some(8),
        "F" => Some(9),
        "Ne" => Some(10),
        "Na" => Some(11),
        "Mg" => Some(12),
        "Al" => Some(13),
        "Si" => Some(14),
        "P" => Some(15),
        "S" => Some(16),
        "Cl" => Some(17),
        "Ar" => Some(18),
        "K" => Some(19),
        "Ca" => Some(20),
        "Sc" => Some(21),
        "Ti" => Some(22),
        "V" => Some(23),
        "Cr" => Some(24),
        "Mn" => Some(25),
        "Fe" => Some(26),
        "Co" => Some(27),
        "Ni" => Some(28),
        "Cu" => Some(29),
        "Zn" => Some(30),
        "Ga" => Some(31),
        "Ge" => Some(32),
        "As" => Some(33),
        "Se" => Some(34),
        "Br" => Some(35),
        "Kr" => Some(36),
        "Rb" => Some(37),
        "Sr" => Some(38),
        "Y" => Some(39),
        "Zr" => Some(40),
        "Nb" => Some(41),
        "Mo" => Some(42),
        "Tc" => Some(43),
        "Ru" => Some(44),
        "Rh" => Some(45),
        "Pd" => Some(46),
        "Ag" => Some(47),
        "Cd" => Some(48),
        "In" => Some(49),
        "Sn" => Some(50),
        "Sb" => Some(51),
        "Te" => Some(52),
        "I" => Some(53),
        "Xe" => Some(54),
        "Cs" => Some(55),
        "Ba" => Some(56),
        "La" => Some(57),
        "Ce" => Some(58),
        "Pr" => Some(59),
        "Nd" => Some(60),
        "Pm" => Some(61),
        "Sm" => Some(62),
        "Eu" => Some(63),
        "Gd" => Some(64),
        "Tb" => Some(65),
        "Dy" => Some(66),
        "Ho" => Some(67),
        "Er" => Some(68),
        "Tm" => Some(69),
        "Yb" => Some(70),
        "Lu" => Some(71),
        "Hf" => Some(72),
        "Ta" => Some(73),
        "W" => Some(74),
        "Re" => Some(75),
        "Os" => Some(76),
        "Ir" => Some(77),
        "Pt" => Some(78),
        "Au" => Some(79),
        "Hg" => Some(80),
        "Tl" => Some(81),
        "Pb" => Some(82),
        "Bi" => Some(83),
        "Po" => Some(84),
        "At" => Some(85),
        "Rn" => Some(86),
        "Fr" => Some(87),
        "Ra" => Some(88),
        "Ac" => Some(89),
        "Th" => Some(90),
        "Pa" => Some(91),
        "U" => Some(92),
        "Np" => Some(93),
        "Pu" => Some(94),
        "Am" => Some(95),
        "Cm" => Some(96),
        "Bk" => Some(97),
        "Cf" => Some(98),
        "Es" => Some(99),
        "Fm" => Some(100),
        "Md" => Some(101),
        "No" => Some(102),
        "Lr" => Some(103),
        "Rf" => Some(104),
        "Db" => Some(105),
        "Sg" => Some(106),
        "Bh" => Some(107),
        "Hs" => Some(108),
        "Mt" => Some(109),
        "Ds" => Some(110),
        "Rg" => Some(111),
        "Cn" => Some(112),
        "Nh" => Some(113),
        "Fl" => Some(114),
        "Mc" => Some(115),
        "Lv" => Some(116),
        "Ts" => Some(117),
        "Og" => Some(118),
        _ => None,
    }
}
