// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Conductor sizes and materials.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Cross-sections of standard conductor sizes, in circular mils.
const CONDUCTOR_TABLE: &[(&str, u32)] = &[
    ("#14", 4_110),
    ("#12", 6_530),
    ("#10", 10_380),
    ("#8", 16_510),
    ("#6", 26_240),
    ("#4", 41_740),
    ("#3", 52_620),
    ("#2", 66_360),
    ("#1", 83_690),
    ("#1/0", 105_600),
    ("#2/0", 133_100),
    ("#3/0", 167_800),
    ("#4/0", 211_600),
    ("250 kcmil", 250_000),
    ("300 kcmil", 300_000),
    ("350 kcmil", 350_000),
    ("400 kcmil", 400_000),
    ("500 kcmil", 500_000),
];

/// The designator whose cross-section is used for unknown sizes.
pub const DEFAULT_CONDUCTOR_SIZE: &str = "#1/0";

/// The cross-section used for unknown sizes, in circular mils.
pub const DEFAULT_CIRCULAR_MILS: u32 = 105_600;

/// Returns the cross-section of the given conductor size designator, if it is
/// a known size.
pub fn lookup_circular_mils(designator: &str) -> Option<u32> {
    let designator = designator.trim();
    CONDUCTOR_TABLE
        .iter()
        .find(|(size, _)| size.eq_ignore_ascii_case(designator))
        .map(|(_, cmil)| *cmil)
}

/// Returns the cross-section of the given conductor size designator.
///
/// Unknown designators resolve to the cross-section of a
/// [`DEFAULT_CONDUCTOR_SIZE`] conductor, so this never fails.
pub fn circular_mils(designator: &str) -> u32 {
    lookup_circular_mils(designator).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown conductor size {:?}, assuming {} ({} cmil).",
            designator,
            DEFAULT_CONDUCTOR_SIZE,
            DEFAULT_CIRCULAR_MILS
        );
        DEFAULT_CIRCULAR_MILS
    })
}

/// Represents the material of a conductor.
///
/// Unrecognized material tokens resolve to copper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConductorMaterial {
    #[default]
    Copper,
    Aluminum,
}

impl ConductorMaterial {
    /// Returns the resistivity constant `K`, in ohm-circular-mils per foot,
    /// used by the voltage drop formula.
    pub fn k_factor(&self) -> f64 {
        match self {
            ConductorMaterial::Copper => 12.9,
            ConductorMaterial::Aluminum => 21.2,
        }
    }

    /// Parses a material token such as `"Cu"` or `"aluminum"`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "cu" | "copper" | "" => ConductorMaterial::Copper,
            "al" | "aluminum" | "aluminium" => ConductorMaterial::Aluminum,
            _ => {
                tracing::warn!("Unknown conductor material {:?}, assuming copper.", token);
                ConductorMaterial::Copper
            }
        }
    }
}

impl From<String> for ConductorMaterial {
    fn from(token: String) -> Self {
        ConductorMaterial::from_token(&token)
    }
}

impl From<ConductorMaterial> for String {
    fn from(material: ConductorMaterial) -> Self {
        material.to_string()
    }
}

impl Display for ConductorMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConductorMaterial::Copper => write!(f, "Cu"),
            ConductorMaterial::Aluminum => write!(f, "Al"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_mils() {
        assert_eq!(circular_mils("#14"), 4_110);
        assert_eq!(circular_mils("#6"), 26_240);
        assert_eq!(circular_mils("#2/0"), 133_100);
        assert_eq!(circular_mils("#4/0"), 211_600);
        assert_eq!(circular_mils(" 250 KCMIL "), 250_000);
    }

    #[test]
    fn test_unknown_size_defaults() {
        assert_eq!(lookup_circular_mils("#weird"), None);
        assert_eq!(circular_mils("#weird"), DEFAULT_CIRCULAR_MILS);
        assert_eq!(circular_mils(""), 105_600);
        assert_eq!(
            circular_mils(DEFAULT_CONDUCTOR_SIZE),
            DEFAULT_CIRCULAR_MILS
        );
    }

    #[test]
    fn test_table_is_ordered_by_size() {
        assert!(CONDUCTOR_TABLE.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_material() {
        assert_eq!(ConductorMaterial::from_token("Cu"), ConductorMaterial::Copper);
        assert_eq!(ConductorMaterial::from_token("AL"), ConductorMaterial::Aluminum);
        assert_eq!(
            ConductorMaterial::from_token("aluminium"),
            ConductorMaterial::Aluminum
        );
        assert_eq!(ConductorMaterial::from_token("gold"), ConductorMaterial::Copper);
        assert_eq!(ConductorMaterial::Copper.k_factor(), 12.9);
        assert_eq!(ConductorMaterial::Aluminum.k_factor(), 21.2);
        assert_eq!(ConductorMaterial::Aluminum.to_string(), "Al");
    }
}
