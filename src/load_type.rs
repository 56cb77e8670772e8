// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `LoadType` enum, which represents the kind of load
//! a circuit supplies.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Represents the kind of load supplied by a circuit.
///
/// Load types arrive as free-form tags from the persistence layer.  Tags that
/// are not recognized resolve to [`LoadType::Other`] instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoadType {
    Lighting,
    Receptacle,
    Motor,
    Hvac,
    HeatPump,
    WaterHeater,
    Appliance,
    EvCharger,
    /// A breaker feeding a downstream panel.
    Subfeed,
    #[default]
    Other,
}

impl LoadType {
    /// Parses a load type tag, case- and separator-insensitively.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "lighting" | "light" => LoadType::Lighting,
            "receptacle" | "receptacles" | "outlet" => LoadType::Receptacle,
            "motor" => LoadType::Motor,
            "hvac" => LoadType::Hvac,
            "heat_pump" => LoadType::HeatPump,
            "water_heater" => LoadType::WaterHeater,
            "appliance" => LoadType::Appliance,
            "ev_charger" | "evse" => LoadType::EvCharger,
            "subfeed" | "sub_panel" | "subpanel" | "feeder" => LoadType::Subfeed,
            "other" | "" => LoadType::Other,
            _ => {
                tracing::warn!("Unknown load type tag {:?}, treating it as Other.", tag);
                LoadType::Other
            }
        }
    }

    /// Returns the canonical tag for the load type.
    pub fn as_tag(&self) -> &'static str {
        match self {
            LoadType::Lighting => "lighting",
            LoadType::Receptacle => "receptacle",
            LoadType::Motor => "motor",
            LoadType::Hvac => "hvac",
            LoadType::HeatPump => "heat_pump",
            LoadType::WaterHeater => "water_heater",
            LoadType::Appliance => "appliance",
            LoadType::EvCharger => "ev_charger",
            LoadType::Subfeed => "subfeed",
            LoadType::Other => "other",
        }
    }

    pub(crate) fn is_subfeed(&self) -> bool {
        *self == LoadType::Subfeed
    }
}

impl From<String> for LoadType {
    fn from(tag: String) -> Self {
        LoadType::from_tag(&tag)
    }
}

impl From<LoadType> for String {
    fn from(load_type: LoadType) -> Self {
        load_type.as_tag().to_string()
    }
}

impl Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadType::Lighting => write!(f, "Lighting"),
            LoadType::Receptacle => write!(f, "Receptacle"),
            LoadType::Motor => write!(f, "Motor"),
            LoadType::Hvac => write!(f, "HVAC"),
            LoadType::HeatPump => write!(f, "HeatPump"),
            LoadType::WaterHeater => write!(f, "WaterHeater"),
            LoadType::Appliance => write!(f, "Appliance"),
            LoadType::EvCharger => write!(f, "EVCharger"),
            LoadType::Subfeed => write!(f, "Subfeed"),
            LoadType::Other => write!(f, "Other"),
        }
    }
}
