// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The input records the engine evaluates: the service entrance, panels,
//! their circuits, and feeders.
//!
//! Records are plain snapshots fetched from the persistence layer.  Fields the
//! persistence layer may leave out have explicit defaults (240V, single phase,
//! 42 spaces, single pole), and every record can be checked with `validate()`
//! before it enters a calculation.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::conductor::ConductorMaterial;
use crate::voltage_drop::voltage_drop_percent_for;
use crate::{Error, LoadType};

/// Nominal voltage assumed when a record doesn't carry one.
pub const DEFAULT_VOLTAGE: u32 = 240;

/// Number of spaces assumed for a panel that doesn't specify it.
pub const DEFAULT_PANEL_SPACES: u32 = 42;

fn default_voltage() -> u32 {
    DEFAULT_VOLTAGE
}

fn default_spaces() -> u32 {
    DEFAULT_PANEL_SPACES
}

fn default_poles() -> u8 {
    1
}

/// The number of phases of a service or panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    #[default]
    Single,
    Three,
}

impl Phase {
    /// The factor relating `amps × volts` to apparent power: 1 for single
    /// phase and √3 for three phase.
    pub fn capacity_factor(&self) -> f64 {
        match self {
            Phase::Single => 1.0,
            Phase::Three => 3f64.sqrt(),
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = Error;

    fn try_from(phases: u8) -> Result<Self, Self::Error> {
        match phases {
            1 => Ok(Phase::Single),
            3 => Ok(Phase::Three),
            _ => Err(Error::invalid_record(format!(
                "Phase count must be 1 or 3, got {phases}."
            ))),
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Single => 1,
            Phase::Three => 3,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-Phase", u8::from(*self))
    }
}

/// Returns the apparent power capacity of a rating, in volt-amps.
pub(crate) fn capacity_va(amps: u32, voltage: u32, phase: Phase) -> f64 {
    f64::from(amps) * f64::from(voltage) * phase.capacity_factor()
}

/// A building's electrical service entrance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Rated ampacity of the service.
    #[serde(alias = "service_size")]
    pub amps: u32,

    #[serde(default = "default_voltage")]
    pub voltage: u32,

    #[serde(default, alias = "phases")]
    pub phase: Phase,
}

impl ServiceSpec {
    /// Creates a new validated [`ServiceSpec`].
    pub fn try_new(amps: u32, voltage: u32, phase: Phase) -> Result<Self, Error> {
        let service = Self {
            amps,
            voltage,
            phase,
        };
        service.validate()?;
        Ok(service)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.amps == 0 {
            return Err(Error::invalid_record("Service size must be positive."));
        }
        if self.voltage == 0 {
            return Err(Error::invalid_record("Service voltage must be positive."));
        }
        Ok(())
    }

    /// Returns the apparent power capacity of the service, in volt-amps.
    pub fn capacity_va(&self) -> f64 {
        capacity_va(self.amps, self.voltage, self.phase)
    }
}

/// A distribution panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: u64,

    pub name: String,

    /// Bus rating in amps.
    pub bus_rating: u32,

    #[serde(default = "default_voltage")]
    pub voltage: u32,

    #[serde(default, alias = "phases")]
    pub phase: Phase,

    /// Number of pole spaces in the panel.
    #[serde(default = "default_spaces")]
    pub spaces: u32,

    /// Rating of the main breaker, if the panel has one.
    #[serde(default, alias = "main_breaker_rating")]
    pub main_breaker: Option<u32>,

    /// The panel this panel is fed from, or `None` when it is fed directly
    /// from the service.
    #[serde(default)]
    pub fed_from: Option<u64>,
}

impl PanelSpec {
    /// Creates a panel fed from the service, with the default voltage, phase
    /// and number of spaces.
    pub fn new(id: u64, name: impl Into<String>, bus_rating: u32) -> Self {
        Self {
            id,
            name: name.into(),
            bus_rating,
            voltage: DEFAULT_VOLTAGE,
            phase: Phase::Single,
            spaces: DEFAULT_PANEL_SPACES,
            main_breaker: None,
            fed_from: None,
        }
    }

    pub fn with_voltage(mut self, voltage: u32) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_spaces(mut self, spaces: u32) -> Self {
        self.spaces = spaces;
        self
    }

    pub fn with_main_breaker(mut self, amps: u32) -> Self {
        self.main_breaker = Some(amps);
        self
    }

    /// Marks the panel as fed from the panel with the given id.
    pub fn fed_from(mut self, panel_id: u64) -> Self {
        self.fed_from = Some(panel_id);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.bus_rating == 0 {
            return Err(Error::invalid_record(format!(
                "Panel:{} bus rating must be positive.",
                self.id
            )));
        }
        Ok(())
    }

    /// Returns the apparent power capacity of the panel bus, in volt-amps.
    pub fn capacity_va(&self) -> f64 {
        capacity_va(self.bus_rating, self.voltage, self.phase)
    }
}

/// A branch circuit inside a panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitRecord {
    /// Connected load in volt-amps.
    #[serde(default)]
    pub load_va: Option<f64>,

    /// Connected load in watts, used when `load_va` is absent.
    #[serde(default)]
    pub load_watts: Option<f64>,

    /// Breaker rating in amps.
    #[serde(default, alias = "breaker_amps")]
    pub breaker_rating: u32,

    #[serde(default = "default_poles", alias = "pole")]
    pub poles: u8,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub load_type: LoadType,
}

impl CircuitRecord {
    /// Creates a single pole circuit with the given load in volt-amps.
    pub fn new(description: impl Into<String>, load_va: f64, breaker_rating: u32) -> Self {
        Self {
            load_va: Some(load_va),
            load_watts: None,
            breaker_rating,
            poles: 1,
            description: description.into(),
            load_type: LoadType::Other,
        }
    }

    pub fn with_poles(mut self, poles: u8) -> Self {
        self.poles = poles;
        self
    }

    pub fn with_load_type(mut self, load_type: LoadType) -> Self {
        self.load_type = load_type;
        self
    }

    /// Returns the connected load in volt-amps.
    ///
    /// Falls back to the watts field when no volt-amp figure is recorded,
    /// treating watts as volt-amps.  Missing and negative loads count as 0.
    pub fn resolved_load_va(&self) -> f64 {
        let load = self.load_va.or(self.load_watts).unwrap_or(0.0);
        if load.is_nan() || load < 0.0 {
            tracing::warn!(
                "Circuit {:?} has an invalid load of {} VA, counting it as 0.",
                self.description,
                load
            );
            return 0.0;
        }
        load
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=3).contains(&self.poles) {
            return Err(Error::invalid_record(format!(
                "Circuit {:?} must have 1, 2 or 3 poles, got {}.",
                self.description, self.poles
            )));
        }
        Ok(())
    }
}

/// A panel together with its circuits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSchedule {
    pub panel: PanelSpec,

    #[serde(default)]
    pub circuits: Vec<CircuitRecord>,
}

impl PanelSchedule {
    pub fn new(panel: PanelSpec, circuits: Vec<CircuitRecord>) -> Self {
        Self { panel, circuits }
    }

    /// Returns the id of the panel.
    pub fn panel_id(&self) -> u64 {
        self.panel.id
    }

    /// Returns the sum of the connected loads of all circuits, in volt-amps.
    pub fn connected_load_va(&self) -> f64 {
        self.circuits.iter().map(|c| c.resolved_load_va()).sum()
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.panel.validate()?;
        for circuit in &self.circuits {
            circuit.validate().map_err(|e| {
                Error::invalid_record(format!("Panel:{} {}", self.panel.id, e.description()))
            })?;
        }
        Ok(())
    }
}

/// A conductor run between two points of the distribution system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeederSpec {
    pub id: u64,

    pub name: String,

    /// Conductor size designator, e.g. `"#2/0"`.
    pub conductor_size: String,

    #[serde(default, alias = "conductor_material")]
    pub material: ConductorMaterial,

    /// One-way length in feet.
    pub length_feet: f64,

    /// Rated ampacity of the conductors.
    #[serde(default)]
    pub ampacity: u32,

    /// The last recorded voltage drop, in percent.
    #[serde(default)]
    pub voltage_drop_percent: f64,

    /// The panel supplied by this feeder, if known.
    #[serde(default)]
    pub destination_panel: Option<u64>,
}

impl FeederSpec {
    /// Creates a copper feeder with no recorded voltage drop.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        conductor_size: impl Into<String>,
        length_feet: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            conductor_size: conductor_size.into(),
            material: ConductorMaterial::Copper,
            length_feet,
            ampacity: 0,
            voltage_drop_percent: 0.0,
            destination_panel: None,
        }
    }

    pub fn with_material(mut self, material: ConductorMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_ampacity(mut self, ampacity: u32) -> Self {
        self.ampacity = ampacity;
        self
    }

    pub fn with_recorded_drop(mut self, percent: f64) -> Self {
        self.voltage_drop_percent = percent;
        self
    }

    /// Marks the feeder as supplying the panel with the given id.
    pub fn supplying(mut self, panel_id: u64) -> Self {
        self.destination_panel = Some(panel_id);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.length_feet.is_finite() || self.length_feet < 0.0 {
            return Err(Error::invalid_record(format!(
                "Feeder:{} length can't be negative, got {}.",
                self.id, self.length_feet
            )));
        }
        Ok(())
    }

    /// Returns the voltage drop, in percent, this feeder would have when
    /// carrying `load_amps` at `voltage`.
    pub fn voltage_drop_at(&self, load_amps: f64, voltage: f64) -> Result<f64, Error> {
        voltage_drop_percent_for(
            self.material,
            &self.conductor_size,
            self.length_feet,
            load_amps,
            voltage,
        )
    }
}
