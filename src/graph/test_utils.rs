// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! `DistributionGraphBuilder`, which can declaratively build panel trees for
//! use in tests.

use crate::{
    CircuitRecord, DistributionGraph, Error, GraphConfig, LoadType, PanelSchedule, PanelSpec,
    Phase, ServiceSpec,
};

/// Represents a panel added to the `DistributionGraphBuilder`.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug)]
pub(crate) struct PanelHandle(u64);

impl PanelHandle {
    /// Returns the id of the panel.
    pub(crate) fn panel_id(&self) -> u64 {
        self.0
    }
}

/// A builder for creating distribution graphs easily, for use in tests.
///
/// All panels are single phase at 240V, and every circuit is single pole.
pub(crate) struct DistributionGraphBuilder {
    service: ServiceSpec,
    schedules: Vec<PanelSchedule>,
    next_id: u64,
}

impl DistributionGraphBuilder {
    /// Creates a new builder for a single phase, 240V service of the given
    /// size.
    pub(crate) fn new(service_amps: u32) -> Self {
        DistributionGraphBuilder {
            service: ServiceSpec {
                amps: service_amps,
                voltage: 240,
                phase: Phase::Single,
            },
            schedules: Vec::new(),
            next_id: 1,
        }
    }

    fn add_panel(&mut self, spec: PanelSpec, loads_va: &[f64]) -> PanelHandle {
        let circuits = loads_va
            .iter()
            .enumerate()
            .map(|(i, va)| CircuitRecord::new(format!("{} #{}", spec.name, i + 1), *va, 20))
            .collect();
        let handle = PanelHandle(spec.id);
        self.schedules.push(PanelSchedule::new(spec, circuits));
        handle
    }

    fn next_spec(&mut self, name: &str, bus_rating: u32) -> PanelSpec {
        let id = self.next_id;
        self.next_id += 1;
        PanelSpec::new(id, name, bus_rating)
    }

    /// Adds a panel fed from the service, with one circuit per given load.
    pub(crate) fn panel(&mut self, name: &str, bus_rating: u32, loads_va: &[f64]) -> PanelHandle {
        let spec = self.next_spec(name, bus_rating);
        self.add_panel(spec, loads_va)
    }

    /// Adds a panel fed from `parent`, with one circuit per given load.
    pub(crate) fn sub_panel(
        &mut self,
        parent: PanelHandle,
        name: &str,
        bus_rating: u32,
        loads_va: &[f64],
    ) -> PanelHandle {
        let spec = self.next_spec(name, bus_rating).fed_from(parent.0);
        self.add_panel(spec, loads_va)
    }

    /// Adds a circuit to `panel` that records the feed to a sub-panel, with
    /// the given load.
    pub(crate) fn subfeed_breaker(
        &mut self,
        panel: PanelHandle,
        breaker_rating: u32,
        load_va: f64,
    ) -> &mut Self {
        if let Some(schedule) = self
            .schedules
            .iter_mut()
            .find(|s| s.panel_id() == panel.0)
        {
            schedule.circuits.push(
                CircuitRecord::new("Subfeed", load_va, breaker_rating)
                    .with_poles(2)
                    .with_load_type(LoadType::Subfeed),
            );
        }
        self
    }

    /// Returns the panel schedules added so far.
    pub(crate) fn schedules(&self) -> &[PanelSchedule] {
        &self.schedules
    }

    /// Builds and returns the distribution graph from the panels added to the
    /// builder.
    pub(crate) fn build(&self, config: Option<GraphConfig>) -> Result<DistributionGraph, Error> {
        DistributionGraph::try_new(
            self.service.clone(),
            self.schedules.clone(),
            config.unwrap_or_default(),
        )
    }
}
