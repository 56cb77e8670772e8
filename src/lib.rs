// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Electrical Capacity Graph

This is a library for evaluating the capacity of a building's electrical
distribution system: how loaded the service entrance and panels are, whether a
proposed load can be added, which service size to upgrade to when it can't,
and whether feeders keep their voltage drop within NEC limits.

## Records

The engine works on plain records: a [`ServiceSpec`], the [`PanelSpec`]s
with their [`CircuitRecord`]s (grouped as [`PanelSchedule`]s), and the
[`FeederSpec`]s between them.  All of them can be deserialized with `serde`,
and are validated before they are evaluated.

Records are usually read from storage through a [`ProjectSource`]
implementation, into a [`ProjectSnapshot`].

## The `DistributionGraph`

The main struct is [`DistributionGraph`], instances of which can be created
by passing a service and an iterator of panel schedules to the
[`try_new`][DistributionGraph::try_new] method.  Panels are connected
according to the panel they are fed from, or to the service when they don't
name one.

The [`try_new`][DistributionGraph::try_new] method checks that:

- The service, every panel and every circuit are valid.
- Panel ids are unique.
- Every panel is fed from an existing panel, or from the service.
- There are no cycles of panels feeding each other.

If any of the checks fail, the method will return an [`Error`], and a
[`DistributionGraph`] instance otherwise.

## Capacity evaluation

Loads are aggregated according to the configured [`LoadAggregation`]:
either every circuit counts directly against the service, or panel loads are
rolled up through the feeds, replacing the subfeed breakers that supply
sub-panels.  The graph then provides:

- [`service_utilization`][DistributionGraph::service_utilization]
- [`panel_utilization`][DistributionGraph::panel_utilization]
- [`check_capacity`][DistributionGraph::check_capacity]
- [`panel_compliance`][DistributionGraph::panel_compliance]
- [`analyze_change`][DistributionGraph::analyze_change]
- [`large_loads`][DistributionGraph::large_loads]

The thresholds used throughout are set in a [`CapacityPolicy`], which defaults
to the NEC limits.

The flat evaluations are also available as free functions, for callers that
don't need the topology: [`service_utilization`], [`panel_utilization`],
[`check_capacity`], [`check_feeder_compliance`] and
[`voltage_drop_percent`].
*/

mod capacity;
pub use capacity::{check_capacity, recommended_service_size, CapacityVerdict, VerdictCategory};

mod compliance;
pub use compliance::{
    check_feeder_compliance, check_panel_compliance, FeederViolation, PanelCompliance,
    PanelViolation, Severity, FEEDER_VOLTAGE_DROP_ARTICLE, PANEL_CIRCUIT_LIMIT_ARTICLE,
    PANEL_CONTINUOUS_LOAD_ARTICLE,
};

mod conductor;
pub use conductor::{
    circular_mils, lookup_circular_mils, ConductorMaterial, DEFAULT_CIRCULAR_MILS,
    DEFAULT_CONDUCTOR_SIZE,
};

mod config;
pub use config::{CapacityPolicy, GraphConfig, LoadAggregation};

mod error;
pub use error::Error;

mod graph;
pub use graph::{iterators, DistributionGraph};

mod impact;
pub use impact::{
    large_loads, total_additional_amps, ChangeImpact, FeederImpact, LargeLoad, PanelImpact,
    ProposedLoad, ServiceImpact, VoltageDropIssue, DEFAULT_LARGE_LOAD_AMPS,
};

mod load_type;
pub use load_type::LoadType;

mod project;
pub use project::{ProjectSnapshot, ProjectSource};

mod records;
pub use records::{
    CircuitRecord, FeederSpec, PanelSchedule, PanelSpec, Phase, ServiceSpec,
    DEFAULT_PANEL_SPACES, DEFAULT_VOLTAGE,
};

mod utilization;
pub use utilization::{
    panel_utilization, service_utilization, PanelUtilization, UtilizationResult,
    UtilizationStatus, DATA_UNAVAILABLE,
};

mod voltage_drop;
pub use voltage_drop::{voltage_drop_percent, voltage_drop_percent_for};
