//! Disaggregates regional freight flows into individual truck trips.
//!
//! The input is a list of `AggregateFlow`s: annual truck counts between coarse zones, by commodity
//! and import/export mode. Each flow is thinned down to the simulated period, then every surviving
//! truck gets a concrete origin and destination (a county, sub-county zone, port, or border
//! crossing) and a departure time. See `batch::run` for the entry point.

#[macro_use]
extern crate log;

pub use self::batch::{number_trips, run, simulate_partition, thinned_count, BatchSummary};
pub use self::config::{Config, Granularity, OutputFormat, SEASONAL_FACTOR, SECONDS_PER_DAY};
pub use self::disaggregate::{Disaggregator, End, Point, UNRESOLVED};
pub use self::error::{Error, Result};
pub use self::table::{Facility, FacilityTable, LookupTables, ProbabilityTable, Weights};
pub use self::trip::{AggregateFlow, Trip, TripID, TripRecord};

pub mod batch;
mod config;
pub mod departure;
pub mod disaggregate;
mod error;
pub mod sampler;
mod table;
mod trip;
