//! Turns a coarse zone into a concrete point for one end of one truck's trip.
//!
//! Resolution happens in two levels. The first picks a county (or an import/export facility, or a
//! fixed border crossing for shipments to and from the non-contiguous zone). The second, only when
//! the configured granularity is `numas`, splits the county into a sub-county zone. Missing or
//! degenerate lookup data at either level yields `Point::Unresolved` for just that end of that
//! trip.

use std::fmt;

use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

use crate::sampler::sample_weighted;
use crate::{AggregateFlow, Config, Granularity, LookupTables, OutputFormat, Result};

/// How unresolved points are written out.
pub const UNRESOLVED: &str = "NA";

/// Transport modes that move freight through an airport, seaport, or land border.
pub const IMPORT_EXPORT_MODES: [&str; 3] = ["1", "3", "4"];

/// The zone that can only be reached by crossing into Canada.
pub const BORDER_ROUTED_ZONE: &str = "20";
/// I-5 at the Washington / British Columbia border
pub const COASTAL_BORDER_CROSSING: &str = "3004";
/// I-15 at the Montana / Alberta border
pub const INLAND_BORDER_CROSSING: &str = "3310";

// CA, OR, WA, NV, AZ, ID, UT. Trucks from these states drive up the coast.
const WEST_COAST_STATES: [&str; 7] = ["06", "41", "53", "32", "04", "16", "49"];

/// Zones in the west coast states, also matched when written without a leading zero.
fn is_west_coast_zone_number(zone: u32) -> bool {
    (61..69).contains(&zone)
        || (411..419).contains(&zone)
        || (531..539).contains(&zone)
        || (321..329).contains(&zone)
        || (41..49).contains(&zone)
        || zone == 160
        || (491..499).contains(&zone)
}

/// Does this zone (or county, whose first two digits are the state) lie on the west coast?
pub fn is_west_coast(zone: &str) -> bool {
    if let Some(state) = zone.get(0..2) {
        if WEST_COAST_STATES.contains(&state) {
            return true;
        }
    }
    zone.parse::<u32>()
        .map(is_west_coast_zone_number)
        .unwrap_or(false)
}

/// The crossing used by trucks heading to or from the non-contiguous zone, depending on where the
/// other end of the trip is.
pub fn border_crossing(other_zone: &str) -> &'static str {
    if is_west_coast(other_zone) {
        COASTAL_BORDER_CROSSING
    } else {
        INLAND_BORDER_CROSSING
    }
}

pub fn is_import_export_mode(mode: &str) -> bool {
    IMPORT_EXPORT_MODES.contains(&mode)
}

/// One end of a trip after disaggregation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Point {
    /// A county, sub-county zone, facility, or border crossing
    Resolved(String),
    /// Lookup data was missing, so the point couldn't be placed.
    Unresolved,
}

impl Point {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Point::Resolved(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Point::Resolved(x) => x,
            Point::Unresolved => UNRESOLVED,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum End {
    Origin,
    Destination,
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            End::Origin => write!(f, "origin"),
            End::Destination => write!(f, "destination"),
        }
    }
}

/// Resolves trip ends against a fixed set of tables. Holds only shared references, so each worker
/// can build its own.
pub struct Disaggregator<'a> {
    tables: &'a LookupTables,
    cfg: &'a Config,
}

impl<'a> Disaggregator<'a> {
    pub fn new(tables: &'a LookupTables, cfg: &'a Config) -> Disaggregator<'a> {
        Disaggregator { tables, cfg }
    }

    pub fn config(&self) -> &Config {
        self.cfg
    }

    /// Pick a point for one end of a truck carrying this flow. The other end is read from the
    /// flow's raw zone, never from an already-resolved point, so origin and destination can
    /// be resolved in either order.
    pub fn resolve(&self, flow: &AggregateFlow, end: End, rng: &mut XorShiftRng) -> Point {
        let (zone, mode, other_zone) = match end {
            End::Origin => (&flow.origin, &flow.in_mode, &flow.destination),
            End::Destination => (&flow.destination, &flow.out_mode, &flow.origin),
        };

        if is_import_export_mode(mode) {
            // Not every zone has a facility for every mode. If there's none, place the truck
            // like any other.
            if let Some(facility) = self.pick_facility(zone, mode, rng) {
                return Point::Resolved(facility);
            }
        }

        let county = if zone == BORDER_ROUTED_ZONE {
            border_crossing(other_zone).to_string()
        } else {
            match self.pick_county(end, zone, &flow.sctg, rng) {
                Ok(county) => county,
                Err(err) => {
                    debug!("Can't place {} of {:?}: {}", end, flow, err);
                    return Point::Unresolved;
                }
            }
        };

        match self.pick_subzone(end, county, &flow.sctg, rng) {
            Ok(point) => Point::Resolved(point),
            Err(err) => {
                debug!("Can't place {} of {:?} within its county: {}", end, flow, err);
                Point::Unresolved
            }
        }
    }

    fn pick_facility(&self, zone: &str, mode: &str, rng: &mut XorShiftRng) -> Option<String> {
        let weights = self.tables.import_export.lookup(zone, mode).ok()?;
        let facility = match sample_weighted(rng, weights) {
            Ok(facility) => facility,
            Err(err) => {
                debug!("No usable facility for zone {} mode {}: {}", zone, mode, err);
                return None;
            }
        };

        // CSV output only holds sub-county zones. A facility outside every known numa is placed
        // through its county instead.
        if self.cfg.granularity == Granularity::Numas && self.cfg.output_format == OutputFormat::Csv
        {
            let numa = self
                .tables
                .facilities
                .get(facility)
                .and_then(|f| f.numa.clone());
            if numa.is_none() {
                debug!("Facility {} has no numa; placing by county", facility);
            }
            return numa;
        }
        Some(facility.clone())
    }

    fn pick_county(
        &self,
        end: End,
        zone: &str,
        sctg: &str,
        rng: &mut XorShiftRng,
    ) -> Result<String> {
        let weights = self.tables.county_table(end).lookup(zone, sctg)?;
        sample_weighted(rng, weights).cloned()
    }

    fn pick_subzone(
        &self,
        end: End,
        county: String,
        sctg: &str,
        rng: &mut XorShiftRng,
    ) -> Result<String> {
        if self.cfg.granularity == Granularity::Counties {
            return Ok(county);
        }
        let weights = self.tables.local_table(end).lookup(&county, sctg)?;
        sample_weighted(rng, weights).cloned()
    }
}
