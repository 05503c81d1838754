use std::fmt;

use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

use crate::departure::sample_departure;
use crate::{Disaggregator, End, Point};

/// Annual truck traffic carrying one commodity between two zones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateFlow {
    pub origin: String,
    pub destination: String,
    /// Commodity code
    pub sctg: String,
    /// How the freight entered the country, if imported
    pub in_mode: String,
    /// How the freight leaves the country, if exported
    pub out_mode: String,
    /// Vehicle configuration
    pub config: String,
    /// Trucks per year
    pub trucks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripID(pub usize);

impl fmt::Display for TripID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One simulated truck, before it has an ID. IDs are only handed out once every partition's trips
/// have been merged; see `number_trips`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub origin: Point,
    pub destination: Point,
    pub sctg: String,
    pub config: String,
    /// Seconds since the start of the simulated horizon
    pub departure: u64,
}

impl Trip {
    /// Place both ends of one truck carrying this flow and pick when it leaves. The origin is
    /// always resolved before the destination. Tables are only read.
    pub fn assemble(
        flow: &AggregateFlow,
        disaggregator: &Disaggregator,
        rng: &mut XorShiftRng,
    ) -> Trip {
        let origin = disaggregator.resolve(flow, End::Origin, rng);
        let destination = disaggregator.resolve(flow, End::Destination, rng);
        let departure = sample_departure(disaggregator.config(), rng);
        Trip {
            origin,
            destination,
            sctg: flow.sctg.clone(),
            config: flow.config.clone(),
            departure,
        }
    }

    pub fn number(self, id: TripID) -> TripRecord {
        TripRecord {
            id,
            origin: self.origin,
            destination: self.destination,
            sctg: self.sctg,
            config: self.config,
            departure: self.departure,
        }
    }
}

/// A finished truck plan: one drive from origin to destination, leaving at `departure`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: TripID,
    pub origin: Point,
    pub destination: Point,
    pub sctg: String,
    pub config: String,
    pub departure: u64,
}

#[cfg(test)]
mod tests {
    use truckutil::seeded_rng;

    use super::*;
    use crate::{Config, Granularity, LookupTables};

    #[test]
    fn assemble_copies_through_cargo() {
        let mut tables = LookupTables::default();
        tables.make_table.insert("06", "01", "06037", 1.0);
        tables.use_table.insert("36", "01", "36061", 1.0);
        let cfg = Config {
            granularity: Granularity::Counties,
            number_days: 7,
            ..Default::default()
        };
        let flow = AggregateFlow {
            origin: "06".to_string(),
            destination: "36".to_string(),
            sctg: "01".to_string(),
            in_mode: "2".to_string(),
            out_mode: "2".to_string(),
            config: "5".to_string(),
            trucks: 1,
        };

        let d = Disaggregator::new(&tables, &cfg);
        let mut rng = seeded_rng(42);
        let trip = Trip::assemble(&flow, &d, &mut rng);
        assert_eq!(trip.origin, Point::Resolved("06037".to_string()));
        assert_eq!(trip.destination, Point::Resolved("36061".to_string()));
        assert_eq!(trip.sctg, "01");
        assert_eq!(trip.config, "5");
        assert!(trip.departure < cfg.horizon_seconds());

        let record = trip.clone().number(TripID(3));
        assert_eq!(record.id, TripID(3));
        assert_eq!(record.origin, trip.origin);
        assert_eq!(record.departure, trip.departure);
    }
}
