//! Scales annual flows down to the simulated period and expands them into individual trips,
//! spreading the work over independent partitions.

use rand_distr::{Binomial, Distribution};
use rand_xorshift::XorShiftRng;

use truckutil::{fork_rng, prettyprint_usize, seeded_rng, split_into_chunks, Timer};

use crate::{
    AggregateFlow, Config, Disaggregator, Error, LookupTables, Result, Trip, TripID, TripRecord,
};

/// How many of a flow's annual trucks show up in the simulated period. Each truck independently
/// appears with probability `Config::thinning_probability`.
pub fn thinned_count(trucks: u64, cfg: &Config, rng: &mut XorShiftRng) -> Result<u64> {
    let p = cfg.thinning_probability();
    let dist = Binomial::new(trucks, p).map_err(|err| {
        Error::InvalidDistribution(format!("binomial({}, {}): {}", trucks, p, err))
    })?;
    Ok(dist.sample(rng))
}

/// Expand some flows into trips, using one RNG and no shared mutable state. Trips come out in the
/// same order as the flows that produced them.
pub fn simulate_partition(
    flows: &[AggregateFlow],
    tables: &LookupTables,
    cfg: &Config,
    rng: &mut XorShiftRng,
) -> Result<Vec<Trip>> {
    let disaggregator = Disaggregator::new(tables, cfg);
    let mut trips = Vec::new();
    for flow in flows {
        let count = thinned_count(flow.trucks, cfg, rng)?;
        for _ in 0..count {
            trips.push(Trip::assemble(flow, &disaggregator, rng));
        }
    }
    Ok(trips)
}

/// Concatenate partitions in order, then hand out IDs 0 through N-1. This is the only place IDs
/// are assigned.
pub fn number_trips(partitions: Vec<Vec<Trip>>) -> Vec<TripRecord> {
    partitions
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(idx, trip)| trip.number(TripID(idx)))
        .collect()
}

/// Expand every flow into numbered trips.
///
/// Flows are split into `cfg.num_partitions` contiguous chunks. Each chunk gets its own RNG, forked
/// in chunk order from one seeded by `cfg.rng_seed`, so the same seed and partition count always
/// produce the same trips, no matter how threads get scheduled.
pub fn run(
    flows: Vec<AggregateFlow>,
    tables: &LookupTables,
    cfg: &Config,
    timer: &mut Timer,
) -> Result<Vec<TripRecord>> {
    cfg.validate()?;

    let max_trucks: u64 = flows.iter().map(|f| f.trucks).sum();
    info!(
        "Maximum of {} trucks from {} flows",
        prettyprint_usize(max_trucks as usize),
        prettyprint_usize(flows.len())
    );

    let mut rng = seeded_rng(cfg.rng_seed);
    let requests: Vec<(Vec<AggregateFlow>, XorShiftRng)> =
        split_into_chunks(flows, cfg.num_partitions)
            .into_iter()
            .map(|chunk| (chunk, fork_rng(&mut rng)))
            .collect();

    info!(
        "Creating truck plans with {} separate partitions",
        cfg.num_partitions
    );
    let partitions = timer.parallelize(
        "create truck plans",
        cfg.num_partitions,
        requests,
        |(chunk, mut rng)| simulate_partition(&chunk, tables, cfg, &mut rng),
    );
    let partitions = partitions.into_iter().collect::<Result<Vec<_>>>()?;

    timer.start("number trips");
    let trips = number_trips(partitions);
    timer.stop("number trips");

    let summary = BatchSummary::new(&trips);
    info!("Created plans for {} trucks", prettyprint_usize(summary.trips));
    if summary.unresolved_origins > 0 || summary.unresolved_destinations > 0 {
        timer.warn(format!(
            "{} origins and {} destinations couldn't be placed and are marked unresolved",
            prettyprint_usize(summary.unresolved_origins),
            prettyprint_usize(summary.unresolved_destinations)
        ));
    }

    Ok(trips)
}

/// Counts describing the outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub trips: usize,
    pub unresolved_origins: usize,
    pub unresolved_destinations: usize,
}

impl BatchSummary {
    pub fn new(trips: &[TripRecord]) -> BatchSummary {
        BatchSummary {
            trips: trips.len(),
            unresolved_origins: trips.iter().filter(|t| !t.origin.is_resolved()).count(),
            unresolved_destinations: trips
                .iter()
                .filter(|t| !t.destination.is_resolved())
                .count(),
        }
    }
}
