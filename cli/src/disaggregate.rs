use anyhow::Result;
use structopt::StructOpt;

use truckplans::{Config, Granularity, OutputFormat};
use truckutil::Timer;

#[derive(StructOpt)]
pub struct Args {
    /// The directory holding the lookup tables and `faf_trucks`
    #[structopt(long, default_value = "data/simfiles/")]
    simdir: String,
    /// Where to write the trips. The extension picks the format: `.csv`, `.xml`, or `.xml.gz`.
    #[structopt(short, long, default_value = "sim_output.csv")]
    output: String,
    /// Fraction of the period's trucks to keep
    #[structopt(short, long, default_value = "1")]
    sample_rate: f64,
    /// How many days to simulate
    #[structopt(short = "d", long, default_value = "1")]
    number_days: u32,
    /// Place trip ends in `numas` or stop at `counties`
    #[structopt(short, long, default_value = "numas")]
    region: String,
    /// A seed for generating random numbers
    #[structopt(long, default_value = "42")]
    rng_seed: u64,
    /// Let departures fall on the last simulated day too
    #[structopt(long)]
    include_final_day: bool,
    /// Split the flows into this many independent chunks. Defaults to the number of CPUs.
    #[structopt(long)]
    num_partitions: Option<usize>,
}

impl Args {
    fn to_config(&self) -> Result<Config> {
        let cfg = Config {
            sample_rate: self.sample_rate,
            number_days: self.number_days,
            granularity: self.region.parse::<Granularity>()?,
            output_format: OutputFormat::from_path(&self.output)?,
            include_final_day: self.include_final_day,
            rng_seed: self.rng_seed,
            num_partitions: self.num_partitions.unwrap_or_else(truckutil::num_cpus),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn run(args: Args) -> Result<()> {
    // Bad flags are reported before anything is read
    let cfg = args.to_config()?;
    info!(
        "Simulating {} day(s) at sample rate {}, placing trips at {} level, writing {} to {}",
        cfg.number_days, cfg.sample_rate, cfg.granularity, cfg.output_format, args.output
    );

    let mut timer = Timer::new("disaggregate truck flows");
    let inputs = truckio::load_simdir(&args.simdir, &mut timer)?;
    let trips = truckplans::run(inputs.flows, &inputs.tables, &cfg, &mut timer)?;

    timer.start("write output");
    truckio::write_trips(
        &args.output,
        cfg.output_format,
        &trips,
        &inputs.tables.facilities,
    )?;
    timer.stop("write output");
    Ok(())
}
