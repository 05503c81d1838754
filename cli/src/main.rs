//! Tools for turning annual freight-truck flows between zones into individual truck plans. These
//! are bundled as a single executable.

#[macro_use]
extern crate log;

mod disaggregate;

use anyhow::Result;
use structopt::StructOpt;

use truckutil::Timer;

#[derive(StructOpt)]
#[structopt(name = "truckcli", about = "Freight truck plan multi-tool")]
enum Command {
    /// Sample individual truck trips from annual flows and write them as CSV or as an agent
    /// population
    Disaggregate {
        #[structopt(flatten)]
        args: disaggregate::Args,
    },
    /// Convert a delimited lookup table or flow file into a binary cache. A run prefers
    /// `<name>.bin` over `<name>.csv` in the same directory.
    BuildTable {
        /// The path to a delimited table with a header
        #[structopt(long)]
        input: String,
        /// The path to write, usually ending in `.bin`
        #[structopt(long)]
        output: String,
    },
    /// Print a table, either delimited or a binary cache, as JSON
    DumpJSON {
        #[structopt()]
        path: String,
    },
}

fn main() -> Result<()> {
    let cmd = Command::from_args();

    // JSON goes to stdout, so keep it free of log lines
    if !matches!(cmd, Command::DumpJSON { .. }) {
        truckutil::logger::setup();
    }

    match cmd {
        Command::Disaggregate { args } => disaggregate::run(args)?,
        Command::BuildTable { input, output } => build_table(input, output)?,
        Command::DumpJSON { path } => dump_json(path)?,
    }
    Ok(())
}

fn build_table(input: String, output: String) -> Result<()> {
    let mut timer = Timer::new(format!("convert {} to {}", input, output));
    timer.start("parse");
    let table = truckio::load_table(&input)?;
    timer.stop("parse");
    info!("{} is a {:?} table", input, table.kind());
    timer.start("write");
    truckio::write_binary(&output, &table)?;
    timer.stop("write");
    Ok(())
}

fn dump_json(path: String) -> Result<()> {
    let table = truckio::load_table(&path)?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
