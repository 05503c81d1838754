//! Reading and writing the files around a run: lookup tables and flows in, truck plans out.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub use self::cache::{read_binary, write_binary};
pub use self::output::{write_csv, write_population, write_trips};
pub use self::paths::{load_simdir, table_path, SimInputs, TABLE_NAMES};
pub use self::tables::{load_table, parse_table, LoadedTable, TableKind};

mod cache;
mod output;
mod paths;
mod tables;
