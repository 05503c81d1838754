use anyhow::{Context, Result};

use truckplans::{AggregateFlow, FacilityTable, LookupTables};
use truckutil::{prettyprint_usize, Timer};

use crate::{load_table, TableKind};

/// Every table a run looks for in the simulation directory, by file stem. `facility_coords` is
/// optional; the rest are required.
pub const TABLE_NAMES: [&str; 7] = [
    "make_table",
    "use_table",
    "make_local",
    "use_local",
    "ie_nodes",
    "facility_coords",
    "faf_trucks",
];

/// Find a table in the simulation directory. A binary cache beside the delimited file wins.
pub fn table_path(simdir: &str, name: &str) -> Option<String> {
    let dir = std::path::Path::new(simdir);
    ["bin", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|path| path.exists())
        .map(|path| path.to_string_lossy().to_string())
}

/// Everything a run reads.
pub struct SimInputs {
    pub tables: LookupTables,
    pub flows: Vec<AggregateFlow>,
}

pub fn load_simdir(simdir: &str, timer: &mut Timer) -> Result<SimInputs> {
    let [make_name, use_name, make_local_name, use_local_name, ie_name, facility_name, flows_name] =
        TABLE_NAMES;
    timer.start(format!("load tables from {}", simdir));

    let required = |name: &str| -> Result<String> {
        table_path(simdir, name)
            .ok_or_else(|| anyhow!("{} has no {}.bin or {}.csv", simdir, name, name))
    };
    let probabilities = |name: &str, kind: TableKind| -> Result<_> {
        let path = required(name)?;
        let table = load_table(&path)?
            .into_probabilities(kind)
            .with_context(|| format!("reading {}", path))?;
        info!(
            "{} has {} distributions",
            path,
            prettyprint_usize(table.len())
        );
        Ok(table)
    };

    let make_table = probabilities(make_name, TableKind::County)?;
    let use_table = probabilities(use_name, TableKind::County)?;
    let make_local = probabilities(make_local_name, TableKind::Local)?;
    let use_local = probabilities(use_local_name, TableKind::Local)?;
    let import_export = probabilities(ie_name, TableKind::ImportExport)?;

    let facilities = match table_path(simdir, facility_name) {
        Some(path) => {
            let table = load_table(&path)?
                .into_facilities()
                .with_context(|| format!("reading {}", path))?;
            info!("{} has {} facilities", path, prettyprint_usize(table.len()));
            table
        }
        None => {
            warn!(
                "No {} in {}; facility points won't have coordinates",
                facility_name, simdir
            );
            FacilityTable::new()
        }
    };

    let path = required(flows_name)?;
    let flows = load_table(&path)?
        .into_flows()
        .with_context(|| format!("reading {}", path))?;
    info!("{} has {} flows", path, prettyprint_usize(flows.len()));

    timer.stop(format!("load tables from {}", simdir));
    Ok(SimInputs {
        tables: LookupTables {
            make_table,
            use_table,
            make_local,
            use_local,
            import_export,
            facilities,
        },
        flows,
    })
}
