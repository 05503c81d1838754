use std::io::Read;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use truckplans::{AggregateFlow, Facility, FacilityTable, ProbabilityTable};

/// The kinds of tables a run reads. The kind of a delimited file is detected from its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    /// Point name to coordinates, and optionally the numa containing it
    Facilities,
    /// Annual truck counts between zones
    Flows,
    /// Zone and commodity to county: the make and use tables
    County,
    /// Zone and transport mode to import/export facility
    ImportExport,
    /// County and commodity to numa: the local make and use tables
    Local,
}

// Older extracts name the zone column after the previous zone system.
const ZONE_COLUMNS: [&str; 2] = ["F4Z", "F3Z"];

impl TableKind {
    pub fn detect(headers: &csv::StringRecord) -> Result<TableKind> {
        let has = |name: &str| headers.iter().any(|h| h.trim() == name);
        let has_zone = ZONE_COLUMNS.into_iter().any(|z| has(z));

        if has("x") && has("y") {
            Ok(TableKind::Facilities)
        } else if has("dms_orig") {
            Ok(TableKind::Flows)
        } else if has_zone && has("sctg") {
            Ok(TableKind::County)
        } else if has_zone && has("mode") {
            Ok(TableKind::ImportExport)
        } else if has("county") {
            Ok(TableKind::Local)
        } else {
            bail!("Cannot determine input table type from columns {:?}", headers)
        }
    }
}

/// The contents of one table file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LoadedTable {
    Probabilities {
        kind: TableKind,
        table: ProbabilityTable,
    },
    Facilities(FacilityTable),
    Flows(Vec<AggregateFlow>),
}

impl LoadedTable {
    pub fn kind(&self) -> TableKind {
        match self {
            LoadedTable::Probabilities { kind, .. } => *kind,
            LoadedTable::Facilities(_) => TableKind::Facilities,
            LoadedTable::Flows(_) => TableKind::Flows,
        }
    }

    pub fn into_probabilities(self, expected: TableKind) -> Result<ProbabilityTable> {
        match self {
            LoadedTable::Probabilities { kind, table } if kind == expected => Ok(table),
            other => bail!("Expected a {:?} table, but got {:?}", expected, other.kind()),
        }
    }

    pub fn into_facilities(self) -> Result<FacilityTable> {
        match self {
            LoadedTable::Facilities(table) => Ok(table),
            other => bail!("Expected a Facilities table, but got {:?}", other.kind()),
        }
    }

    pub fn into_flows(self) -> Result<Vec<AggregateFlow>> {
        match self {
            LoadedTable::Flows(flows) => Ok(flows),
            other => bail!("Expected a Flows table, but got {:?}", other.kind()),
        }
    }
}

/// Load a table from a path. Files ending in `.bin` are binary caches written by `write_binary`;
/// anything else is parsed as comma-delimited text with a header.
pub fn load_table(path: &str) -> Result<LoadedTable> {
    if path.ends_with(".bin") {
        return crate::read_binary(path);
    }
    let name = std::path::Path::new(path)
        .file_stem()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    let file = fs_err::File::open(path)?;
    parse_table(&name, file).with_context(|| format!("loading {}", path))
}

/// Parse a delimited table. `name` is only used to label the table in errors.
pub fn parse_table<R: Read>(name: &str, reader: R) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let kind = TableKind::detect(&headers)?;
    let column = |col: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == col)
            .ok_or_else(|| anyhow!("missing column {}", col))
    };
    let zone_column = || -> Result<usize> {
        ZONE_COLUMNS
            .iter()
            .find_map(|z| headers.iter().position(|h| h == *z))
            .ok_or_else(|| anyhow!("missing zone column"))
    };

    match kind {
        TableKind::Facilities => {
            let (name_col, x_col, y_col) = (column("name")?, column("x")?, column("y")?);
            let numa_col = column("numa").ok();
            let mut table = FacilityTable::new();
            for (idx, rec) in reader.records().enumerate() {
                let rec = rec?;
                let row = Row::new(&rec, idx);
                let numa = match numa_col {
                    Some(col) => Some(row.text(col)?).filter(|x| !x.is_empty() && x != "NA"),
                    None => None,
                };
                table.insert(
                    row.text(name_col)?,
                    Facility {
                        x: row.number(x_col)?,
                        y: row.number(y_col)?,
                        numa,
                    },
                );
            }
            Ok(LoadedTable::Facilities(table))
        }
        TableKind::Flows => {
            let cols = [
                column("dms_orig")?,
                column("dms_dest")?,
                column("sctg")?,
                column("fr_inmode")?,
                column("fr_outmode")?,
                column("type")?,
                column("trucks")?,
            ];
            let mut flows = Vec::new();
            for (idx, rec) in reader.records().enumerate() {
                let rec = rec?;
                let row = Row::new(&rec, idx);
                flows.push(AggregateFlow {
                    origin: row.text(cols[0])?,
                    destination: row.text(cols[1])?,
                    sctg: row.text(cols[2])?,
                    in_mode: row.text(cols[3])?,
                    out_mode: row.text(cols[4])?,
                    config: row.text(cols[5])?,
                    trucks: row.count(cols[6])?,
                });
            }
            Ok(LoadedTable::Flows(flows))
        }
        TableKind::County | TableKind::ImportExport | TableKind::Local => {
            let cols = match kind {
                TableKind::County => {
                    [zone_column()?, column("sctg")?, column("name")?, column("prob")?]
                }
                TableKind::ImportExport => {
                    [zone_column()?, column("mode")?, column("name")?, column("prob")?]
                }
                _ => [column("county")?, column("sctg")?, column("numa")?, column("p")?],
            };
            let mut table = ProbabilityTable::new(name);
            for (idx, rec) in reader.records().enumerate() {
                let rec = rec?;
                let row = Row::new(&rec, idx);
                table.insert(
                    &row.text(cols[0])?,
                    &row.text(cols[1])?,
                    &row.text(cols[2])?,
                    row.number(cols[3])?,
                );
            }
            Ok(LoadedTable::Probabilities { kind, table })
        }
    }
}

struct Row<'a> {
    rec: &'a csv::StringRecord,
    // The header is line 1
    line: usize,
}

impl<'a> Row<'a> {
    fn new(rec: &'a csv::StringRecord, idx: usize) -> Row<'a> {
        Row { rec, line: idx + 2 }
    }

    fn text(&self, col: usize) -> Result<String> {
        self.rec
            .get(col)
            .map(|x| x.to_string())
            .ok_or_else(|| anyhow!("line {} is missing column {}", self.line, col))
    }

    fn number(&self, col: usize) -> Result<f64> {
        let raw = self.text(col)?;
        raw.parse::<f64>()
            .with_context(|| format!("line {}: {} isn't a number", self.line, raw))
    }

    /// Counts may be written as decimals; the fractional part is dropped.
    fn count(&self, col: usize) -> Result<u64> {
        let x = self.number(col)?;
        if !x.is_finite() || x < 0.0 {
            bail!("line {}: {} isn't a valid count", self.line, x);
        }
        Ok(x as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(cols.to_vec())
    }

    #[test]
    fn detect_kinds() {
        let cases = vec![
            (vec!["name", "x", "y"], TableKind::Facilities),
            (vec!["dms_orig", "dms_dest", "trucks"], TableKind::Flows),
            (vec!["F4Z", "sctg", "name", "prob"], TableKind::County),
            (vec!["F3Z", "sctg", "name", "prob"], TableKind::County),
            (vec!["F4Z", "mode", "name", "prob"], TableKind::ImportExport),
            (vec!["county", "sctg", "numa", "p"], TableKind::Local),
        ];
        for (cols, kind) in cases {
            assert_eq!(TableKind::detect(&headers(&cols)).unwrap(), kind);
        }
        assert!(TableKind::detect(&headers(&["a", "b"])).is_err());
    }
}
