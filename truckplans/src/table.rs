use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{End, Error, Result};

/// Relative weights of candidate points, keyed by point name. Weights don't need to sum to 1.
pub type Weights = BTreeMap<String, f64>;

/// A two-level lookup from a composite key to a distribution over points. Depending on the table,
/// the key is (zone, commodity), (zone, transport mode), or (county, commodity).
///
/// Tables are built once while loading and only read afterwards. BTreeMaps keep iteration order
/// fixed, so a seeded RNG always draws the same points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    pub name: String,
    entries: BTreeMap<String, BTreeMap<String, Weights>>,
}

impl ProbabilityTable {
    pub fn new<S: Into<String>>(name: S) -> ProbabilityTable {
        ProbabilityTable {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Repeated rows for the same point accumulate weight.
    pub fn insert(&mut self, key1: &str, key2: &str, point: &str, weight: f64) {
        *self
            .entries
            .entry(key1.to_string())
            .or_insert_with(BTreeMap::new)
            .entry(key2.to_string())
            .or_insert_with(BTreeMap::new)
            .entry(point.to_string())
            .or_insert(0.0) += weight;
    }

    pub fn lookup(&self, key1: &str, key2: &str) -> Result<&Weights> {
        self.entries
            .get(key1)
            .and_then(|inner| inner.get(key2))
            .ok_or_else(|| Error::KeyNotFound {
                table: self.name.clone(),
                key1: key1.to_string(),
                key2: key2.to_string(),
            })
    }

    pub fn contains(&self, key1: &str, key2: &str) -> bool {
        self.lookup(key1, key2).is_ok()
    }

    /// The number of composite keys
    pub fn len(&self) -> usize {
        self.entries.values().map(|inner| inner.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a named point is, and which sub-county zone contains it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub x: f64,
    pub y: f64,
    pub numa: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityTable {
    facilities: BTreeMap<String, Facility>,
}

impl FacilityTable {
    pub fn new() -> FacilityTable {
        FacilityTable::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, facility: Facility) {
        self.facilities.insert(name.into(), facility);
    }

    pub fn get(&self, name: &str) -> Option<&Facility> {
        self.facilities.get(name)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

/// Every table the disaggregator reads from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupTables {
    /// Production side: zone and commodity to origin county
    pub make_table: ProbabilityTable,
    /// Consumption side: zone and commodity to destination county
    pub use_table: ProbabilityTable,
    /// County and commodity to origin numa
    pub make_local: ProbabilityTable,
    /// County and commodity to destination numa
    pub use_local: ProbabilityTable,
    /// Zone and transport mode to airport, seaport, or border crossing
    pub import_export: ProbabilityTable,
    pub facilities: FacilityTable,
}

impl LookupTables {
    pub fn county_table(&self, end: End) -> &ProbabilityTable {
        match end {
            End::Origin => &self.make_table,
            End::Destination => &self.use_table,
        }
    }

    pub fn local_table(&self, end: End) -> &ProbabilityTable {
        match end {
            End::Origin => &self.make_local,
            End::Destination => &self.use_local,
        }
    }
}
