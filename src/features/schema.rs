//! Ordered feature-column schema shared by training and inference

use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// Numeric dose column; every schema must carry it
pub const DOSE_COLUMN: &str = "VAX_DOSE_SERIES";

/// Column names in the exact order the classifier consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists, blank or duplicate names and a
    /// missing dose column.
    pub fn new<I, S>(columns: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err("feature schema is empty".to_string());
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(format!("column {} has a blank name", i));
            }
            if positions.insert(name.clone(), i).is_some() {
                return Err(format!("duplicate column {:?}", name));
            }
        }

        if !positions.contains_key(DOSE_COLUMN) {
            return Err(format!("missing required column {:?}", DOSE_COLUMN));
        }

        Ok(Self { columns, positions })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

impl Serialize for FeatureSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

/// Columns of the deployed VAERS random forest
#[cfg(test)]
pub(crate) fn vaers_schema() -> FeatureSchema {
    FeatureSchema::new([
        "VAX_DOSE_SERIES",
        "VAX_MANU_MODERNA",
        "VAX_MANU_PFIZER\\BIONTECH",
        "VAX_ROUTE_IM",
        "VAX_ROUTE_SYR",
        "VAX_SITE_LA",
        "VAX_SITE_RA",
    ])
    .unwrap()
}
