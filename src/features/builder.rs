//! Feature vector construction
//!
//! Turns a [`Selection`] into the single row the classifier scores. The row
//! always has exactly the schema's columns in the schema's order:
//!
//! ```text
//! schema:  VAX_DOSE_SERIES | VAX_MANU_MODERNA | ... | VAX_SITE_RA
//! row:           2         |        1         | ... |      0
//! ```
//!
//! Categorical fields use one-hot indicators with a dropped reference level. A
//! value encodes as all zeros for its field when it has no indicator (`Other`)
//! or when its indicator column is not part of the schema. Both cases are
//! reported through [`Encoding::Baseline`] so callers can see which applied.

use serde::Serialize;

use super::schema::{FeatureSchema, DOSE_COLUMN};
use super::Selection;

/// How one categorical field was encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoding {
    /// This indicator column was set to 1
    Indicator { column: String },
    /// All indicators of the field left at 0
    Baseline { reason: BaselineReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineReason {
    /// The value is the reference level and has no column of its own
    NoIndicator,
    /// The value has an indicator name but the schema does not carry it
    NotInSchema { column: String },
}

impl Encoding {
    pub fn is_baseline(&self) -> bool {
        matches!(self, Encoding::Baseline { .. })
    }
}

/// Per-field encoding outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEncodings {
    pub manufacturer: Encoding,
    pub route: Encoding,
    pub site: Encoding,
}

/// One named cell of the row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub column: String,
    pub value: f64,
}

/// Single-row feature vector, ordered as its schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    columns: Vec<FeatureValue>,
    encodings: FieldEncodings,
}

impl FeatureRow {
    pub fn columns(&self) -> &[FeatureValue] {
        &self.columns
    }

    pub fn encodings(&self) -> &FieldEncodings {
        &self.encodings
    }

    /// Raw values in column order
    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.value).collect()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns.iter().find(|c| c.column == column).map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn encode(indicator: Option<&str>, schema: &FeatureSchema, values: &mut [f64]) -> Encoding {
    let Some(column) = indicator else {
        return Encoding::Baseline { reason: BaselineReason::NoIndicator };
    };

    match schema.position(column) {
        Some(pos) => {
            values[pos] = 1.0;
            Encoding::Indicator { column: column.to_string() }
        }
        None => Encoding::Baseline {
            reason: BaselineReason::NotInSchema { column: column.to_string() },
        },
    }
}

/// Build the feature row for `selection` against `schema`.
///
/// Pure: identical inputs always give identical rows.
pub fn build_feature_row(selection: &Selection, schema: &FeatureSchema) -> FeatureRow {
    let mut values = vec![0.0; schema.len()];

    if let Some(pos) = schema.position(DOSE_COLUMN) {
        values[pos] = f64::from(selection.dose.get());
    }

    let encodings = FieldEncodings {
        manufacturer: encode(selection.manufacturer.indicator_column(), schema, &mut values),
        route: encode(selection.route.indicator_column(), schema, &mut values),
        site: encode(selection.site.indicator_column(), schema, &mut values),
    };

    let columns = schema
        .columns()
        .iter()
        .zip(values)
        .map(|(column, value)| FeatureValue { column: column.clone(), value })
        .collect();

    FeatureRow { columns, encodings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::vaers_schema;
    use crate::features::{DoseNumber, Manufacturer, Route, Site};

    const INDICATORS: [&str; 6] = [
        "VAX_MANU_MODERNA",
        "VAX_MANU_PFIZER\\BIONTECH",
        "VAX_ROUTE_IM",
        "VAX_ROUTE_SYR",
        "VAX_SITE_LA",
        "VAX_SITE_RA",
    ];

    fn selection(m: Manufacturer, dose: u8, r: Route, s: Site) -> Selection {
        Selection {
            manufacturer: m,
            dose: DoseNumber::new(dose).unwrap(),
            route: r,
            site: s,
        }
    }

    #[test]
    fn test_moderna_first_dose_im_left_arm() {
        let sel = selection(Manufacturer::Moderna, 1, Route::Intramuscular, Site::LeftArm);
        let row = build_feature_row(&sel, &vaers_schema());

        assert_eq!(row.get("VAX_DOSE_SERIES"), Some(1.0));
        assert_eq!(row.get("VAX_MANU_MODERNA"), Some(1.0));
        assert_eq!(row.get("VAX_ROUTE_IM"), Some(1.0));
        assert_eq!(row.get("VAX_SITE_LA"), Some(1.0));
        assert_eq!(row.get("VAX_MANU_PFIZER\\BIONTECH"), Some(0.0));
        assert_eq!(row.get("VAX_ROUTE_SYR"), Some(0.0));
        assert_eq!(row.get("VAX_SITE_RA"), Some(0.0));
    }

    #[test]
    fn test_pfizer_third_dose_other_route_and_site() {
        let sel = selection(Manufacturer::PfizerBiontech, 3, Route::Other, Site::Other);
        let row = build_feature_row(&sel, &vaers_schema());

        assert_eq!(row.get("VAX_DOSE_SERIES"), Some(3.0));
        assert_eq!(row.get("VAX_MANU_PFIZER\\BIONTECH"), Some(1.0));
        for col in INDICATORS.iter().filter(|c| !c.starts_with("VAX_MANU_PFIZER")) {
            assert_eq!(row.get(col), Some(0.0), "{}", col);
        }
        assert_eq!(
            row.encodings().route,
            Encoding::Baseline { reason: BaselineReason::NoIndicator }
        );
        assert_eq!(
            row.encodings().site,
            Encoding::Baseline { reason: BaselineReason::NoIndicator }
        );
    }

    #[test]
    fn test_dropped_reference_level_encodes_as_baseline() {
        // Pfizer as the dropped level: no column for it in the schema
        let schema = FeatureSchema::new([
            "VAX_DOSE_SERIES",
            "VAX_MANU_MODERNA",
            "VAX_ROUTE_IM",
            "VAX_SITE_LA",
        ])
        .unwrap();
        let sel = selection(Manufacturer::PfizerBiontech, 2, Route::Syringe, Site::RightArm);
        let row = build_feature_row(&sel, &schema);

        assert_eq!(row.values(), vec![2.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            row.encodings().manufacturer,
            Encoding::Baseline {
                reason: BaselineReason::NotInSchema { column: "VAX_MANU_PFIZER\\BIONTECH".to_string() }
            }
        );
        assert!(row.encodings().route.is_baseline());
        assert!(row.encodings().site.is_baseline());
    }

    #[test]
    fn test_row_matches_schema_for_every_selection() {
        let schema = vaers_schema();
        for sel in Selection::all() {
            let row = build_feature_row(&sel, &schema);
            let names: Vec<&str> = row.columns().iter().map(|c| c.column.as_str()).collect();
            assert_eq!(names, schema.columns().iter().map(String::as_str).collect::<Vec<_>>());

            let dose = f64::from(sel.dose.get());
            for cell in row.columns() {
                assert!(
                    cell.value == 0.0 || cell.value == 1.0 || cell.value == dose,
                    "{:?} -> {:?}",
                    sel,
                    cell
                );
            }

            for prefix in ["VAX_MANU_", "VAX_ROUTE_", "VAX_SITE_"] {
                let hot = row
                    .columns()
                    .iter()
                    .filter(|c| c.column.starts_with(prefix) && c.value == 1.0)
                    .count();
                assert!(hot <= 1, "{:?} sets {} {} columns", sel, hot, prefix);
            }
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let schema = vaers_schema();
        let sel = selection(Manufacturer::Moderna, 2, Route::Syringe, Site::RightArm);
        assert_eq!(build_feature_row(&sel, &schema), build_feature_row(&sel, &schema));
    }

    #[test]
    fn test_order_follows_schema_not_encoding_order() {
        let schema = FeatureSchema::new([
            "VAX_SITE_RA",
            "VAX_ROUTE_SYR",
            "VAX_MANU_MODERNA",
            "VAX_DOSE_SERIES",
        ])
        .unwrap();
        let sel = selection(Manufacturer::Moderna, 3, Route::Syringe, Site::RightArm);
        let row = build_feature_row(&sel, &schema);

        assert_eq!(row.columns()[0].column, "VAX_SITE_RA");
        assert_eq!(row.columns()[3].column, "VAX_DOSE_SERIES");
        assert_eq!(row.values(), vec![1.0, 1.0, 1.0, 3.0]);
    }
}
