//! Form selections and their one-hot feature encoding
//!
//! The four form fields are closed enumerations. Each categorical field maps to
//! at most one indicator column; `Other` has none and encodes as the all-zero
//! reference level.

pub mod builder;
pub mod schema;

pub use builder::{build_feature_row, BaselineReason, Encoding, FeatureRow, FieldEncodings};
pub use schema::{FeatureSchema, DOSE_COLUMN};

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidSelectionError;

/// Vaccine manufacturer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    PfizerBiontech,
    Moderna,
}

impl Manufacturer {
    pub const ALL: [Manufacturer; 2] = [Manufacturer::PfizerBiontech, Manufacturer::Moderna];

    pub fn label(self) -> &'static str {
        match self {
            Manufacturer::PfizerBiontech => "PFIZER\\BIONTECH",
            Manufacturer::Moderna => "MODERNA",
        }
    }

    pub fn indicator_column(self) -> Option<&'static str> {
        match self {
            Manufacturer::PfizerBiontech => Some("VAX_MANU_PFIZER\\BIONTECH"),
            Manufacturer::Moderna => Some("VAX_MANU_MODERNA"),
        }
    }
}

/// Dose number in the series (1, 2 or 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoseNumber(u8);

impl DoseNumber {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(dose: u8) -> Result<Self, InvalidSelectionError> {
        if (Self::MIN..=Self::MAX).contains(&dose) {
            Ok(Self(dose))
        } else {
            Err(InvalidSelectionError::new("dose", dose.to_string()))
        }
    }

    /// Range-checked conversion from an unconstrained JSON integer
    pub fn from_i64(dose: i64) -> Result<Self, InvalidSelectionError> {
        u8::try_from(dose)
            .map_err(|_| InvalidSelectionError::new("dose", dose.to_string()))
            .and_then(Self::new)
    }

    pub fn all() -> impl Iterator<Item = DoseNumber> {
        (Self::MIN..=Self::MAX).map(DoseNumber)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Administration route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Intramuscular,
    Syringe,
    Other,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Intramuscular, Route::Syringe, Route::Other];

    pub fn label(self) -> &'static str {
        match self {
            Route::Intramuscular => "Intramuscular (IM)",
            Route::Syringe => "Syringe (SYR)",
            Route::Other => "Other",
        }
    }

    /// `None` for the reference level
    pub fn indicator_column(self) -> Option<&'static str> {
        match self {
            Route::Intramuscular => Some("VAX_ROUTE_IM"),
            Route::Syringe => Some("VAX_ROUTE_SYR"),
            Route::Other => None,
        }
    }
}

/// Administration site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    LeftArm,
    RightArm,
    Other,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::LeftArm, Site::RightArm, Site::Other];

    pub fn label(self) -> &'static str {
        match self {
            Site::LeftArm => "Left Arm (LA)",
            Site::RightArm => "Right Arm (RA)",
            Site::Other => "Other",
        }
    }

    /// `None` for the reference level
    pub fn indicator_column(self) -> Option<&'static str> {
        match self {
            Site::LeftArm => Some("VAX_SITE_LA"),
            Site::RightArm => Some("VAX_SITE_RA"),
            Site::Other => None,
        }
    }
}

fn parse_label<T: Copy>(
    field: &'static str,
    raw: &str,
    options: &[T],
    label: impl Fn(T) -> &'static str,
) -> Result<T, InvalidSelectionError> {
    let raw = raw.trim();
    options
        .iter()
        .copied()
        .find(|opt| label(*opt) == raw)
        .ok_or_else(|| InvalidSelectionError::new(field, raw))
}

impl FromStr for Manufacturer {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("manufacturer", s, &Self::ALL, Self::label)
    }
}

impl FromStr for DoseNumber {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dose: u8 = s
            .trim()
            .parse()
            .map_err(|_| InvalidSelectionError::new("dose", s.trim()))?;
        Self::new(dose)
    }
}

impl FromStr for Route {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("route", s, &Self::ALL, Self::label)
    }
}

impl FromStr for Site {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("site", s, &Self::ALL, Self::label)
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for DoseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub manufacturer: Manufacturer,
    pub dose: DoseNumber,
    pub route: Route,
    pub site: Site,
}

impl Selection {
    /// Parse the raw form labels
    pub fn parse(
        manufacturer: &str,
        dose: &str,
        route: &str,
        site: &str,
    ) -> Result<Self, InvalidSelectionError> {
        Ok(Self {
            manufacturer: manufacturer.parse()?,
            dose: dose.parse()?,
            route: route.parse()?,
            site: site.parse()?,
        })
    }

    /// Every valid combination of the four fields
    pub fn all() -> impl Iterator<Item = Selection> {
        Manufacturer::ALL.into_iter().flat_map(|manufacturer| {
            DoseNumber::all().flat_map(move |dose| {
                Route::ALL.into_iter().flat_map(move |route| {
                    Site::ALL.into_iter().map(move |site| Selection {
                        manufacturer,
                        dose,
                        route,
                        site,
                    })
                })
            })
        })
    }
}
