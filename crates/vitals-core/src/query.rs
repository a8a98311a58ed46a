//! Read-only queries over a loaded collection.

use std::cmp::Ordering;
use std::str::FromStr;

use vitals_contracts::{
    error::VitalsError,
    patient::{Collection, PatientRecord},
};

/// Fields a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    fn key(&self, record: &PatientRecord) -> f64 {
        match self {
            SortField::Height => record.height(),
            SortField::Weight => record.weight(),
            SortField::Bmi => record.bmi(),
        }
    }
}

impl FromStr for SortField {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            other => Err(VitalsError::InvalidQuery {
                reason: format!("invalid sort field '{other}'; select from height, weight, bmi"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(VitalsError::InvalidQuery {
                reason: format!("invalid order '{other}'; select between asc and desc"),
            }),
        }
    }
}

/// Every record paired with its id, ordered by `field`.
///
/// Ties keep id order, since the collection iterates by key.
pub fn sorted(
    collection: &Collection,
    field: SortField,
    order: SortOrder,
) -> Vec<(String, PatientRecord)> {
    let mut rows: Vec<(String, PatientRecord)> = collection
        .iter()
        .map(|(id, record)| (id.clone(), record.clone()))
        .collect();

    rows.sort_by(|(_, a), (_, b)| {
        let ord = field.key(a).partial_cmp(&field.key(b)).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    rows
}
