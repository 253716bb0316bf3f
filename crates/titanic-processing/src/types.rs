//! Core data types shared across the processing crate.
//!
//! A [`PassengerRecord`] is one row of either source dataset. Every field is
//! optional because any CSV cell may be empty; the survived flag is absent for
//! all scoring rows.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::{optional_f64_column, optional_string_column};

/// Class label of the survived flag.
pub type Label = i64;

/// Which source dataset a row came from.
///
/// The tag travels with each row through the merge and feature engineering so
/// the merged data can be split back without relying on row positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// Labelled rows used for training and holdout evaluation.
    Modeling,
    /// Unlabelled rows that only receive predictions.
    Scoring,
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::Modeling => write!(f, "modeling"),
            Partition::Scoring => write!(f, "scoring"),
        }
    }
}

/// One passenger as read from `train.csv` or `test.csv`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub passenger_id: Option<i64>,
    pub survived: Option<Label>,
    pub pclass: Option<i64>,
    pub name: Option<String>,
    pub sex: Option<String>,
    pub age: Option<f64>,
    pub sib_sp: Option<f64>,
    pub parch: Option<f64>,
    pub ticket: Option<String>,
    pub fare: Option<f64>,
    pub cabin: Option<String>,
    pub embarked: Option<String>,
}

/// Convert a raw dataset into passenger records.
///
/// Columns that are absent (e.g. `Survived` in the scoring set) yield `None`
/// for every row. Numeric columns are cast to `f64` first, so integer or
/// float inference by the CSV reader makes no difference.
pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<PassengerRecord>> {
    let n_rows = df.height();

    let passenger_id = optional_f64_column(df, "PassengerId")?;
    let survived = optional_f64_column(df, "Survived")?;
    let pclass = optional_f64_column(df, "Pclass")?;
    let name = optional_string_column(df, "Name")?;
    let sex = optional_string_column(df, "Sex")?;
    let age = optional_f64_column(df, "Age")?;
    let sib_sp = optional_f64_column(df, "SibSp")?;
    let parch = optional_f64_column(df, "Parch")?;
    let ticket = optional_string_column(df, "Ticket")?;
    let fare = optional_f64_column(df, "Fare")?;
    let cabin = optional_string_column(df, "Cabin")?;
    let embarked = optional_string_column(df, "Embarked")?;

    let records = (0..n_rows)
        .map(|i| PassengerRecord {
            passenger_id: cell(&passenger_id, i).map(|v| v.round() as i64),
            survived: cell(&survived, i).map(|v| v.round() as Label),
            pclass: cell(&pclass, i).map(|v| v.round() as i64),
            name: cell(&name, i),
            sex: cell(&sex, i),
            age: cell(&age, i),
            sib_sp: cell(&sib_sp, i),
            parch: cell(&parch, i),
            ticket: cell(&ticket, i),
            fare: cell(&fare, i),
            cabin: cell(&cabin, i),
            embarked: cell(&embarked, i),
        })
        .collect();

    Ok(records)
}

fn cell<T: Clone>(column: &Option<Vec<Option<T>>>, row: usize) -> Option<T> {
    column
        .as_ref()
        .and_then(|values| values.get(row).cloned().flatten())
}
