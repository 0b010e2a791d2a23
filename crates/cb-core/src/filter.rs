//! Row filtering for listing frames
//!
//! A request is a [`FilterSpec`] (per-column constraints, AND-ed together)
//! plus one [`OutlierPolicy`]. The outlier policy runs first and defines the
//! universe the explicit constraints then narrow down.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{DataError, DataFrame, Series};
use crate::error::{CoreError, Result};

mod outlier;

#[cfg(test)]
mod tests;

pub use outlier::OutlierPolicy;

/// Constraint on a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Keep rows whose value, as text, is one of the allowed labels
    OneOf(BTreeSet<String>),
    /// Keep rows with `min <= value <= max`; either bound may be open
    Range { min: Option<f64>, max: Option<f64> },
}

impl Constraint {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Constraint::Range { min, max }
    }

    /// An empty selection or an open range places no restriction on rows
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Constraint::OneOf(values) => values.is_empty(),
            Constraint::Range { min, max } => min.is_none() && max.is_none(),
        }
    }

    fn check_type(&self, column: &str, series: &Series) -> Result<()> {
        if let (Constraint::Range { .. }, Series::String(_)) = (self, series) {
            return Err(DataError::TypeMismatch {
                column: column.to_string(),
                expected: "float64",
                actual: series.dtype(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether row `idx` of `series` satisfies the constraint
    ///
    /// Missing values never satisfy a restrictive constraint.
    pub fn matches(&self, series: &Series, idx: usize) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        match self {
            Constraint::OneOf(values) => series
                .label(idx)
                .is_some_and(|label| values.contains(&label)),
            Constraint::Range { min, max } => series.get_f64(idx).is_some_and(|v| {
                min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi)
            }),
        }
    }
}

/// Column constraints; an absent column is unconstrained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    constraints: IndexMap<String, Constraint>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the constraint on `column`
    pub fn with(mut self, column: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.insert(column.into(), constraint);
        self
    }

    pub fn one_of<I, S>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(column, Constraint::one_of(values))
    }

    pub fn range(self, column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        self.with(column, Constraint::range(min, max))
    }

    pub fn get(&self, column: &str) -> Option<&Constraint> {
        self.constraints.get(column)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.constraints.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Applies filter specs and outlier policies to frames
pub struct FilterEngine;

impl FilterEngine {
    /// Filter `df`, returning a new frame with the surviving rows in order
    pub fn apply(df: &DataFrame, spec: &FilterSpec, outlier: &OutlierPolicy) -> Result<DataFrame> {
        let mut mask = outlier.mask(df)?;
        let after_outliers = mask.iter().filter(|&&keep| keep).count();

        and_constraints(df, spec.iter(), &mut mask)?;
        let kept = mask.iter().filter(|&&keep| keep).count();

        debug!(
            "filter: {} rows, {} after outlier policy, {} after {} constraints",
            df.nrows(),
            after_outliers,
            kept,
            spec.len()
        );

        if kept == 0 {
            return Err(CoreError::EmptyFilterResult);
        }
        Ok(df.filter(&mask)?)
    }

    /// Distinct values of each requested column among rows passing `spec`
    ///
    /// A column's own constraint is ignored when computing its options, so a
    /// selection never hides its alternatives. Values are sorted with
    /// numeric-looking labels in numeric order. Columns the frame lacks get
    /// no options.
    pub fn facet_options<S: AsRef<str>>(
        df: &DataFrame,
        spec: &FilterSpec,
        columns: &[S],
    ) -> Result<IndexMap<String, Vec<String>>> {
        let mut options = IndexMap::new();
        for column in columns {
            let column = column.as_ref();
            let Ok(series) = df.column(column) else {
                debug!("facet '{}' not in dataset, no options", column);
                options.insert(column.to_string(), Vec::new());
                continue;
            };

            let mut mask = vec![true; df.nrows()];
            and_constraints(
                df,
                spec.iter().filter(|(name, _)| *name != column),
                &mut mask,
            )?;

            let indices: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();
            let values = series.take(&indices)?.unique_labels();
            options.insert(column.to_string(), values);
        }
        Ok(options)
    }
}

fn and_constraints<'a>(
    df: &DataFrame,
    constraints: impl Iterator<Item = (&'a str, &'a Constraint)>,
    mask: &mut [bool],
) -> Result<()> {
    for (column, constraint) in constraints {
        // an unset selector never touches its column, which may be absent
        if constraint.is_unconstrained() {
            continue;
        }
        let series = df.column(column)?;
        constraint.check_type(column, series)?;
        for (idx, keep) in mask.iter_mut().enumerate() {
            *keep = *keep && constraint.matches(series, idx);
        }
    }
    Ok(())
}
