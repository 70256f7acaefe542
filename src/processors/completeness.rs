use serde::{Deserialize, Serialize};

use crate::models::RawRow;
use crate::utils::constants::REQUIRED_COLUMNS;

/// Decides whether a raw row is complete enough to keep.
pub trait CompletenessPredicate {
    fn is_complete(&self, headers: &[String], row: &RawRow) -> bool;
}

/// Drops a row when any column at all is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllColumnsPresent;

impl CompletenessPredicate for AllColumnsPresent {
    fn is_complete(&self, _headers: &[String], row: &RawRow) -> bool {
        !row.has_missing_values()
    }
}

/// Drops a row only when one of the listed columns is missing.
#[derive(Debug, Clone)]
pub struct RequiredColumnsPresent {
    columns: Vec<String>,
}

impl RequiredColumnsPresent {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for RequiredColumnsPresent {
    fn default() -> Self {
        Self::new(REQUIRED_COLUMNS)
    }
}

impl CompletenessPredicate for RequiredColumnsPresent {
    fn is_complete(&self, headers: &[String], row: &RawRow) -> bool {
        self.columns.iter().all(|column| {
            headers
                .iter()
                .position(|h| h == column)
                .is_some_and(|index| row.get(index).is_some())
        })
    }
}

impl<F> CompletenessPredicate for F
where
    F: Fn(&[String], &RawRow) -> bool,
{
    fn is_complete(&self, headers: &[String], row: &RawRow) -> bool {
        self(headers, row)
    }
}

/// Configurable choice between the built-in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletenessPolicy {
    #[default]
    AllColumns,
    RequiredColumns,
}

impl CompletenessPolicy {
    pub fn predicate(&self) -> Box<dyn CompletenessPredicate> {
        match self {
            CompletenessPolicy::AllColumns => Box::new(AllColumnsPresent),
            CompletenessPolicy::RequiredColumns => Box::new(RequiredColumnsPresent::default()),
        }
    }
}
