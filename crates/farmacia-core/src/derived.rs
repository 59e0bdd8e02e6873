//! Distinct, sorted option lists for each filter tier.

use std::collections::BTreeSet;

use crate::dataset::PharmacyDataset;
use crate::error::DatasetError;
use crate::pharmacy::{FilterSelection, Pharmacy};

impl PharmacyDataset {
    /// Distinct states present in the dataset.
    ///
    /// # Errors
    ///
    /// Propagates any [`DatasetError`] from reading the file.
    pub fn states(&self) -> Result<Vec<String>, DatasetError> {
        self.distinct(&FilterSelection::default(), |p| &p.state)
    }

    /// Distinct cities within `state`.
    ///
    /// # Errors
    ///
    /// Propagates any [`DatasetError`] from reading the file.
    pub fn cities(&self, state: &str) -> Result<Vec<String>, DatasetError> {
        self.distinct(&FilterSelection::new(Some(state), None, None), |p| &p.city)
    }

    /// Distinct neighborhoods within `city`, `state`.
    ///
    /// # Errors
    ///
    /// Propagates any [`DatasetError`] from reading the file.
    pub fn neighborhoods(&self, city: &str, state: &str) -> Result<Vec<String>, DatasetError> {
        self.distinct(&FilterSelection::new(Some(state), Some(city), None), |p| {
            &p.neighborhood
        })
    }

    fn distinct<F>(&self, filters: &FilterSelection, field: F) -> Result<Vec<String>, DatasetError>
    where
        F: Fn(&Pharmacy) -> &String,
    {
        let values: BTreeSet<String> = self
            .read(filters)?
            .iter()
            .map(field)
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        Ok(values.into_iter().collect())
    }
}
