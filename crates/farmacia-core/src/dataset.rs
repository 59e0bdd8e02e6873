//! Flat-file pharmacy dataset.
//!
//! The dataset is the upstream open-data CSV export, re-read on every call.
//! It has no state/city columns: the whole file describes one metropolitan
//! area, so every record is stamped with the configured [`Region`].

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::error::DatasetError;
use crate::pharmacy::{FilterSelection, Pharmacy};

pub const DEFAULT_STATE: &str = "MG";
pub const DEFAULT_CITY: &str = "BELO HORIZONTE";

/// State and city assigned to every record in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub state: String,
    pub city: String,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            state: DEFAULT_STATE.to_string(),
            city: DEFAULT_CITY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    cnpj: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    neighborhood: String,
}

#[derive(Debug, Clone)]
pub struct PharmacyDataset {
    path: PathBuf,
    region: Region,
}

impl PharmacyDataset {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, region: Region) -> Self {
        Self {
            path: path.into(),
            region,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Returns every record matching `filters`, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be opened and
    /// [`DatasetError::Csv`] if any row fails to parse.
    pub fn read(&self, filters: &FilterSelection) -> Result<Vec<Pharmacy>, DatasetError> {
        let file = File::open(&self.path).map_err(|e| DatasetError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let pharmacies = self.read_from(file, filters)?;
        tracing::debug!(
            path = %self.path.display(),
            matched = pharmacies.len(),
            "dataset scanned"
        );
        Ok(pharmacies)
    }

    /// Returns every record whose CNPJ is in `cnpjs`, in file order.
    ///
    /// Records sharing a CNPJ are all returned.
    ///
    /// # Errors
    ///
    /// Same as [`PharmacyDataset::read`].
    pub fn find_by_cnpjs(&self, cnpjs: &[String]) -> Result<Vec<Pharmacy>, DatasetError> {
        if cnpjs.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: HashSet<&str> = cnpjs.iter().map(String::as_str).collect();
        let pharmacies = self.read(&FilterSelection::default())?;
        Ok(pharmacies
            .into_iter()
            .filter(|p| wanted.contains(p.cnpj.as_str()))
            .collect())
    }

    fn read_from<R: Read>(
        &self,
        source: R,
        filters: &FilterSelection,
    ) -> Result<Vec<Pharmacy>, DatasetError> {
        let csv_error = |e: csv::Error| DatasetError::Csv {
            path: self.path.display().to_string(),
            source: e,
        };

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers: StringRecord = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(map_header)
            .collect();

        let mut results = Vec::new();
        for record in reader.records() {
            let record = fit_to_width(record.map_err(csv_error)?, headers.len());
            let row: CsvRow = record.deserialize(Some(&headers)).map_err(csv_error)?;
            let pharmacy = Pharmacy {
                cnpj: row.cnpj,
                name: row.name,
                address: row.address,
                neighborhood: row.neighborhood,
                city: self.region.city.clone(),
                state: self.region.state.clone(),
            };
            if filters.matches(&pharmacy) {
                results.push(pharmacy);
            }
        }
        Ok(results)
    }
}

/// Pads short rows with empty fields and drops trailing extras, so a
/// ragged line in the export does not reject the whole file.
fn fit_to_width(mut record: StringRecord, width: usize) -> StringRecord {
    record.truncate(width);
    while record.len() < width {
        record.push_field("");
    }
    record
}

/// Maps the export's Portuguese column titles onto record fields.
fn map_header(header: &str) -> String {
    match header.trim_start_matches('\u{feff}').trim() {
        "CNPJ" => "cnpj".to_string(),
        "Farmácia" => "name".to_string(),
        "Endereço" => "address".to_string(),
        "Bairro" => "neighborhood".to_string(),
        other => other.to_lowercase(),
    }
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
