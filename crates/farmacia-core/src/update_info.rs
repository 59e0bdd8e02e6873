use chrono::NaiveDate;

/// Human-readable notice about when the dataset was last refreshed.
///
/// The date is handed in at construction from configuration; this type never
/// looks at the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataUpdateInfo {
    raw: Option<String>,
}

impl DataUpdateInfo {
    #[must_use]
    pub fn new(raw: Option<String>) -> Self {
        Self {
            raw: raw.filter(|v| !v.trim().is_empty()),
        }
    }

    /// The configured date as `DD/MM/YYYY`, or the raw value when it is not
    /// an ISO `YYYY-MM-DD` date.
    #[must_use]
    pub fn formatted_date(&self) -> Option<String> {
        self.raw.as_deref().map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_or_else(|_| raw.to_string(), |d| d.format("%d/%m/%Y").to_string())
        })
    }

    #[must_use]
    pub fn display_text(&self) -> String {
        match self.formatted_date() {
            Some(date) => format!("Dados atualizados em: {date}"),
            None => "Data de atualização não disponível".to_string(),
        }
    }
}
