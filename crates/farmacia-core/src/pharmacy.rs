use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters left untouched when a filter value is written into a query string.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// One row of the pharmacy dataset.
///
/// `cnpj` is the business registration number and is only ever compared as
/// an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub cnpj: String,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// State → city → neighborhood selection.
///
/// `None` means "no constraint" for that tier. Empty strings are treated the
/// same way by every consumer; use [`FilterSelection::new`] to normalize them
/// away up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
}

impl FilterSelection {
    #[must_use]
    pub fn new(state: Option<&str>, city: Option<&str>, neighborhood: Option<&str>) -> Self {
        Self {
            state: non_empty(state),
            city: non_empty(city),
            neighborhood: non_empty(neighborhood),
        }
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.state.is_none() && self.city.is_none() && self.neighborhood.is_none()
    }

    /// Case-insensitive equality on every tier that carries a value.
    #[must_use]
    pub fn matches(&self, pharmacy: &Pharmacy) -> bool {
        tier_matches(self.state.as_deref(), &pharmacy.state)
            && tier_matches(self.city.as_deref(), &pharmacy.city)
            && tier_matches(self.neighborhood.as_deref(), &pharmacy.neighborhood)
    }

    /// Renders the set tiers as `state=..&city=..&neighborhood=..`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        [
            ("state", self.state.as_deref()),
            ("city", self.city.as_deref()),
            ("neighborhood", self.neighborhood.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", utf8_percent_encode(v, QUERY_VALUE)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }

    /// Navigable location for this selection: `/` or `/?<query>`.
    #[must_use]
    pub fn location(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{query}")
        }
    }

    /// Parses a query string (with or without a leading `?` or `/?`).
    ///
    /// Unknown keys are ignored and the last occurrence of a key wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('/').trim_start_matches('?');
        let mut state = None;
        let mut city = None;
        let mut neighborhood = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw);
            match key {
                "state" => state = Some(value),
                "city" => city = Some(value),
                "neighborhood" => neighborhood = Some(value),
                _ => {}
            }
        }

        Self::new(state.as_deref(), city.as_deref(), neighborhood.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn tier_matches(filter: Option<&str>, value: &str) -> bool {
    match filter {
        Some(f) if !f.is_empty() => f.to_uppercase() == value.to_uppercase(),
        _ => true,
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pharmacy(neighborhood: &str) -> Pharmacy {
        Pharmacy {
            cnpj: "12.345.678/0001-90".to_string(),
            name: "Drogaria Central".to_string(),
            address: "Rua da Bahia, 100".to_string(),
            neighborhood: neighborhood.to_string(),
            city: "BELO HORIZONTE".to_string(),
            state: "MG".to_string(),
        }
    }

    #[test]
    fn unset_selection_matches_everything() {
        assert!(FilterSelection::default().matches(&pharmacy("CENTRO")));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let filters = FilterSelection::new(Some("mg"), Some("Belo Horizonte"), Some("centro"));
        assert!(filters.matches(&pharmacy("CENTRO")));
    }

    #[test]
    fn mismatched_tier_rejects() {
        let filters = FilterSelection::new(Some("MG"), None, Some("SAVASSI"));
        assert!(!filters.matches(&pharmacy("CENTRO")));
    }

    #[test]
    fn empty_strings_normalize_to_unset() {
        let filters = FilterSelection::new(Some(""), Some("  "), None);
        assert!(filters.is_unset());
    }

    #[test]
    fn location_is_root_when_unset() {
        assert_eq!(FilterSelection::default().location(), "/");
    }

    #[test]
    fn location_encodes_set_tiers_in_order() {
        let filters = FilterSelection::new(Some("MG"), Some("BELO HORIZONTE"), None);
        assert_eq!(filters.location(), "/?state=MG&city=BELO%20HORIZONTE");
    }

    #[test]
    fn from_query_reads_back_location() {
        let original =
            FilterSelection::new(Some("MG"), Some("BELO HORIZONTE"), Some("SÃO BENTO"));
        assert_eq!(FilterSelection::from_query(&original.location()), original);
    }

    #[test]
    fn from_query_accepts_plus_as_space_and_ignores_unknown_keys() {
        let parsed = FilterSelection::from_query("?city=BELO+HORIZONTE&page=2&state=MG");
        assert_eq!(parsed.state.as_deref(), Some("MG"));
        assert_eq!(parsed.city.as_deref(), Some("BELO HORIZONTE"));
        assert!(parsed.neighborhood.is_none());
    }
}
