//! Plain-text rendering for command output.

use std::fmt::Write as _;

use farmacia_client::{CascadingFilter, FilterOptionsSource, PharmacyListItem, Tier};
use farmacia_core::Pagination;

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        format!("{}...", value.chars().take(width - 3).collect::<String>())
    } else {
        value.to_string()
    }
}

/// One row per pharmacy; favorites are marked with `*`.
pub(crate) fn pharmacy_table(items: &[PharmacyListItem]) -> String {
    if items.is_empty() {
        return "Nenhuma farmácia encontrada\n".to_string();
    }

    let mut out = format!(
        "  {:<20}{:<32}{:<24}ENDEREÇO\n",
        "CNPJ", "NOME", "BAIRRO"
    );
    for item in items {
        let p = &item.pharmacy;
        let marker = if item.is_favorite { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:<20}{:<32}{:<24}{}",
            p.cnpj,
            truncate(&p.name, 30),
            truncate(&p.neighborhood, 22),
            p.address
        );
    }
    out
}

pub(crate) fn pagination_line(pagination: &Pagination) -> String {
    format!(
        "Página {} de {} ({} farmácias)",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total
    )
}

pub(crate) fn favorite_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        return "Nenhuma farmácia favorita\n".to_string();
    }
    ids.iter().fold(String::new(), |mut out, id| {
        let _ = writeln!(out, "{id}");
        out
    })
}

/// Options for the first tier the user has not chosen yet.
pub(crate) fn next_tier_options<S: FilterOptionsSource>(
    filter: &CascadingFilter<S>,
) -> Option<String> {
    let selection = filter.selection();
    let (label, tier) = if selection.state.is_none() {
        ("Estados", Tier::State)
    } else if selection.city.is_none() {
        ("Cidades", Tier::City)
    } else if selection.neighborhood.is_none() {
        ("Bairros", Tier::Neighborhood)
    } else {
        return None;
    };
    let options = filter.options(tier);
    if options.is_empty() {
        return None;
    }
    Some(format!("{label}: {}", options.join(", ")))
}

pub(crate) fn unknown_option(tier: Tier, value: &str) -> String {
    match tier {
        Tier::State => format!("estado '{value}' não encontrado; filtro ignorado"),
        Tier::City => format!("cidade '{value}' não encontrada; filtro ignorado"),
        Tier::Neighborhood => format!("bairro '{value}' não encontrado; filtro ignorado"),
    }
}

#[cfg(test)]
mod tests {
    use farmacia_core::Pharmacy;

    use super::*;

    fn item(cnpj: &str, name: &str, is_favorite: bool) -> PharmacyListItem {
        PharmacyListItem {
            pharmacy: Pharmacy {
                cnpj: cnpj.to_string(),
                name: name.to_string(),
                address: "Rua da Bahia, 100".to_string(),
                neighborhood: "CENTRO".to_string(),
                city: "BELO HORIZONTE".to_string(),
                state: "MG".to_string(),
            },
            is_favorite,
        }
    }

    #[test]
    fn table_marks_favorites() {
        let table = pharmacy_table(&[
            item("12.345.678/0001-90", "Drogaria Central", true),
            item("98.765.432/0001-10", "Farmácia Savassi", false),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("* 12.345.678/0001-90"));
        assert!(lines[2].starts_with("  98.765.432/0001-10"));
        assert!(lines[1].ends_with("Rua da Bahia, 100"));
    }

    #[test]
    fn table_truncates_long_names() {
        let long = "Drogaria com um nome extremamente comprido demais";
        let table = pharmacy_table(&[item("1", long, false)]);
        assert!(table.contains("Drogaria com um nome extrem..."));
        assert!(!table.contains(long));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(pharmacy_table(&[]), "Nenhuma farmácia encontrada\n");
    }

    #[test]
    fn pagination_line_never_shows_zero_pages() {
        let pagination = Pagination {
            page: 1,
            limit: 50,
            total: 0,
            total_pages: 0,
            has_next_page: false,
            has_prev_page: false,
        };
        assert_eq!(pagination_line(&pagination), "Página 1 de 1 (0 farmácias)");
    }

    #[test]
    fn favorite_ids_one_per_line() {
        assert_eq!(
            favorite_ids(&["a".to_string(), "b".to_string()]),
            "a\nb\n"
        );
        assert_eq!(favorite_ids(&[]), "Nenhuma farmácia favorita\n");
    }

    #[test]
    fn unknown_option_names_the_tier() {
        assert_eq!(
            unknown_option(Tier::City, "GOTHAM"),
            "cidade 'GOTHAM' não encontrada; filtro ignorado"
        );
    }
}
