use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["farmacia"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.api_url.is_none());
}

#[test]
fn parses_search_with_filters() {
    let cli = Cli::try_parse_from([
        "farmacia",
        "search",
        "--state",
        "MG",
        "--city",
        "BELO HORIZONTE",
        "--page",
        "3",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            state,
            city,
            neighborhood,
            location,
            page,
            limit,
        }) => {
            assert_eq!(state.as_deref(), Some("MG"));
            assert_eq!(city.as_deref(), Some("BELO HORIZONTE"));
            assert!(neighborhood.is_none());
            assert!(location.is_none());
            assert_eq!(page, 3);
            assert_eq!(limit, DEFAULT_LIMIT);
        }
        other => panic!("expected search command, got {other:?}"),
    }
}

#[test]
fn location_conflicts_with_explicit_filters() {
    let result = Cli::try_parse_from([
        "farmacia",
        "search",
        "--location",
        "/?state=MG",
        "--state",
        "SP",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_favorites_toggle() {
    let cli = Cli::try_parse_from(["farmacia", "favorites", "toggle", "12.345.678/0001-90"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Favorites {
            command: FavoritesCommands::Toggle { ref cnpj }
        }) if cnpj == "12.345.678/0001-90"
    ));
}

#[test]
fn parses_favorites_show() {
    let cli = Cli::try_parse_from(["farmacia", "favorites", "show"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Favorites {
            command: FavoritesCommands::Show
        })
    ));
}

#[test]
fn api_url_is_global() {
    let cli = Cli::try_parse_from([
        "farmacia",
        "favorites",
        "list",
        "--api-url",
        "http://localhost:9999",
    ])
    .expect("expected valid cli args");

    assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
}

#[test]
fn favorites_add_requires_cnpj() {
    assert!(Cli::try_parse_from(["farmacia", "favorites", "add"]).is_err());
}
