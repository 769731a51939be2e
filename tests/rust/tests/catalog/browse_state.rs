//! URL browse state driving the listing pipeline

use mcpmart_core::{BrowseState, PageState, ProductType, SortOrder, ViewMode};
use pretty_assertions::assert_eq;
use tests::fixtures::catalog;

fn listing_ids(query: &str) -> Vec<String> {
    let state = BrowseState::from_query(query).unwrap();
    let mut pages = PageState::new(state.per_page);
    pages.set_criteria(state.to_criteria());
    pages.set_page(state.page);
    pages
        .apply(&catalog())
        .items
        .iter()
        .map(|p| p.id.to_string())
        .collect()
}

#[test]
fn test_query_drives_listing() {
    assert_eq!(listing_ids("category=databases"), vec!["1", "4"]);
    assert_eq!(listing_ids("types=mcp_client,ai_agent"), vec!["3", "2"]);
    assert_eq!(listing_ids("ratings=1000"), vec!["1", "3"]);
    assert_eq!(listing_ids("priceMax=10&sort=price_desc"), vec!["2", "1", "3"]);
    assert_eq!(listing_ids("q=agent&sort=name_asc"), vec!["1", "3"]);
}

#[test]
fn test_page_beyond_results_is_clamped() {
    assert_eq!(listing_ids("perPage=3&page=9"), vec!["4"]);
}

#[test]
fn test_state_round_trips_through_query() {
    let state = BrowseState {
        query: Some("postgres mcp".to_string()),
        category: Some("Databases".to_string()),
        sort: SortOrder::Newest,
        view: ViewMode::List,
        types: vec![ProductType::McpServer, ProductType::AiAgent],
        categories: vec!["AI".to_string()],
        ratings: vec![500, 1000],
        price_min: Some(0.5),
        price_max: Some(100.0),
        page: 2,
        per_page: 24,
    };

    let query = state.to_query();
    assert_eq!(BrowseState::from_query(&query).unwrap(), state);
    assert_eq!(BrowseState::from_query(&format!("?{}", query)).unwrap(), state);
}

#[test]
fn test_defaults_are_omitted() {
    let state = BrowseState {
        sort: SortOrder::NameAsc,
        ..BrowseState::default()
    };
    assert_eq!(state.to_query(), "sort=name_asc");
}

#[test]
fn test_unknown_keys_are_ignored() {
    let state = BrowseState::from_query("utm_source=mail&q=db").unwrap();
    assert_eq!(state.query.as_deref(), Some("db"));
}

#[test]
fn test_comma_in_category_survives_round_trip() {
    let state = BrowseState {
        categories: vec!["AI, ML".to_string(), "Databases".to_string()],
        page: 3,
        ..BrowseState::default()
    };

    let query = state.to_query();
    assert_eq!(BrowseState::from_query(&query).unwrap(), state);
}

#[test]
fn test_repeated_categories_drive_listing() {
    assert_eq!(
        listing_ids("categories=Research&categories=Clients"),
        vec!["3", "2"]
    );
}

#[test]
fn test_non_finite_price_bound_is_an_error() {
    assert!(BrowseState::from_query("priceMin=NaN").is_err());
    assert!(BrowseState::from_query("priceMax=inf").is_err());
    assert_eq!(listing_ids("priceMin=0"), vec!["1", "3", "2", "4"]);
}

#[test]
fn test_huge_price_bound_round_trips() {
    let state = BrowseState {
        price_max: Some(1e20),
        ..BrowseState::default()
    };
    assert_eq!(BrowseState::from_query(&state.to_query()).unwrap(), state);
}
