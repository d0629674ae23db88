use super::*;
use serde_json::json;

// =============================================================================
// build_query
// =============================================================================

#[test]
fn build_query_wraps_field_and_selection() {
    assert_eq!(
        build_query("listUserProfiles", "username attributes"),
        "query ListProfiles { listUserProfiles { items { username attributes } } }"
    );
}

#[test]
fn source_query_uses_config() {
    let config = DataConfig {
        url: reqwest::Url::parse("https://api.example.com/graphql").unwrap(),
        list_field: "listPeople".into(),
        list_selection: "id".into(),
    };
    let source = GraphqlProfileSource::new(reqwest::Client::new(), config, BearerToken::new("tok"));
    assert_eq!(source.query(), "query ListProfiles { listPeople { items { id } } }");
}

// =============================================================================
// parse_list_response
// =============================================================================

#[test]
fn parse_items_in_order() {
    let body = json!({
        "data": { "listUserProfiles": { "items": [
            { "username": "a", "attributes": { "n": 1 } },
            { "username": "b", "attributes": { "n": 2 } }
        ] } }
    })
    .to_string();
    let resp = parse_list_response(&body, "listUserProfiles").unwrap();
    let items = resp.items.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].username, "a");
    assert_eq!(items[1].username, "b");
    assert_eq!(items[1].attributes.get("n"), Some(&json!(2)));
}

#[test]
fn parse_keeps_duplicates() {
    let body = json!({
        "data": { "list": { "items": [ { "username": "a" }, { "username": "a" } ] } }
    })
    .to_string();
    let items = parse_list_response(&body, "list").unwrap().items.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], items[1]);
}

#[test]
fn parse_empty_items() {
    let body = json!({ "data": { "list": { "items": [] } } }).to_string();
    assert_eq!(parse_list_response(&body, "list").unwrap().items, Some(vec![]));
}

#[test]
fn parse_missing_items_field_is_none() {
    let body = json!({ "data": { "list": { "nextToken": null } } }).to_string();
    assert_eq!(parse_list_response(&body, "list").unwrap().items, None);
}

#[test]
fn parse_missing_data_is_none() {
    let body = json!({ "data": null }).to_string();
    assert_eq!(parse_list_response(&body, "list").unwrap().items, None);
}

#[test]
fn parse_errors_array_is_graphql_error() {
    let body = json!({
        "data": null,
        "errors": [ { "message": "Unauthorized" }, { "message": "Field undefined" } ]
    })
    .to_string();
    let err = parse_list_response(&body, "list").unwrap_err();
    match err {
        FetchError::Graphql(msg) => assert_eq!(msg, "Unauthorized; Field undefined"),
        other => panic!("expected Graphql, got {other:?}"),
    }
}

#[test]
fn parse_invalid_json_is_parse_error() {
    let err = parse_list_response("<html>", "list").unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}
