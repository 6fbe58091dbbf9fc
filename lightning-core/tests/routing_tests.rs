// Tests for the route table

use lightning_core::{Error, HttpMethod, RouteEntry, RouteTable};

fn table() -> RouteTable {
    RouteTable::build(vec![
        RouteEntry::new("/a", HttpMethod::GET, "h1"),
        RouteEntry::new("/a", HttpMethod::POST, "h2"),
        RouteEntry::new("/", HttpMethod::GET, "home"),
    ])
    .unwrap()
}

#[test]
fn test_method_selects_entry() {
    let table = table();

    assert_eq!(table.match_route("/a", HttpMethod::GET).unwrap().handler, "h1");
    assert_eq!(table.match_route("/a", HttpMethod::POST).unwrap().handler, "h2");
    assert!(table.match_route("/a", HttpMethod::DELETE).is_none());
}

#[test]
fn test_unknown_path_has_no_match() {
    assert!(table().match_route("/b", HttpMethod::GET).is_none());
}

#[test]
fn test_trailing_slash_and_query_are_ignored() {
    let table = table();

    assert_eq!(table.match_route("/a/", HttpMethod::GET).unwrap().handler, "h1");
    assert_eq!(table.match_route("/a?id=3", HttpMethod::GET).unwrap().handler, "h1");
    assert_eq!(table.match_route("/", HttpMethod::GET).unwrap().handler, "home");
}

#[test]
fn test_exact_match_only() {
    let table = table();

    assert!(table.match_route("/a/b", HttpMethod::GET).is_none());
    assert!(table.match_route("/A", HttpMethod::GET).is_none());
    assert!(table.match_route("/ab", HttpMethod::GET).is_none());
}

#[test]
fn test_registration_order_preserved() {
    let table = table();
    let handlers: Vec<_> = table.routes().iter().map(|route| route.handler.as_str()).collect();

    assert_eq!(handlers, vec!["h1", "h2", "home"]);
    assert_eq!(table.len(), 3);
}

#[test]
fn test_duplicate_route_rejected() {
    let err = RouteTable::build(vec![
        RouteEntry::new("/a", HttpMethod::GET, "h1"),
        RouteEntry::new("/a", HttpMethod::GET, "h2"),
    ])
    .unwrap_err();

    assert!(matches!(err, Error::DuplicateRoute { .. }));
    assert!(err.is_startup_error());
    assert_eq!(err.to_string(), "Duplicate route: GET /a");
}

#[test]
fn test_empty_table() {
    let table = RouteTable::build(Vec::new()).unwrap();
    assert!(table.is_empty());
    assert!(table.match_route("/", HttpMethod::GET).is_none());
}
