//! Folder Server Integration Tests
//!
//! Resolve and extract databases stored as model files in a directory.

use pretty_assertions::assert_eq;

use rust_daxmodel::connection::{resolve_database, resolve_database_from_connection_string};
use rust_daxmodel::{extract_model, DaxModelError, FolderConnector};

use crate::common::TestContext;

#[test]
fn test_resolve_fixture_by_database_name() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim", "broken_relationship.bim"]);
    let db = resolve_database(&FolderConnector, &ctx.server(), "AdventureWorks").unwrap();

    assert_eq!(db.name, "AdventureWorks");
    assert_eq!(db.model.tables.len(), 5);
}

#[test]
fn test_resolve_through_connection_string() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let db = resolve_database_from_connection_string(
        &FolderConnector,
        &ctx.connection_string("AdventureWorks"),
    )
    .unwrap();

    let model = extract_model(Some(&db), None, None).unwrap();
    assert_eq!(model.tables.len(), 5);
    assert_eq!(model.relationships.len(), 2);
}

#[test]
fn test_unknown_database_is_not_found() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let err = resolve_database(&FolderConnector, &ctx.server(), "Finance").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DaxModelError>(),
        Some(DaxModelError::DatabaseNotFound { name }) if name == "Finance"
    ));
}

#[test]
fn test_model_file_with_bom_and_legacy_encoding() {
    let ctx = TestContext::new();
    let mut bom = b"\xEF\xBB\xBF".to_vec();
    bom.extend_from_slice(br#"{ "name": "Bom", "model": { "tables": [ { "name": "T" } ] } }"#);
    ctx.write_model("bom.bim", bom);
    ctx.write_model(
        "Legacy.bim",
        b"{ \"model\": { \"tables\": [ { \"name\": \"Caf\xE9\" } ] } }".to_vec(),
    );

    let bom_db = resolve_database(&FolderConnector, &ctx.server(), "Bom").unwrap();
    assert_eq!(bom_db.model.tables[0].name, "T");

    let legacy = resolve_database(&FolderConnector, &ctx.server(), "Legacy").unwrap();
    assert_eq!(legacy.model.tables[0].name, "Café");
}

#[test]
fn test_unreadable_requested_file_reports_parse_error() {
    let ctx = TestContext::new();
    ctx.write_model("Sales.bim", "{ \"model\": [ }");
    let err = resolve_database(&FolderConnector, &ctx.server(), "Sales").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DaxModelError>(),
        Some(DaxModelError::SourceParseError { .. })
    ));
}

#[test]
fn test_missing_folder_cannot_connect() {
    let ctx = TestContext::new();
    let missing = ctx.server_dir.join("nope");
    let err = resolve_database(&FolderConnector, missing.to_str().unwrap(), "Sales").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DaxModelError>(),
        Some(DaxModelError::ServerConnectError { .. })
    ));
}
