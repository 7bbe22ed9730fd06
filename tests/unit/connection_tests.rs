//! Connection Descriptor and Database Resolution Tests

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;

use rust_daxmodel::connection::{
    build_connection_string, resolve_database, resolve_database_from_connection_string,
    ConnectionStringBuilder, Connector, Server,
};
use rust_daxmodel::source::Database;
use rust_daxmodel::DaxModelError;

use crate::common::parse;

/// Connector serving databases from memory and recording connect calls
#[derive(Default)]
struct MemoryConnector {
    databases: HashMap<String, String>,
    connected_to: RefCell<Vec<String>>,
}

impl MemoryConnector {
    fn with_database(name: &str) -> Self {
        let mut connector = Self::default();
        connector.databases.insert(
            name.to_string(),
            format!(r#"{{ "name": "{name}", "model": {{ "tables": [ {{ "name": "T" }} ] }} }}"#),
        );
        connector
    }
}

struct MemoryServer {
    databases: HashMap<String, String>,
}

impl Connector for MemoryConnector {
    type Server = MemoryServer;
    type Connection = ();

    fn connect(&self, server_or_connection_string: &str) -> Result<MemoryServer> {
        self.connected_to
            .borrow_mut()
            .push(server_or_connection_string.to_string());
        Ok(MemoryServer {
            databases: self.databases.clone(),
        })
    }

    fn open_connection(&self, _connection_string: &str) -> Result<()> {
        Ok(())
    }
}

impl Server for MemoryServer {
    fn find_database_by_name(&self, name: &str) -> Result<Option<Database>> {
        Ok(self.databases.get(name).map(|json| parse(json)))
    }
}

// ============================================================================
// Descriptor builder
// ============================================================================

#[test]
fn test_bare_server_gets_default_provider_and_catalog() {
    let descriptor = build_connection_string("myserver", "db1");
    let parsed = ConnectionStringBuilder::try_parse(&descriptor).unwrap();

    assert_eq!(parsed.provider(), Some("MSOLAP"));
    assert_eq!(parsed.data_source(), Some("myserver"));
    assert_eq!(parsed.initial_catalog(), Some("db1"));
}

#[test]
fn test_existing_catalog_is_replaced() {
    let descriptor = build_connection_string(
        "Provider=MSOLAP;Data Source=srv;Initial Catalog=old;User ID=me",
        "db1",
    );
    let parsed = ConnectionStringBuilder::try_parse(&descriptor).unwrap();
    let entries: Vec<(&str, &str)> = parsed.entries().collect();

    assert_eq!(
        entries,
        vec![
            ("Provider", "MSOLAP"),
            ("Data Source", "srv"),
            ("Initial Catalog", "db1"),
            ("User ID", "me"),
        ]
    );
}

#[test]
fn test_catalog_added_when_absent() {
    assert_eq!(
        build_connection_string("Data Source=srv", "db1"),
        "Data Source=srv;Initial Catalog=db1"
    );
}

// ============================================================================
// Database resolution
// ============================================================================

#[test]
fn test_resolve_database_by_name() {
    let connector = MemoryConnector::with_database("Sales");
    let db = resolve_database(&connector, "srv", "Sales").unwrap();

    assert_eq!(db.name, "Sales");
    assert_eq!(connector.connected_to.borrow().as_slice(), ["srv".to_string()]);
}

#[test]
fn test_missing_database_names_it() {
    let connector = MemoryConnector::with_database("Sales");
    let err = resolve_database(&connector, "srv", "Finance").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DaxModelError>(),
        Some(DaxModelError::DatabaseNotFound { name }) if name == "Finance"
    ));
    let message = err.to_string();
    assert!(message.contains("'Finance'"));
    assert!(message.contains("do not have admin rights"));
}

#[test]
fn test_resolve_from_connection_string_uses_catalog() {
    let connector = MemoryConnector::with_database("Sales");
    let cs = "Provider=MSOLAP;Data Source=srv;Initial Catalog=Sales";
    let db = resolve_database_from_connection_string(&connector, cs).unwrap();

    assert_eq!(db.name, "Sales");
    assert_eq!(connector.connected_to.borrow().as_slice(), [cs.to_string()]);
}

#[test]
fn test_connection_string_without_catalog_fails_before_connecting() {
    let connector = MemoryConnector::with_database("Sales");
    for cs in ["Data Source=srv", "Data Source=srv;Initial Catalog=", "srv"] {
        let err = resolve_database_from_connection_string(&connector, cs).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<DaxModelError>(),
                Some(DaxModelError::MissingInitialCatalog { .. })
            ),
            "unexpected error for {cs}: {err}"
        );
    }
    assert!(connector.connected_to.borrow().is_empty());
}
