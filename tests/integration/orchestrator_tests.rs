//! Orchestrator Integration Tests
//!
//! Resolution, extraction and the statistics collaborators wired together.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;

use rust_daxmodel::connection::{Connector, FolderConnection, FolderServer};
use rust_daxmodel::{
    get_model, ConnectionInfo, DaxModel, DmvCollector, ExtractOptions, ExtractorInfo,
    FolderConnector, StatisticsCollector, StatisticsProviders,
};

use crate::common::TestContext;

/// Folder connector whose connections report when they are dropped
#[derive(Default)]
struct TrackingConnector {
    opened: RefCell<Vec<String>>,
    released: Rc<Cell<usize>>,
}

struct TrackedConnection {
    inner: FolderConnection,
    released: Rc<Cell<usize>>,
}

impl Drop for TrackedConnection {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

impl Connector for TrackingConnector {
    type Server = FolderServer;
    type Connection = TrackedConnection;

    fn connect(&self, server_or_connection_string: &str) -> Result<FolderServer> {
        FolderConnector.connect(server_or_connection_string)
    }

    fn open_connection(&self, connection_string: &str) -> Result<TrackedConnection> {
        self.opened.borrow_mut().push(connection_string.to_string());
        Ok(TrackedConnection {
            inner: FolderConnector.open_connection(connection_string)?,
            released: Rc::clone(&self.released),
        })
    }
}

/// Records collaborator calls, optionally failing them
#[derive(Default)]
struct RecordingCollector {
    calls: RefCell<Vec<String>>,
    fail: bool,
}

impl RecordingCollector {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn finish(&self) -> Result<()> {
        if self.fail {
            Err(anyhow!("statistics query failed"))
        } else {
            Ok(())
        }
    }
}

impl DmvCollector<TrackedConnection> for RecordingCollector {
    fn populate_from_dmv(
        &self,
        model: &mut DaxModel,
        connection: &mut TrackedConnection,
        server_name: &str,
        database_name: &str,
        tool: &ExtractorInfo,
        application: Option<&ExtractorInfo>,
    ) -> Result<()> {
        assert_eq!(model.tables.len(), 5);
        assert_eq!(connection.inner.catalog.as_deref(), Some(database_name));
        self.calls.borrow_mut().push(format!(
            "dmv {} {} {} {}",
            server_name == connection.inner.data_source.to_str().unwrap(),
            database_name,
            tool.name,
            application.map(|a| a.name.as_str()).unwrap_or("-")
        ));
        self.finish()
    }
}

impl StatisticsCollector<TrackedConnection> for RecordingCollector {
    fn update_statistics(
        &self,
        _model: &mut DaxModel,
        _connection: &mut TrackedConnection,
        sample_rows: usize,
        analyze_direct_query: bool,
    ) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("sample {} {}", sample_rows, analyze_direct_query));
        self.finish()
    }
}

fn server_info(ctx: &TestContext) -> ConnectionInfo {
    ConnectionInfo::Server {
        server: ctx.server(),
        database: "AdventureWorks".to_string(),
    }
}

#[test]
fn test_get_model_runs_both_collaborators() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let connector = TrackingConnector::default();
    let dmv = RecordingCollector::default();
    let sampler = RecordingCollector::default();
    let app = ExtractorInfo::new("Studio", "3.0");
    let options = ExtractOptions {
        sample_rows: 100,
        analyze_direct_query: true,
        ..Default::default()
    };

    let model = get_model(
        &connector,
        &server_info(&ctx),
        Some(&app),
        &options,
        &StatisticsProviders {
            dmv: &dmv,
            sampler: &sampler,
        },
    )
    .unwrap();

    assert_eq!(model.tables.len(), 5);
    assert_eq!(model.extractor_app.as_deref(), Some("Studio"));
    assert_eq!(
        dmv.calls.borrow().as_slice(),
        [format!("dmv true AdventureWorks {} Studio", env!("CARGO_PKG_NAME"))]
    );
    assert_eq!(sampler.calls.borrow().as_slice(), ["sample 100 true".to_string()]);
    assert_eq!(
        connector.opened.borrow().as_slice(),
        [format!(
            "Provider=MSOLAP;Data Source={};Initial Catalog=AdventureWorks",
            ctx.server()
        )]
    );
    assert_eq!(connector.released.get(), 1);
}

#[test]
fn test_sampler_skipped_when_data_statistics_disabled() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let connector = TrackingConnector::default();
    let dmv = RecordingCollector::default();
    let sampler = RecordingCollector::default();
    let options = ExtractOptions {
        read_statistics_from_data: false,
        ..Default::default()
    };

    get_model(
        &connector,
        &server_info(&ctx),
        None,
        &options,
        &StatisticsProviders {
            dmv: &dmv,
            sampler: &sampler,
        },
    )
    .unwrap();

    assert_eq!(dmv.calls.borrow().len(), 1);
    assert!(sampler.calls.borrow().is_empty());
    assert_eq!(connector.released.get(), 1);
}

#[test]
fn test_connection_released_when_collaborator_fails() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let connector = TrackingConnector::default();
    let dmv = RecordingCollector::default();
    let sampler = RecordingCollector::failing();

    let err = get_model(
        &connector,
        &server_info(&ctx),
        None,
        &ExtractOptions::default(),
        &StatisticsProviders {
            dmv: &dmv,
            sampler: &sampler,
        },
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "statistics query failed");
    assert_eq!(connector.released.get(), 1);
}

#[test]
fn test_dmv_failure_skips_sampler() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let connector = TrackingConnector::default();
    let dmv = RecordingCollector::failing();
    let sampler = RecordingCollector::default();

    let result = get_model(
        &connector,
        &server_info(&ctx),
        None,
        &ExtractOptions::default(),
        &StatisticsProviders {
            dmv: &dmv,
            sampler: &sampler,
        },
    );

    assert!(result.is_err());
    assert!(sampler.calls.borrow().is_empty());
    assert_eq!(connector.released.get(), 1);
}

#[test]
fn test_connection_string_passed_through_to_statistics() {
    let ctx = TestContext::with_fixtures(&["adventure_works.bim"]);
    let connector = TrackingConnector::default();
    let dmv = RecordingCollector::default();
    let cs = ctx.connection_string("AdventureWorks");

    get_model(
        &connector,
        &ConnectionInfo::ConnectionString(cs.clone()),
        None,
        &ExtractOptions::default(),
        &StatisticsProviders {
            dmv: &dmv,
            sampler: &dmv,
        },
    )
    .unwrap();

    assert_eq!(connector.opened.borrow().as_slice(), [cs]);
    assert_eq!(
        dmv.calls.borrow().as_slice(),
        [
            format!("dmv true AdventureWorks {} -", env!("CARGO_PKG_NAME")),
            "sample 0 false".to_string(),
        ]
    );
}

#[test]
fn test_extraction_error_opens_no_connection() {
    let ctx = TestContext::with_fixtures(&["broken_relationship.bim"]);
    let connector = TrackingConnector::default();

    let result = get_model(
        &connector,
        &ConnectionInfo::Server {
            server: ctx.server(),
            database: "Broken".to_string(),
        },
        None,
        &ExtractOptions::default(),
        &StatisticsProviders::none(),
    );

    assert!(result.is_err());
    assert!(connector.opened.borrow().is_empty());
    assert_eq!(connector.released.get(), 0);
}
