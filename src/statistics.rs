//! Statistics collaborators invoked after extraction
//!
//! Both collaborators receive the statistics connection opened by the
//! orchestrator. They may add derived data to the model but never change its
//! structure.

use anyhow::Result;
use tracing::debug;

use crate::metadata::{DaxModel, ExtractorInfo};

/// Fills the model with server-side statistics read from dynamic management views
pub trait DmvCollector<C> {
    fn populate_from_dmv(
        &self,
        model: &mut DaxModel,
        connection: &mut C,
        server_name: &str,
        database_name: &str,
        tool: &ExtractorInfo,
        application: Option<&ExtractorInfo>,
    ) -> Result<()>;
}

/// Computes statistics by querying the model's data
pub trait StatisticsCollector<C> {
    /// `sample_rows` of 0 means no sampling
    fn update_statistics(
        &self,
        model: &mut DaxModel,
        connection: &mut C,
        sample_rows: usize,
        analyze_direct_query: bool,
    ) -> Result<()>;
}

/// Collaborator that leaves the model untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatistics;

impl<C> DmvCollector<C> for NoStatistics {
    fn populate_from_dmv(
        &self,
        _model: &mut DaxModel,
        _connection: &mut C,
        server_name: &str,
        database_name: &str,
        _tool: &ExtractorInfo,
        _application: Option<&ExtractorInfo>,
    ) -> Result<()> {
        debug!(server = server_name, database = database_name, "skipping DMV statistics");
        Ok(())
    }
}

impl<C> StatisticsCollector<C> for NoStatistics {
    fn update_statistics(
        &self,
        _model: &mut DaxModel,
        _connection: &mut C,
        sample_rows: usize,
        analyze_direct_query: bool,
    ) -> Result<()> {
        debug!(sample_rows, analyze_direct_query, "skipping data statistics");
        Ok(())
    }
}

/// The collaborators handed to [`crate::get_model`]
pub struct StatisticsProviders<'a, C> {
    pub dmv: &'a dyn DmvCollector<C>,
    pub sampler: &'a dyn StatisticsCollector<C>,
}

impl<C: 'static> StatisticsProviders<'static, C> {
    /// Providers that collect nothing
    pub fn none() -> Self {
        Self {
            dmv: &NoStatistics,
            sampler: &NoStatistics,
        }
    }
}

impl<C> Clone for StatisticsProviders<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for StatisticsProviders<'_, C> {}
