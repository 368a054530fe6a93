//! Query execution.
//!
//! Resolves each query's connection (opening named connections once per
//! run and sharing them) and executes all queries, either with one task
//! per query or sequentially in single-threaded mode. A failing query
//! never cancels its siblings; every outcome is collected.

use super::query::ConnectionRef;
use crate::config::Config;
use crate::db::{self, DatabaseClient, Dataset};
use crate::error::{ReportError, Result};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How the execution step schedules its queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One task per query (the default).
    #[default]
    Parallel,

    /// One query at a time, in registry order. Useful for debugging.
    Serial,
}

/// A query ready to run: name, SQL, and a resolved connection.
pub(crate) struct QueryJob {
    pub name: String,
    pub sql: String,
    pub client: Arc<dyn DatabaseClient>,
}

/// The result of running one query.
pub(crate) struct QueryOutcome {
    pub name: String,
    pub result: Result<Dataset>,
}

/// Opens named connections once per run and shares them between queries.
#[derive(Default)]
pub(crate) struct ConnectionCache {
    clients: HashMap<String, Arc<dyn DatabaseClient>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a connection reference to a client.
    ///
    /// Named connections are looked up in the configuration and opened on
    /// first use; later queries naming the same connection get the cached
    /// client. Live handles are used as-is and never closed by the cache.
    pub async fn resolve(
        &mut self,
        config: &Config,
        reference: &ConnectionRef,
    ) -> Result<Arc<dyn DatabaseClient>> {
        match reference {
            ConnectionRef::Live(client) => Ok(client.clone()),
            ConnectionRef::Named(name) => {
                if let Some(client) = self.clients.get(name) {
                    return Ok(client.clone());
                }

                let mut conn_config = config.get_connection(name).cloned().ok_or_else(|| {
                    ReportError::config(format!(
                        "connection '{name}' not found in configuration"
                    ))
                })?;
                conn_config.apply_env_defaults();

                info!("Connecting to '{}' ({})", name, conn_config.display_string());
                let client: Arc<dyn DatabaseClient> = Arc::from(db::connect(&conn_config).await?);
                self.clients.insert(name.clone(), client.clone());
                Ok(client)
            }
        }
    }

    /// Closes every connection the cache opened.
    pub async fn close_all(&mut self) {
        for (name, client) in self.clients.drain() {
            if let Err(e) = client.close().await {
                warn!("Failed to close connection '{}': {}", name, e);
            }
        }
    }
}

/// Runs all jobs and collects their outcomes in job order.
pub(crate) async fn execute_all(jobs: Vec<QueryJob>, mode: RunMode) -> Vec<QueryOutcome> {
    match mode {
        RunMode::Serial => {
            info!("Running on a single thread");
            let mut outcomes = Vec::with_capacity(jobs.len());
            for job in jobs {
                outcomes.push(execute_one(job).await);
            }
            outcomes
        }
        RunMode::Parallel => {
            info!("Running with one task per query");
            let names: Vec<String> = jobs.iter().map(|job| job.name.clone()).collect();
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|job| tokio::spawn(execute_one(job)))
                .collect();

            names
                .into_iter()
                .zip(join_all(handles).await)
                .map(|(name, joined)| match joined {
                    Ok(outcome) => outcome,
                    Err(e) => QueryOutcome {
                        name,
                        result: Err(ReportError::internal(format!("query task failed: {e}"))),
                    },
                })
                .collect()
        }
    }
}

async fn execute_one(job: QueryJob) -> QueryOutcome {
    info!("Querying '{}'", job.name);
    let result = job.client.execute_query(&job.sql).await;

    match &result {
        Ok(dataset) => {
            info!(
                "Query '{}' returned {} rows in {:?}",
                job.name,
                dataset.row_count(),
                dataset.elapsed
            );
            if dataset.is_empty() {
                warn!("Query '{}' was empty", job.name);
            }
        }
        Err(e) => error!("Query '{}' failed: {}", job.name, e),
    }

    QueryOutcome {
        name: job.name,
        result,
    }
}
