//! Link health monitor
//!
//! Probes every active game's URL and folds the result into its link
//! health. Three consecutive failures take a game offline; nothing here
//! ever puts one back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::curation::LinkStatus;
use crate::db::curation_log::{self, CurationAction, CurationSource, NewLogEntry};
use crate::db::games::{active_link_targets, record_link_probe, LinkTarget};
use crate::db::CatalogDb;
use crate::error::CatalogError;

/// Consecutive failed probes after which a game is deactivated
pub const LINK_FAILURE_THRESHOLD: u32 = 3;

/// Link-related fields of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkHealth {
    pub status: LinkStatus,
    pub consecutive_failures: u32,
    pub is_active: bool,
}

impl LinkHealth {
    /// State after one probe.
    ///
    /// Success clears the counter but leaves `is_active` alone, so a game
    /// deactivated for broken links stays deactivated.
    pub fn after_probe(&self, ok: bool) -> Self {
        if ok {
            return Self {
                status: LinkStatus::Ok,
                consecutive_failures: 0,
                is_active: self.is_active,
            };
        }

        let failures = self.consecutive_failures.saturating_add(1);
        Self {
            status: LinkStatus::Broken,
            consecutive_failures: failures,
            is_active: self.is_active && failures < LINK_FAILURE_THRESHOLD,
        }
    }
}

/// Result of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }
}

/// Checks whether a URL answers.
///
/// Implementations never fail: every problem is an `Unreachable`.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn check(&self, url: &str) -> ProbeOutcome;
}

/// HEAD request, redirects followed, 2xx means reachable
pub struct HttpLinkProbe {
    http_client: reqwest::Client,
}

impl HttpLinkProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, LinkCheckError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| LinkCheckError::Client(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl LinkProbe for HttpLinkProbe {
    async fn check(&self, url: &str) -> ProbeOutcome {
        match self.http_client.head(url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Reachable,
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "Link probe returned non-success status");
                ProbeOutcome::Unreachable(format!("HTTP {}", response.status().as_u16()))
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Link probe failed");
                ProbeOutcome::Unreachable(e.to_string())
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum LinkCheckError {
    #[error("Link check aborted: {0}")]
    Store(#[from] CatalogError),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Counts reported by one monitor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkCheckSummary {
    pub checked: u32,
    pub broken: u32,
}

pub struct LinkMonitor {
    db: Arc<CatalogDb>,
    probe: Arc<dyn LinkProbe>,
    concurrency: usize,
}

impl LinkMonitor {
    pub fn new(db: Arc<CatalogDb>, probe: Arc<dyn LinkProbe>, concurrency: usize) -> Self {
        Self {
            db,
            probe,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every active game once and write one audit entry for the run.
    ///
    /// A store error aborts the remaining probes; games not reached keep
    /// their previous state.
    pub async fn run(&self) -> Result<LinkCheckSummary, LinkCheckError> {
        match self.check_all().await {
            Ok(summary) => {
                self.db.with_conn(|conn| {
                    curation_log::append(
                        conn,
                        &NewLogEntry {
                            game_id: None,
                            action: CurationAction::LinkCheck,
                            source: CurationSource::Cron,
                            details: serde_json::to_value(summary)?,
                            success: true,
                        },
                    )
                })?;

                info!(checked = summary.checked, broken = summary.broken, "Link check complete");
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Link check failed");

                let logged = self.db.with_conn(|conn| {
                    curation_log::append(
                        conn,
                        &NewLogEntry {
                            game_id: None,
                            action: CurationAction::LinkCheck,
                            source: CurationSource::Cron,
                            details: serde_json::json!({ "error": e.to_string() }),
                            success: false,
                        },
                    )
                });
                if let Err(log_err) = logged {
                    error!(error = %log_err, "Failed to record link check failure");
                }

                Err(e)
            }
        }
    }

    async fn check_all(&self) -> Result<LinkCheckSummary, LinkCheckError> {
        let targets = self.db.with_conn(active_link_targets)?;
        debug!(count = targets.len(), "Probing active game links");

        let probe = self.probe.clone();
        let mut results = stream::iter(targets)
            .map(|target: LinkTarget| {
                let probe = probe.clone();
                async move {
                    let outcome = probe.check(&target.game_url).await;
                    (target, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut summary = LinkCheckSummary::default();
        while let Some((target, outcome)) = results.next().await {
            let ok = outcome.is_ok();
            let health = self
                .db
                .with_conn_mut(|conn| record_link_probe(conn, &target.id, ok, Utc::now()))?;

            summary.checked += 1;
            if !ok {
                summary.broken += 1;
                if !health.is_active {
                    warn!(
                        game_id = %target.id,
                        failures = health.consecutive_failures,
                        "Deactivated game after repeated link failures"
                    );
                }
            }
        }

        Ok(summary)
    }
}
