//! Login audit dispatch as a detached task.
//!
//! The caller never awaits the audit. Its result goes to the log and to a
//! broadcast channel of [`AuditReport`]s that anyone may watch. A process
//! about to exit can [`settle`](AuditDispatcher::settle) the audits still
//! running.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use clinicdesk_core::traits::DataClient;
use clinicdesk_entity::audit::LoginAudit;

/// Buffer of the report channel.
const REPORT_BUFFER: usize = 64;

/// How an audit call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The remote procedure accepted the entry.
    Recorded,
    /// The call failed; the message is the error.
    Failed(String),
}

/// Published once per dispatched audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Email the audit was for.
    pub email: String,
    /// Result of the call.
    pub outcome: AuditOutcome,
}

/// Fires login audit RPCs without blocking the caller.
#[derive(Debug, Clone)]
pub struct AuditDispatcher {
    /// Data collaborator used for the RPC.
    data: Arc<dyn DataClient>,
    /// Name of the audit procedure.
    rpc: String,
    /// Report fan-out.
    reports: broadcast::Sender<AuditReport>,
    /// Audits dispatched and not yet finished.
    inflight: Arc<watch::Sender<usize>>,
}

impl AuditDispatcher {
    /// Creates a dispatcher calling `rpc` on `data`.
    pub fn new(data: Arc<dyn DataClient>, rpc: impl Into<String>) -> Self {
        let (reports, _) = broadcast::channel(REPORT_BUFFER);
        let (inflight, _) = watch::channel(0);
        Self {
            data,
            rpc: rpc.into(),
            reports,
            inflight: Arc::new(inflight),
        }
    }

    /// Receiver of future audit reports.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditReport> {
        self.reports.subscribe()
    }

    /// Number of audits still running.
    pub fn pending(&self) -> usize {
        *self.inflight.borrow()
    }

    /// Waits up to `wait` for running audits to finish. Returns `false` if
    /// some are still running when the time is up.
    pub async fn settle(&self, wait: Duration) -> bool {
        let mut rx = self.inflight.subscribe();
        matches!(
            tokio::time::timeout(wait, rx.wait_for(|n| *n == 0)).await,
            Ok(Ok(_))
        )
    }

    /// Spawns the audit call. The handle may be ignored.
    pub fn dispatch(&self, entry: LoginAudit) -> JoinHandle<()> {
        let data = self.data.clone();
        let rpc = self.rpc.clone();
        let reports = self.reports.clone();
        let inflight = self.inflight.clone();
        inflight.send_modify(|n| *n += 1);

        tokio::spawn(async move {
            let email = entry.user_email.clone();
            let result = match serde_json::to_value(&entry) {
                Ok(args) => data.call_rpc(&rpc, args).await.map(|_| ()),
                Err(e) => Err(e.into()),
            };

            let outcome = match result {
                Ok(()) => {
                    debug!(email = %email, rpc = %rpc, "Login audited");
                    AuditOutcome::Recorded
                }
                Err(e) => {
                    warn!(email = %email, rpc = %rpc, error = %e, "Login audit failed");
                    AuditOutcome::Failed(e.to_string())
                }
            };

            let _ = reports.send(AuditReport { email, outcome });
            inflight.send_modify(|n| *n = n.saturating_sub(1));
        })
    }
}

#[cfg(test)]
mod tests {
    use clinicdesk_backend::MemoryDataClient;
    use clinicdesk_entity::user::UserRole;

    use super::*;

    #[tokio::test]
    async fn test_dispatch_records_rpc() {
        let data = Arc::new(MemoryDataClient::new());
        let dispatcher = AuditDispatcher::new(data.clone(), "log_user_login");
        let mut reports = dispatcher.subscribe();

        dispatcher
            .dispatch(LoginAudit::now("doctor@example.com", UserRole::Doctor, None))
            .await
            .unwrap();

        let report = reports.recv().await.unwrap();
        assert_eq!(report.outcome, AuditOutcome::Recorded);

        let calls = data.rpc_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "log_user_login");
        assert_eq!(calls[0].1["user_email"], "doctor@example.com");
        assert_eq!(calls[0].1["user_role"], "doctor");
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let data = Arc::new(MemoryDataClient::new());
        data.set_fail_rpc(true);
        let dispatcher = AuditDispatcher::new(data, "log_user_login");
        let mut reports = dispatcher.subscribe();

        let handle = dispatcher.dispatch(LoginAudit::now("admin@example.com", UserRole::Admin, None));
        handle.await.unwrap();

        let report = reports.recv().await.unwrap();
        assert_eq!(report.email, "admin@example.com");
        assert!(matches!(report.outcome, AuditOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_settle_waits_for_running_audits() {
        let data = Arc::new(MemoryDataClient::new());
        let dispatcher = AuditDispatcher::new(data.clone(), "log_user_login");
        assert!(dispatcher.settle(Duration::from_millis(10)).await);

        dispatcher.dispatch(LoginAudit::now("admin@example.com", UserRole::Admin, None));
        dispatcher.dispatch(LoginAudit::now("doctor@example.com", UserRole::Doctor, None));
        assert_eq!(dispatcher.pending(), 2);

        assert!(dispatcher.settle(Duration::from_secs(5)).await);
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(data.rpc_calls().await.len(), 2);
    }
}
