//! Customer status synchronisation
//!
//! Pulls each customer's status from a [`CustomerStatusProvider`] and
//! stores it when it differs. Runs on demand for one customer, for all
//! customers, or periodically alongside the booking jobs.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::customer::{Customer, CustomerFilter, CustomerStatusProvider};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;
use crate::shared::PaginationParams;

const SYNC_PAGE_SIZE: u32 = 100;

async fn apply_status(
    repos: &dyn RepositoryProvider,
    provider: &dyn CustomerStatusProvider,
    customer: Customer,
) -> DomainResult<(Customer, bool)> {
    match provider.status_for(&customer).await? {
        Some(status) if status != customer.status => {
            let updated = repos.customers().set_status(customer.id, status).await?;
            debug!(customer_id = updated.id, status = %status, "Customer status synced");
            Ok((updated, true))
        }
        _ => Ok((customer, false)),
    }
}

pub async fn sync_customer_status(
    repos: &dyn RepositoryProvider,
    provider: &dyn CustomerStatusProvider,
    customer_id: i32,
) -> DomainResult<Customer> {
    let customer = repos
        .customers()
        .find_by_id(customer_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Customer", "id", customer_id))?;

    let (customer, _) = apply_status(repos, provider, customer).await?;
    Ok(customer)
}

/// Syncs every customer; returns how many statuses changed.
pub async fn sync_customer_statuses(
    repos: &dyn RepositoryProvider,
    provider: &dyn CustomerStatusProvider,
) -> DomainResult<u64> {
    let mut changed = 0;
    let mut page = 1;

    loop {
        let batch = repos
            .customers()
            .list(
                CustomerFilter::default(),
                PaginationParams::new(Some(page), Some(SYNC_PAGE_SIZE)),
            )
            .await?;

        for customer in batch.items {
            if apply_status(repos, provider, customer).await?.1 {
                changed += 1;
            }
        }

        if page >= batch.total_pages {
            break;
        }
        page += 1;
    }

    if changed > 0 {
        info!(count = changed, "Customer statuses updated from provider");
        metrics::counter!("customer_statuses_synced_total").increment(changed);
    }
    Ok(changed)
}

/// Spawn the periodic sync; it stops when `shutdown` fires.
pub fn start_customer_status_sync(
    repos: Arc<dyn RepositoryProvider>,
    provider: Arc<dyn CustomerStatusProvider>,
    shutdown: ShutdownSignal,
    interval_secs: u64,
) -> JoinHandle<()> {
    let every = interval_secs.max(1);
    tokio::spawn(async move {
        info!(check_interval = every, "Customer status sync task started");
        let mut interval = tokio::time::interval(Duration::from_secs(every));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = sync_customer_statuses(repos.as_ref(), provider.as_ref()).await {
                        warn!(error = %e, "Customer status sync failed");
                    }
                }
                _ = shutdown.notified().wait() => break,
            }
        }

        info!("Customer status sync task stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::test_support::{customer, repos};
    use crate::domain::customer::CustomerStatus;

    /// Answers from a fixed table keyed by customer id.
    #[derive(Default)]
    struct TableProvider {
        statuses: Mutex<HashMap<i32, CustomerStatus>>,
    }

    impl TableProvider {
        fn set(&self, id: i32, status: CustomerStatus) {
            self.statuses.lock().unwrap().insert(id, status);
        }
    }

    #[async_trait]
    impl CustomerStatusProvider for TableProvider {
        async fn status_for(&self, customer: &Customer) -> DomainResult<Option<CustomerStatus>> {
            Ok(self.statuses.lock().unwrap().get(&customer.id).copied())
        }
    }

    #[tokio::test]
    async fn sync_all_updates_only_changed_statuses() {
        let repos = repos().await;
        let (_, lina) = customer(&repos, "lina", true).await;
        let (_, omar) = customer(&repos, "omar", true).await;
        let (_, sami) = customer(&repos, "sami", false).await;

        let provider = TableProvider::default();
        provider.set(lina.id, CustomerStatus::Verified);
        provider.set(omar.id, CustomerStatus::Blocked);
        provider.set(sami.id, sami.status);

        let changed = sync_customer_statuses(repos.as_ref(), &provider).await.unwrap();
        assert_eq!(changed, 2);

        let find = |id| {
            let repos = repos.clone();
            async move { repos.customers().find_by_id(id).await.unwrap().unwrap().status }
        };
        assert_eq!(find(lina.id).await, CustomerStatus::Verified);
        assert_eq!(find(omar.id).await, CustomerStatus::Blocked);
        assert_eq!(find(sami.id).await, CustomerStatus::Unverified);

        assert_eq!(sync_customer_statuses(repos.as_ref(), &provider).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sync_one_customer() {
        let repos = repos().await;
        let (_, lina) = customer(&repos, "lina", true).await;
        let provider = TableProvider::default();

        let untouched = sync_customer_status(repos.as_ref(), &provider, lina.id).await.unwrap();
        assert_eq!(untouched.status, CustomerStatus::Unverified);

        provider.set(lina.id, CustomerStatus::Verified);
        let synced = sync_customer_status(repos.as_ref(), &provider, lina.id).await.unwrap();
        assert_eq!(synced.status, CustomerStatus::Verified);

        assert!(matches!(
            sync_customer_status(repos.as_ref(), &provider, 9999).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn periodic_sync_runs_and_stops_on_shutdown() {
        let repos = repos().await;
        let (_, lina) = customer(&repos, "lina", true).await;
        let provider = Arc::new(TableProvider::default());
        provider.set(lina.id, CustomerStatus::Blocked);

        let shutdown = ShutdownSignal::new();
        let task = start_customer_status_sync(repos.clone(), provider, shutdown.clone(), 3600);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!task.is_finished());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("sync loop did not stop after shutdown")
            .unwrap();

        let stored = repos.customers().find_by_id(lina.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CustomerStatus::Blocked);
    }
}
