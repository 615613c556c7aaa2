//! Background tasks that move bookings along their lifecycle.
//!
//! Two independent loops share the process:
//! - Confirmed bookings whose end date has passed become Completed.
//! - Pending bookings left unanswered past the timeout become Cancelled.
//!
//! Both updates are single bulk statements, so a run is idempotent and
//! safe to repeat or to trigger manually.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

#[derive(Debug, Clone)]
pub struct BookingJobsConfig {
    pub complete_interval_secs: u64,
    pub stale_interval_secs: u64,
    /// Age after which an unanswered Pending booking is cancelled
    pub pending_timeout_hours: i64,
}

impl Default for BookingJobsConfig {
    fn default() -> Self {
        Self {
            complete_interval_secs: 3600,
            stale_interval_secs: 600,
            pending_timeout_hours: 24,
        }
    }
}

/// Counts from one run of both jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobRunReport {
    pub completed: u64,
    pub cancelled: u64,
}

pub async fn complete_overdue_bookings(
    repos: &dyn RepositoryProvider,
    now: DateTime<Utc>,
) -> DomainResult<u64> {
    let completed = repos.bookings().complete_overdue(now.date_naive()).await?;
    if completed > 0 {
        info!(count = completed, "Completed overdue bookings");
        metrics::counter!("bookings_auto_completed_total").increment(completed);
    }
    Ok(completed)
}

pub async fn cancel_stale_bookings(
    repos: &dyn RepositoryProvider,
    now: DateTime<Utc>,
    timeout_hours: i64,
) -> DomainResult<u64> {
    let cutoff = now - ChronoDuration::hours(timeout_hours);
    let cancelled = repos.bookings().cancel_stale(cutoff).await?;
    if cancelled > 0 {
        info!(count = cancelled, %cutoff, "Cancelled stale pending bookings");
        metrics::counter!("bookings_auto_cancelled_total").increment(cancelled);
    }
    Ok(cancelled)
}

/// Runs both jobs once.
pub async fn run_booking_jobs(
    repos: &dyn RepositoryProvider,
    now: DateTime<Utc>,
    config: &BookingJobsConfig,
) -> DomainResult<JobRunReport> {
    Ok(JobRunReport {
        completed: complete_overdue_bookings(repos, now).await?,
        cancelled: cancel_stale_bookings(repos, now, config.pending_timeout_hours).await?,
    })
}

/// Spawn both periodic jobs; they stop when `shutdown` fires.
pub fn start_booking_jobs(
    repos: Arc<dyn RepositoryProvider>,
    shutdown: ShutdownSignal,
    config: BookingJobsConfig,
) -> Vec<JoinHandle<()>> {
    let completion = {
        let repos = repos.clone();
        let shutdown = shutdown.clone();
        let every = config.complete_interval_secs.max(1);
        tokio::spawn(async move {
            info!(check_interval = every, "Booking completion task started");
            let mut interval = tokio::time::interval(Duration::from_secs(every));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        debug!("Checking for overdue bookings");
                        if let Err(e) = complete_overdue_bookings(repos.as_ref(), Utc::now()).await {
                            warn!(error = %e, "Booking completion run failed");
                        }
                    }
                    _ = shutdown.notified().wait() => break,
                }
            }

            info!("Booking completion task stopped");
        })
    };

    let every = config.stale_interval_secs.max(1);
    let timeout_hours = config.pending_timeout_hours;
    let stale = tokio::spawn(async move {
        info!(check_interval = every, timeout_hours, "Stale booking task started");
        let mut interval = tokio::time::interval(Duration::from_secs(every));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    debug!("Checking for stale pending bookings");
                    if let Err(e) = cancel_stale_bookings(repos.as_ref(), Utc::now(), timeout_hours).await {
                        warn!(error = %e, "Stale booking run failed");
                    }
                }
                _ = shutdown.notified().wait() => break,
            }
        }

        info!("Stale booking task stopped");
    });

    vec![completion, stale]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{customer, repos, staff, today, vehicle};
    use crate::domain::booking::{BookingStatus, DateRange, NewBooking, PaymentMethod};
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    async fn book(
        repos: &Arc<dyn RepositoryProvider>,
        customer_id: i32,
        vehicle_id: i32,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> i32 {
        repos
            .bookings()
            .create(NewBooking {
                customer_id,
                vehicle_id,
                range: DateRange::new(start, end).unwrap(),
                total_price: Decimal::from(100),
                payment_method: PaymentMethod::Cash,
                notes: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn status(repos: &Arc<dyn RepositoryProvider>, id: i32) -> BookingStatus {
        repos.bookings().find_by_id(id).await.unwrap().unwrap().status
    }

    fn noon(date: chrono::NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()).and_utc()
    }

    #[tokio::test]
    async fn completes_confirmed_bookings_after_end_date() {
        let repos = repos().await;
        let (_, profile) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "40-1000", 50).await;
        let start = today();
        let id = book(&repos, profile.id, v.id, start, start + ChronoDuration::days(2)).await;

        let mut booking = repos.bookings().find_by_id(id).await.unwrap().unwrap();
        booking.approve().unwrap();
        repos.bookings().update(booking).await.unwrap();

        let on_last_day = noon(start + ChronoDuration::days(2));
        assert_eq!(complete_overdue_bookings(repos.as_ref(), on_last_day).await.unwrap(), 0);
        assert_eq!(status(&repos, id).await, BookingStatus::Confirmed);

        let day_after = noon(start + ChronoDuration::days(3));
        assert_eq!(complete_overdue_bookings(repos.as_ref(), day_after).await.unwrap(), 1);
        assert_eq!(status(&repos, id).await, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn cancels_pending_bookings_after_timeout() {
        let repos = repos().await;
        let (_, profile) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "40-1000", 50).await;
        let id = book(&repos, profile.id, v.id, today(), today()).await;

        let soon = Utc::now() + ChronoDuration::hours(23);
        assert_eq!(cancel_stale_bookings(repos.as_ref(), soon, 24).await.unwrap(), 0);

        let later = Utc::now() + ChronoDuration::hours(25);
        assert_eq!(cancel_stale_bookings(repos.as_ref(), later, 24).await.unwrap(), 1);
        assert_eq!(status(&repos, id).await, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn run_reports_both_counts() {
        let repos = repos().await;
        staff(&repos, "admin").await;
        let report = run_booking_jobs(repos.as_ref(), Utc::now(), &BookingJobsConfig::default())
            .await
            .unwrap();
        assert_eq!(report, JobRunReport::default());
    }

    #[tokio::test]
    async fn tasks_stop_on_shutdown() {
        let repos = repos().await;
        let shutdown = ShutdownSignal::new();
        let tasks = start_booking_jobs(
            repos,
            shutdown.clone(),
            BookingJobsConfig {
                complete_interval_secs: 3600,
                stale_interval_secs: 3600,
                pending_timeout_hours: 24,
            },
        );
        assert_eq!(tasks.len(), 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tasks.iter().all(|t| !t.is_finished()));

        shutdown.trigger();
        for task in tasks {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("job loop did not stop after shutdown")
                .unwrap();
        }
    }
}
