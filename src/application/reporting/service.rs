//! Reporting service
//!
//! Aggregations are done in memory over the rows a report needs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::account::Actor;
use crate::domain::booking::{Booking, BookingReportFilter, BookingStatus};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_bookings: u64,
    pub total_revenue: Decimal,
    pub bookings_by_status: Vec<StatusCount>,
    pub total_customers: u64,
    pub total_vehicles: u64,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingReportRow {
    pub id: i32,
    pub customer: String,
    pub vehicle: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingsReport {
    pub bookings: Vec<BookingReportRow>,
    pub total_bookings: u64,
    pub total_revenue: Decimal,
    pub bookings_by_status: Vec<StatusCount>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleUtilization {
    pub vehicle_id: i32,
    pub vehicle: String,
    pub booked_days: i64,
    pub total_days: i64,
    /// Percentage rounded to one decimal
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UtilizationReport {
    pub month: String,
    pub year: i32,
    pub vehicles: Vec<VehicleUtilization>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: Decimal,
}

pub struct ReportService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ReportService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Booking figures honour `filter`; customer and vehicle totals never do.
    pub async fn dashboard(
        &self,
        actor: &Actor,
        filter: BookingReportFilter,
    ) -> DomainResult<DashboardSummary> {
        actor.require_staff()?;

        let rows = self.repos.bookings().find_details(&filter).await?;
        let bookings: Vec<&Booking> = rows.iter().map(|r| &r.booking).collect();

        Ok(DashboardSummary {
            total_bookings: bookings.len() as u64,
            total_revenue: total_revenue(bookings.iter().copied()),
            bookings_by_status: count_by_status(bookings.iter().copied()),
            total_customers: self.repos.customers().count().await?,
            total_vehicles: self.repos.vehicles().count().await?,
            user_name: actor.username.clone(),
        })
    }

    pub async fn bookings(
        &self,
        actor: &Actor,
        filter: BookingReportFilter,
    ) -> DomainResult<BookingsReport> {
        actor.require_staff()?;

        let rows = self.repos.bookings().find_details(&filter).await?;
        let bookings: Vec<&Booking> = rows.iter().map(|r| &r.booking).collect();
        let total_revenue = total_revenue(bookings.iter().copied());
        let bookings_by_status = count_by_status(bookings.iter().copied());

        let report_rows = rows
            .iter()
            .map(|r| BookingReportRow {
                id: r.booking.id,
                customer: r.customer_username.clone(),
                vehicle: r.vehicle_label.clone(),
                start_date: r.booking.start_date,
                end_date: r.booking.end_date,
                total_price: r.booking.total_price,
                status: r.booking.status.label().to_string(),
                payment_method: r.booking.payment_method.as_str().to_string(),
            })
            .collect::<Vec<_>>();

        Ok(BookingsReport {
            total_bookings: report_rows.len() as u64,
            bookings: report_rows,
            total_revenue,
            bookings_by_status,
            start_date: filter.start_from,
            end_date: filter.end_until,
            status: filter.status.map(|s| s.label().to_string()),
            generated_at: Utc::now(),
        })
    }

    /// Booked days per vehicle for bookings that start within the month.
    pub async fn vehicle_utilization(
        &self,
        actor: &Actor,
        year: i32,
        month: u32,
    ) -> DomainResult<UtilizationReport> {
        actor.require_staff()?;

        let (first, last) = month_bounds(year, month)?;
        let total_days = (last - first).num_days() + 1;

        let bookings = self
            .repos
            .bookings()
            .find_starting_between(first, last)
            .await?;

        let mut booked: HashMap<i32, i64> = HashMap::new();
        for b in &bookings {
            *booked.entry(b.vehicle_id).or_default() += b.range().days();
        }

        let vehicles = self
            .repos
            .vehicles()
            .find_all()
            .await?
            .into_iter()
            .map(|v| {
                let booked_days = booked.get(&v.id).copied().unwrap_or(0);
                VehicleUtilization {
                    vehicle_id: v.id,
                    vehicle: v.label(),
                    booked_days,
                    total_days,
                    utilization: utilization_percent(booked_days, total_days),
                }
            })
            .collect();

        Ok(UtilizationReport {
            month: month_name(month)?,
            year,
            vehicles,
            generated_at: Utc::now(),
        })
    }

    /// Revenue of bookings starting in each month of `year`, January first.
    pub async fn monthly_revenue(&self, actor: &Actor, year: i32) -> DomainResult<Vec<MonthlyRevenue>> {
        actor.require_staff()?;

        let (first, _) = month_bounds(year, 1)?;
        let (_, last) = month_bounds(year, 12)?;
        let bookings = self
            .repos
            .bookings()
            .find_starting_between(first, last)
            .await?;

        let mut per_month = [Decimal::ZERO; 12];
        for b in &bookings {
            per_month[b.start_date.month0() as usize] += b.total_price;
        }

        (1..=12u32)
            .zip(per_month)
            .map(|(m, revenue)| {
                Ok(MonthlyRevenue {
                    month: month_name(m)?,
                    revenue,
                })
            })
            .collect()
    }
}

// ── Aggregation helpers ─────────────────────────────────────────

fn total_revenue<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Decimal {
    bookings.map(|b| b.total_price).sum()
}

/// Counts for every status, zero included, in lifecycle order.
fn count_by_status<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Vec<StatusCount> {
    let mut counts: HashMap<BookingStatus, u64> = HashMap::new();
    for b in bookings {
        *counts.entry(b.status).or_default() += 1;
    }

    BookingStatus::ALL
        .iter()
        .map(|s| StatusCount {
            status: s.label().to_string(),
            count: counts.get(s).copied().unwrap_or(0),
        })
        .collect()
}

fn utilization_percent(booked_days: i64, total_days: i64) -> f64 {
    if total_days <= 0 {
        return 0.0;
    }
    let pct = booked_days as f64 / total_days as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

fn month_bounds(year: i32, month: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
    let invalid = || DomainError::Validation(format!("Invalid month: {}-{}", year, month));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

fn month_name(month: u32) -> DomainResult<String> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .ok_or_else(|| DomainError::Validation(format!("Invalid month: {}", month)))
}

// ── Tests ──────────────────────────────────────────────────────
