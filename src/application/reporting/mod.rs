//! Staff reports computed from bookings, vehicles and customers.

pub mod service;

pub use service::{
    BookingReportRow, BookingsReport, DashboardSummary, MonthlyRevenue, ReportService,
    StatusCount, UtilizationReport, VehicleUtilization,
};
