//! Booking lifecycle and the periodic status jobs.

pub mod jobs;
pub mod service;

pub use jobs::{run_booking_jobs, start_booking_jobs, BookingJobsConfig, JobRunReport};
pub use service::{BookingChanges, BookingRequest, BookingService, StatusGroup};
