//! Vehicle domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult};

pub const EARLIEST_MODEL_YEAR: i32 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Car,
    Van,
    Truck,
    Motorbike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Van => "van",
            Self::Truck => "truck",
            Self::Motorbike => "motorbike",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "car" => Some(Self::Car),
            "van" => Some(Self::Van),
            "truck" => Some(Self::Truck),
            "motorbike" => Some(Self::Motorbike),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rentable vehicle
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    /// Price per rental day
    pub daily_rate: Decimal,
    /// Unique registration plate
    pub plate_number: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Manual availability flag; does not reflect bookings
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// "Brand Model (PLATE)"
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.plate_number)
    }

    pub fn apply(&mut self, changes: VehicleChanges) {
        if let Some(brand) = changes.brand {
            self.brand = brand;
        }
        if let Some(model) = changes.model {
            self.model = model;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        if let Some(vehicle_type) = changes.vehicle_type {
            self.vehicle_type = vehicle_type;
        }
        if let Some(rate) = changes.daily_rate {
            self.daily_rate = rate;
        }
        if let Some(plate) = changes.plate_number {
            self.plate_number = plate;
        }
        if let Some(description) = changes.description {
            self.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(image) = changes.image {
            self.image = Some(image).filter(|i| !i.is_empty());
        }
        if let Some(available) = changes.is_available {
            self.is_available = available;
        }
    }

    pub fn validate(&self, current_year: i32) -> DomainResult<()> {
        validate_year(self.year, current_year)?;
        validate_daily_rate(self.daily_rate)?;
        if self.brand.trim().is_empty() || self.model.trim().is_empty() {
            return Err(DomainError::Validation(
                "brand and model are required".to_string(),
            ));
        }
        if self.plate_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "plate_number: This field is required".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn validate_year(year: i32, current_year: i32) -> DomainResult<()> {
    if year > current_year {
        return Err(DomainError::Validation(
            "year: Year cannot be in the future".to_string(),
        ));
    }
    if year < EARLIEST_MODEL_YEAR {
        return Err(DomainError::Validation(format!(
            "year: Year must be {} or later",
            EARLIEST_MODEL_YEAR
        )));
    }
    Ok(())
}

/// Largest rate with 8 digits and 2 decimal places.
pub fn max_daily_rate() -> Decimal {
    Decimal::new(99_999_999, 2)
}

pub fn validate_daily_rate(rate: Decimal) -> DomainResult<()> {
    if rate <= Decimal::ZERO {
        return Err(DomainError::Validation(
            "daily_rate: Daily rate must be greater than zero".to_string(),
        ));
    }
    if rate > max_daily_rate() {
        return Err(DomainError::Validation(format!(
            "daily_rate: Daily rate cannot exceed {}",
            max_daily_rate()
        )));
    }
    Ok(())
}

/// Input for creating a vehicle
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    pub daily_rate: Decimal,
    pub plate_number: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
}

impl NewVehicle {
    pub fn validate(&self, current_year: i32) -> DomainResult<()> {
        validate_year(self.year, current_year)?;
        validate_daily_rate(self.daily_rate)
    }
}

/// Partial vehicle update
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vehicle_type: Option<VehicleType>,
    pub daily_rate: Option<Decimal>,
    pub plate_number: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

/// Catalog filters. `brand` and `model` match case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub vehicle_type: Option<VehicleType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub only_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: 7,
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2020,
            vehicle_type: VehicleType::Car,
            daily_rate: Decimal::new(5000, 2),
            plate_number: "12-3456".into(),
            description: None,
            image: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn label_includes_plate() {
        assert_eq!(sample().label(), "Toyota Corolla (12-3456)");
    }

    #[test]
    fn future_year_rejected() {
        assert!(validate_year(2031, 2030).is_err());
        assert!(validate_year(2030, 2030).is_ok());
        assert!(validate_year(1899, 2030).is_err());
    }

    #[test]
    fn rate_must_be_positive() {
        assert!(validate_daily_rate(Decimal::ZERO).is_err());
        assert!(validate_daily_rate(Decimal::new(-1, 0)).is_err());
        assert!(validate_daily_rate(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn rate_is_capped_at_column_precision() {
        assert!(validate_daily_rate(Decimal::new(99_999_999, 2)).is_ok());
        assert!(validate_daily_rate(Decimal::new(100_000_000, 2)).is_err());
        assert!(validate_daily_rate(Decimal::from_i128_with_scale(10_i128.pow(25), 0)).is_err());
    }

    #[test]
    fn apply_changes_only_given_fields() {
        let mut v = sample();
        v.apply(VehicleChanges {
            daily_rate: Some(Decimal::from(65)),
            is_available: Some(false),
            ..Default::default()
        });
        assert_eq!(v.daily_rate, Decimal::from(65));
        assert!(!v.is_available);
        assert_eq!(v.brand, "Toyota");
    }

    #[test]
    fn type_parse() {
        assert_eq!(VehicleType::parse("Motorbike"), Some(VehicleType::Motorbike));
        assert_eq!(VehicleType::parse("boat"), None);
    }
}
