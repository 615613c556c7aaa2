//! Customer profile entity

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{DomainError, DomainResult};
use crate::shared::{age_on, is_valid_phone, non_blank};

/// Minimum age for holding a customer profile with a birth date.
pub const MINIMUM_AGE: i32 = 18;

/// Verification state, set by staff or synced from a status provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerStatus {
    Verified,
    Unverified,
    Blocked,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "verified" => Some(Self::Verified),
            "unverified" => Some(Self::Unverified),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profile of a customer account.
///
/// `username` and `email` are read from the owning account.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i32,
    pub account_id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub driver_license_number: Option<String>,
    pub license_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Names of the required profile fields that are still empty, in display order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.phone_number) {
            missing.push("phone_number");
        }
        if blank(&self.address) {
            missing.push("address");
        }
        if blank(&self.driver_license_number) {
            missing.push("driver_license_number");
        }
        if blank(&self.license_image) {
            missing.push("license_image");
        }
        if self.date_of_birth.is_none() {
            missing.push("date_of_birth");
        }
        missing
    }

    pub fn is_profile_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn is_blocked(&self) -> bool {
        self.status == CustomerStatus::Blocked
    }

    /// Checks that the profile may place a booking.
    pub fn ensure_can_book(&self) -> DomainResult<()> {
        if self.is_blocked() {
            return Err(DomainError::Forbidden(
                "Customer is blocked from making bookings".to_string(),
            ));
        }
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "Customer profile is incomplete. Missing: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Applies a partial update. Fields left as `None` keep their value;
    /// a blank string clears the field.
    pub fn apply(&mut self, changes: ProfileChanges, today: NaiveDate) -> DomainResult<()> {
        if let Some(phone) = changes.phone_number {
            let phone = non_blank(Some(phone));
            if let Some(ref p) = phone {
                if !is_valid_phone(p) {
                    return Err(DomainError::Validation(
                        "phone_number: Enter a valid phone number (digits, optional leading +, 7-15 characters)"
                            .to_string(),
                    ));
                }
            }
            self.phone_number = phone;
        }
        if let Some(address) = changes.address {
            self.address = non_blank(Some(address));
        }
        if let Some(license) = changes.driver_license_number {
            self.driver_license_number = non_blank(Some(license));
        }
        if let Some(image) = changes.license_image {
            self.license_image = non_blank(Some(image));
        }
        if let Some(dob) = changes.date_of_birth {
            if dob > today {
                return Err(DomainError::Validation(
                    "date_of_birth: Date of birth cannot be in the future".to_string(),
                ));
            }
            if age_on(dob, today) < MINIMUM_AGE {
                return Err(DomainError::Validation(format!(
                    "date_of_birth: Customer must be at least {} years old",
                    MINIMUM_AGE
                )));
            }
            self.date_of_birth = Some(dob);
        }
        Ok(())
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub driver_license_number: Option<String>,
    pub license_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Filters for listing customers
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub status: Option<CustomerStatus>,
    /// Case-insensitive match on username
    pub search: Option<String>,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_customer() -> Customer {
        Customer {
            id: 1,
            account_id: "acc-1".into(),
            username: "lina".into(),
            email: None,
            phone_number: None,
            address: None,
            driver_license_number: None,
            license_image: None,
            date_of_birth: None,
            status: CustomerStatus::Unverified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn complete_changes() -> ProfileChanges {
        ProfileChanges {
            phone_number: Some("+962790000000".into()),
            address: Some("Amman".into()),
            driver_license_number: Some("DL-1".into()),
            license_image: Some("licenses/dl-1.png".into()),
            date_of_birth: Some(date(1990, 1, 1)),
        }
    }

    #[test]
    fn empty_profile_lists_all_missing_fields_in_order() {
        let c = empty_customer();
        assert_eq!(
            c.missing_fields(),
            vec![
                "phone_number",
                "address",
                "driver_license_number",
                "license_image",
                "date_of_birth"
            ]
        );
        assert!(!c.is_profile_complete());
    }

    #[test]
    fn blank_phone_counts_as_missing() {
        let mut c = empty_customer();
        c.apply(complete_changes(), date(2025, 1, 1)).unwrap();
        c.phone_number = Some("  ".into());
        assert_eq!(c.missing_fields(), vec!["phone_number"]);
    }

    #[test]
    fn complete_profile_can_book() {
        let mut c = empty_customer();
        c.apply(complete_changes(), date(2025, 1, 1)).unwrap();
        assert!(c.is_profile_complete());
        assert!(c.ensure_can_book().is_ok());
    }

    #[test]
    fn incomplete_profile_cannot_book() {
        let c = empty_customer();
        match c.ensure_can_book() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("phone_number")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn blocked_profile_cannot_book() {
        let mut c = empty_customer();
        c.apply(complete_changes(), date(2025, 1, 1)).unwrap();
        c.status = CustomerStatus::Blocked;
        assert!(matches!(c.ensure_can_book(), Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn invalid_phone_is_rejected() {
        let mut c = empty_customer();
        let changes = ProfileChanges {
            phone_number: Some("abc".into()),
            ..Default::default()
        };
        assert!(matches!(
            c.apply(changes, date(2025, 1, 1)),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(c.phone_number, None);
    }

    #[test]
    fn underage_birth_date_is_rejected() {
        let mut c = empty_customer();
        let changes = ProfileChanges {
            date_of_birth: Some(date(2010, 5, 1)),
            ..Default::default()
        };
        assert!(c.apply(changes, date(2025, 1, 1)).is_err());
        assert_eq!(c.date_of_birth, None);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(CustomerStatus::parse("Blocked"), Some(CustomerStatus::Blocked));
        assert_eq!(CustomerStatus::parse("gold"), None);
    }
}
