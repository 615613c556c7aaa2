//! Fixtures shared by the application service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::account::{AccountRole, Actor, NewAccount};
use crate::domain::customer::{Customer, ProfileChanges};
use crate::domain::vehicle::{NewVehicle, Vehicle, VehicleType};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::database::test_database;

pub fn today() -> NaiveDate {
    date(2030, 3, 1)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".into(),
        access_token_minutes: 15,
        refresh_token_days: 1,
        issuer: "rentcar-test".into(),
    }
}

pub async fn repos() -> Arc<dyn RepositoryProvider> {
    Arc::new(SeaOrmRepositoryProvider::new(test_database().await))
}

pub async fn staff(repos: &Arc<dyn RepositoryProvider>, username: &str) -> Actor {
    repos
        .accounts()
        .create(NewAccount {
            username: username.into(),
            email: None,
            password_hash: "hash".into(),
            role: AccountRole::Staff,
        })
        .await
        .unwrap()
        .actor()
}

/// Customer account with a filled-in profile when `complete` is set.
pub async fn customer(
    repos: &Arc<dyn RepositoryProvider>,
    username: &str,
    complete: bool,
) -> (Actor, Customer) {
    let account = repos
        .accounts()
        .create(NewAccount {
            username: username.into(),
            email: None,
            password_hash: "hash".into(),
            role: AccountRole::Customer,
        })
        .await
        .unwrap();

    let mut profile = repos
        .customers()
        .find_by_account_id(&account.id)
        .await
        .unwrap()
        .unwrap();

    if complete {
        profile
            .apply(
                ProfileChanges {
                    phone_number: Some("+962790000000".into()),
                    address: Some("Amman".into()),
                    driver_license_number: Some(format!("DL-{}", username)),
                    license_image: Some(format!("licenses/{}.png", username)),
                    date_of_birth: Some(date(1990, 1, 1)),
                },
                today(),
            )
            .unwrap();
        profile = repos.customers().update(profile).await.unwrap();
    }

    (account.actor(), profile)
}

pub async fn vehicle(repos: &Arc<dyn RepositoryProvider>, plate: &str, daily_rate: i64) -> Vehicle {
    repos
        .vehicles()
        .create(NewVehicle {
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2022,
            vehicle_type: VehicleType::Car,
            daily_rate: Decimal::from(daily_rate),
            plate_number: plate.into(),
            description: None,
            image: None,
            is_available: true,
        })
        .await
        .unwrap()
}
