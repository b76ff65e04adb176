use chrono::{Datelike, NaiveDate};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{hash_password, verify_password, AuthError, TokenService};
use crate::models::{Gender, NewUser, Profile};
use crate::services::store::{ProfileStore, StoreError};

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "calm", "clever", "cosmic", "eager", "gentle", "golden", "happy",
    "hidden", "lively", "lucky", "mellow", "misty", "noble", "quiet", "rapid", "silent", "sunny",
    "swift", "tender", "vivid", "wild",
];

const NOUNS: &[&str] = &[
    "breeze", "canyon", "cloud", "comet", "dawn", "dune", "ember", "falcon", "forest", "harbor",
    "island", "lake", "meadow", "moon", "ocean", "otter", "pine", "river", "sparrow", "star",
    "stone", "sunset", "thunder", "willow",
];

const PASSWORD_LENGTH: usize = 16;

/// Errors raised by account operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly created account with its one-time plaintext password
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub profile: Profile,
    pub email: String,
    pub password: String,
}

/// Randomly generated account data before hashing
#[derive(Debug, Clone)]
pub struct GeneratedAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

/// Generate a random adult profile as of `today`
///
/// Birth years fall between 65 and 18 years ago; days stop at 28 so every
/// month is valid.
pub fn generate_account<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> GeneratedAccount {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(rng).copied().unwrap_or("river");
    let name = format!("{}-{}", adjective, noun);
    let email = format!("{}-{:06}@example.com", name, rng.gen_range(0..1_000_000));

    let password: String = (0..PASSWORD_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();

    let gender = match rng.gen_range(0..3) {
        0 => Gender::Male,
        1 => Gender::Female,
        _ => Gender::NotSpecified,
    };

    let newest_year = today.year() - 18;
    let oldest_year = newest_year - 47;
    let year = rng.gen_range(oldest_year..newest_year);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let date_of_birth = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today);

    let latitude = f64::from(rng.gen_range(-90..90));
    let longitude = f64::from(rng.gen_range(-180..180));

    GeneratedAccount {
        name,
        email,
        password,
        gender,
        date_of_birth,
        latitude,
        longitude,
    }
}

/// Account creation and login
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn ProfileStore>,
    tokens: TokenService,
    password_iterations: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn ProfileStore>, tokens: TokenService, password_iterations: u32) -> Self {
        Self {
            store,
            tokens,
            password_iterations,
        }
    }

    /// Create an account with a randomly generated profile
    pub async fn create_random(&self, today: NaiveDate) -> Result<CreatedAccount, AccountError> {
        let generated = generate_account(&mut rand::thread_rng(), today);
        let password_hash = hash_password(&generated.password, self.password_iterations)?;

        let profile = self
            .store
            .create_user(NewUser {
                email: generated.email.clone(),
                password_hash,
                name: generated.name,
                gender: generated.gender,
                date_of_birth: generated.date_of_birth,
                latitude: generated.latitude,
                longitude: generated.longitude,
            })
            .await?
            .with_age_on(today);

        tracing::info!("Created account {} ({})", profile.id, generated.email);

        Ok(CreatedAccount {
            profile,
            email: generated.email,
            password: generated.password,
        })
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let credentials = self
            .store
            .find_credentials(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &credentials.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(self.tokens.issue(credentials.user_id)?)
    }
}
