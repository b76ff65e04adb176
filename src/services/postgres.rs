use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;

use crate::core::filters::{DiscoveryFilters, FilterClause};
use crate::models::{
    Credentials, NewUser, PairKey, Profile, Relationship, RelationshipState, SortMode, UserId,
};
use crate::services::store::{ProfileStore, RelationshipStore, StoreError};

const PROFILE_COLUMNS: &str =
    "u.id, u.name, u.gender, u.date_of_birth, u.latitude, u.longitude, u.likability";

/// PostgreSQL-backed store for users and relationships
///
/// Relationships are keyed by `(user_low, user_high)`, the canonical form of
/// the pair, with a primary key so concurrent first swipes from both sides
/// cannot commit two rows.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Build the discovery query for `requester`
    ///
    /// Every user-supplied value goes through `push_bind`.
    fn candidate_query<'a>(
        requester: UserId,
        filters: &'a DiscoveryFilters,
    ) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new("SELECT ");
        builder.push(PROFILE_COLUMNS);
        builder.push(" FROM users u WHERE u.id <> ");
        builder.push_bind(requester);
        builder.push(
            " AND NOT EXISTS (SELECT 1 FROM matches m WHERE m.initiator_id = ",
        );
        builder.push_bind(requester);
        builder.push(" AND m.recipient_id = u.id)");
        builder.push(
            " AND NOT EXISTS (SELECT 1 FROM matches m WHERE m.recipient_id = ",
        );
        builder.push_bind(requester);
        builder.push(" AND m.initiator_id = u.id AND m.state <> ");
        builder.push_bind(RelationshipState::Pending);
        builder.push(")");

        for clause in filters.clauses() {
            push_clause(&mut builder, clause);
        }

        match filters.sort() {
            SortMode::Recommended => builder.push(" ORDER BY u.likability DESC, u.id ASC"),
            SortMode::Unspecified | SortMode::Distance => builder.push(" ORDER BY u.id ASC"),
        };

        builder
    }
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &FilterClause) {
    match *clause {
        FilterClause::BornBefore(cutoff) => {
            builder.push(" AND u.date_of_birth < ");
            builder.push_bind(cutoff);
        }
        FilterClause::BornAfter(cutoff) => {
            builder.push(" AND u.date_of_birth > ");
            builder.push_bind(cutoff);
        }
        FilterClause::GenderIs(gender) => {
            builder.push(" AND u.gender = ");
            builder.push_bind(gender);
        }
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
    Ok(Profile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        gender: row.try_get("gender")?,
        date_of_birth: row.try_get("date_of_birth")?,
        age: 0,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        distance: None,
        likability: row.try_get("likability")?,
    })
}

fn duplicate_or(err: sqlx::Error, what: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(what),
        _ => StoreError::SqlxError(err),
    }
}

#[async_trait]
impl ProfileStore for PostgresClient {
    async fn find_candidates(
        &self,
        requester: UserId,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Profile>, StoreError> {
        let mut builder = Self::candidate_query(requester, filters);
        let rows = builder.build().fetch_all(&self.pool).await?;

        let profiles = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("User {} has {} candidate profiles", requester, profiles.len());

        Ok(profiles)
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let query = format!("SELECT {} FROM users u WHERE u.id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn adjust_likability(&self, user_id: UserId, delta: i32) -> Result<(), StoreError> {
        let query = r#"
            UPDATE users
            SET likability = likability + $1
            WHERE id = $2
        "#;

        sqlx::query(query)
            .bind(delta)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError> {
        let query = r#"
            INSERT INTO users (email, password_hash, name, gender, date_of_birth, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, gender, date_of_birth, latitude, longitude, likability
        "#;

        let row = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.gender)
            .bind(user.date_of_birth)
            .bind(user.latitude)
            .bind(user.longitude)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, format!("email {}", user.email)))?;

        profile_from_row(&row)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let query = r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = $1
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Credentials {
                user_id: row.try_get("id")?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
            })),
            None => Ok(None),
        }
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl RelationshipStore for PostgresClient {
    async fn get_relationship(&self, key: PairKey) -> Result<Option<Relationship>, StoreError> {
        let query = r#"
            SELECT initiator_id, recipient_id, state
            FROM matches
            WHERE user_low = $1 AND user_high = $2
        "#;

        let row = sqlx::query(query)
            .bind(key.low())
            .bind(key.high())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Relationship {
                initiator: row.try_get("initiator_id")?,
                recipient: row.try_get("recipient_id")?,
                state: row.try_get("state")?,
            })),
            None => Ok(None),
        }
    }

    async fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
        let key = relationship.key();
        let query = r#"
            INSERT INTO matches (user_low, user_high, initiator_id, recipient_id, state)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(key.low())
            .bind(key.high())
            .bind(relationship.initiator)
            .bind(relationship.recipient)
            .bind(relationship.state)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, format!("relationship {}-{}", key.low(), key.high())))?;

        tracing::debug!(
            "Created relationship: {} -> {} ({})",
            relationship.initiator,
            relationship.recipient,
            relationship.state
        );

        Ok(())
    }

    async fn update_state(&self, key: PairKey, state: RelationshipState) -> Result<(), StoreError> {
        let query = r#"
            UPDATE matches
            SET state = $3, updated_at = NOW()
            WHERE user_low = $1 AND user_high = $2
        "#;

        let result = sqlx::query(query)
            .bind(key.low())
            .bind(key.high())
            .bind(state)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "relationship {}-{}",
                key.low(),
                key.high()
            )));
        }

        Ok(())
    }
}
