use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserKey;
use crate::domain::user::models::UserPatch;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::DirectoryError;

/// Partial unique index on non-empty emails (see migrations).
const EMAIL_UNIQUE_INDEX: &str = "users_email_key";

const USER_COLUMNS: &str = "role, user_id, name, email, phone, location, lat, lng, bio, status, \
     contact_enabled, profile_image_url, password_hash, email_verified, created_at, updated_at";

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    role: String,
    user_id: String,
    name: String,
    email: String,
    phone: String,
    location: String,
    lat: f64,
    lng: f64,
    bio: String,
    status: String,
    contact_enabled: bool,
    profile_image_url: String,
    password_hash: Option<String>,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DirectoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            role: Role::new(row.role).map_err(|e| DirectoryError::CorruptRecord(e.to_string()))?,
            user_id: UserId::new(row.user_id)
                .map_err(|e| DirectoryError::CorruptRecord(e.to_string()))?,
            name: row.name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            lat: row.lat,
            lng: row.lng,
            bio: row.bio,
            status: row.status,
            contact_enabled: row.contact_enabled,
            profile_image_url: row.profile_image_url,
            password_hash: row.password_hash,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> DirectoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
            return DirectoryError::EmailConflict;
        }
    }
    DirectoryError::Unavailable(e.to_string())
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn get(&self, key: &UserKey) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 AND user_id = $2"
        ))
        .bind(key.role.as_str())
        .bind(key.user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn upsert(&self, patch: UserPatch) -> Result<User, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES (
                $1, $2,
                COALESCE($3::TEXT, ''),
                COALESCE($4::TEXT, ''),
                COALESCE($5::TEXT, ''),
                COALESCE($6::TEXT, ''),
                COALESCE($7::DOUBLE PRECISION, 0),
                COALESCE($8::DOUBLE PRECISION, 0),
                COALESCE($9::TEXT, ''),
                COALESCE($10::TEXT, 'Active'),
                COALESCE($11::BOOLEAN, FALSE),
                COALESCE($12::TEXT, ''),
                $13::TEXT,
                COALESCE($14::BOOLEAN, FALSE),
                $15, $16
            )
            ON CONFLICT (role, user_id) DO UPDATE SET
                name = COALESCE($3::TEXT, users.name),
                email = COALESCE($4::TEXT, users.email),
                phone = COALESCE($5::TEXT, users.phone),
                location = COALESCE($6::TEXT, users.location),
                lat = COALESCE($7::DOUBLE PRECISION, users.lat),
                lng = COALESCE($8::DOUBLE PRECISION, users.lng),
                bio = COALESCE($9::TEXT, users.bio),
                status = COALESCE($10::TEXT, users.status),
                contact_enabled = COALESCE($11::BOOLEAN, users.contact_enabled),
                profile_image_url = COALESCE($12::TEXT, users.profile_image_url),
                password_hash = COALESCE($13::TEXT, users.password_hash),
                email_verified = COALESCE($14::BOOLEAN, users.email_verified),
                updated_at = $16
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(patch.role.as_str())
        .bind(patch.user_id.as_str())
        .bind(patch.name)
        .bind(patch.email.map(|email| email.as_str().to_string()))
        .bind(patch.phone)
        .bind(patch.location)
        .bind(patch.lat)
        .bind(patch.lng)
        .bind(patch.bio)
        .bind(patch.status)
        .bind(patch.contact_enabled)
        .bind(patch.profile_image_url)
        .bind(patch.password_hash)
        .bind(patch.email_verified)
        .bind(patch.created_at)
        .bind(patch.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        User::try_from(row)
    }

    async fn exists_by_email(
        &self,
        email: &EmailAddress,
        excluding: Option<UserKey>,
    ) -> Result<bool, DirectoryError> {
        let query = match &excluding {
            Some(key) => sqlx::query_scalar::<sqlx::Postgres, bool>(
                "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND NOT (role = $2 AND user_id = $3))",
            )
            .bind(email.as_str())
            .bind(key.role.as_str())
            .bind(key.user_id.as_str()),
            None => sqlx::query_scalar::<sqlx::Postgres, bool>(
                "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
            )
            .bind(email.as_str()),
        };

        query.fetch_one(&self.pool).await.map_err(database_error)
    }

    async fn delete(&self, key: &UserKey) -> Result<(), DirectoryError> {
        sqlx::query("DELETE FROM users WHERE role = $1 AND user_id = $2")
            .bind(key.role.as_str())
            .bind(key.user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }
}
