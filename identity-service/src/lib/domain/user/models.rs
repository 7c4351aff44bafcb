use std::fmt;

use auth::CredentialValidator;
use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::RoleError;
use crate::user::errors::UserIdError;

/// Maximum bio length, in characters.
pub const MAX_BIO_LENGTH: usize = 250;

/// Status given to identities created without one.
pub const DEFAULT_STATUS: &str = "Active";

/// Identity record aggregate.
///
/// One stored profile plus credentials for a `(role, user_id)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub role: Role,
    pub user_id: UserId,
    pub name: String,
    /// Lower-cased email, or empty when none was given
    pub email: String,
    pub phone: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub bio: String,
    pub status: String,
    pub contact_enabled: bool,
    pub profile_image_url: String,
    /// Absent for identities registered without a password
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Composite directory key.
    pub fn key(&self) -> UserKey {
        UserKey::new(self.role.clone(), self.user_id.clone())
    }
}

/// User identifier value type (caller-assigned, non-blank).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID.
    ///
    /// # Errors
    /// * `Empty` - Value is empty or whitespace
    pub fn new(user_id: impl Into<String>) -> Result<Self, UserIdError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            Err(UserIdError::Empty)
        } else {
            Ok(Self(user_id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role value type; partitions the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    /// Create a role.
    ///
    /// # Errors
    /// * `Empty` - Value is empty or whitespace
    pub fn new(role: impl Into<String>) -> Result<Self, RoleError> {
        let role = role.into();
        if role.trim().is_empty() {
            Err(RoleError::Empty)
        } else {
            Ok(Self(role))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Composite directory key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserKey {
    pub role: Role,
    pub user_id: UserId,
}

impl UserKey {
    pub fn new(role: Role, user_id: UserId) -> Self {
        Self { role, user_id }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.role, self.user_id)
    }
}

/// Email address type
///
/// Trimmed, validated against the credential policy, then lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, normalized email address.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not have the `local@domain.tld` shape
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let email = email.trim();
        if CredentialValidator::is_valid_email(email) {
            Ok(Self(email.to_lowercase()))
        } else {
            Err(EmailError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public view of an identity record; never carries the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub role: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub bio: String,
    pub status: String,
    pub contact_enabled: bool,
    pub profile_image_url: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            role: user.role.as_str().to_string(),
            user_id: user.user_id.as_str().to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            lat: user.lat,
            lng: user.lng,
            bio: user.bio.clone(),
            status: user.status.clone(),
            contact_enabled: user.contact_enabled,
            profile_image_url: user.profile_image_url.clone(),
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile plus a freshly issued token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedProfile {
    pub profile: UserProfile,
    pub token: String,
}

/// Command to log in with email and password (raw, validated by the service).
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Command to register an identity or update it in place.
///
/// Optional fields left as `None` (or empty text) keep whatever the
/// directory already stores.
#[derive(Debug, Clone, Default)]
pub struct CreateOrUpdateUserCommand {
    pub user_id: String,
    pub role: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub contact_enabled: Option<bool>,
    pub profile_image_url: Option<String>,
    pub password: Option<String>,
    pub email_verified: Option<bool>,
}

/// Partial identity record written with merge semantics.
///
/// `Some` fields overwrite, `None` fields leave the stored value untouched
/// (or take the default on a new record). `created_at` only applies when
/// the record does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPatch {
    pub role: Role,
    pub user_id: UserId,
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub contact_enabled: Option<bool>,
    pub profile_image_url: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPatch {
    /// Empty patch for a key: touches nothing but `updated_at`.
    pub fn new(key: UserKey, now: DateTime<Utc>) -> Self {
        Self {
            role: key.role,
            user_id: key.user_id,
            name: None,
            email: None,
            phone: None,
            location: None,
            lat: None,
            lng: None,
            bio: None,
            status: None,
            contact_enabled: None,
            profile_image_url: None,
            password_hash: None,
            email_verified: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> UserKey {
        UserKey::new(self.role.clone(), self.user_id.clone())
    }

    /// Merge onto an existing record, or build a new one from defaults.
    pub fn apply_to(self, existing: Option<User>) -> User {
        let mut user = existing.unwrap_or_else(|| User {
            role: self.role.clone(),
            user_id: self.user_id.clone(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            lat: 0.0,
            lng: 0.0,
            bio: String::new(),
            status: DEFAULT_STATUS.to_string(),
            contact_enabled: false,
            profile_image_url: String::new(),
            password_hash: None,
            email_verified: false,
            created_at: self.created_at,
            updated_at: self.updated_at,
        });

        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email.as_str().to_string();
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(location) = self.location {
            user.location = location;
        }
        if let Some(lat) = self.lat {
            user.lat = lat;
        }
        if let Some(lng) = self.lng {
            user.lng = lng;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(contact_enabled) = self.contact_enabled {
            user.contact_enabled = contact_enabled;
        }
        if let Some(profile_image_url) = self.profile_image_url {
            user.profile_image_url = profile_image_url;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = Some(password_hash);
        }
        if let Some(email_verified) = self.email_verified {
            user.email_verified = email_verified;
        }
        user.updated_at = self.updated_at;

        user
    }
}
