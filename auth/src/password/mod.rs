pub mod bcrypt;
pub mod errors;

pub use self::bcrypt::PasswordHasher;
pub use errors::PasswordError;
