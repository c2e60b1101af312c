pub mod authenticator;
pub mod password;

pub use authenticator::{Credentials, PasswordAuthenticator, PASSWORD_HEADER, USERNAME_HEADER};
pub use password::{hash_password, hash_password_with_cost, verify_password};
