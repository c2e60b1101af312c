pub mod refresh_token;
pub mod user;

pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use user::{NewUser, User};
