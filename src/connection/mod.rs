pub mod auth;

pub use auth::{ANONYMOUS_NAME, AuthProvider, Identity, StaticAuthProvider};
