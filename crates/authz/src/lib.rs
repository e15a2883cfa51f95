//! Authentication primitives: salted password digests, HS256 access tokens
//! and the [`AuthUser`] extractor guarding protected routes.

pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::AuthUser;
pub use jwt::{Claims, JwtService};
