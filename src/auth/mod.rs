//! Authentication: JWT verification, the `CurrentUser` extractor and the
//! route-guard middleware. Token issuance lives in a separate service.

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
