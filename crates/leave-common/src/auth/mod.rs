//! Authentication utilities

mod jwt;
mod password;

pub use jwt::{bearer_token, Claims, JwtService, TokenPair, TokenType};
pub use password::{hash_password, validate_password_strength, verify_password};
