//! Session storage module.
//!
//! - Web sessions backing the `sessionid` cookie
//! - Refresh tokens issued alongside access tokens

mod refresh_token;
mod web_session;

pub use refresh_token::{RedisRefreshTokenStore, RefreshTokenData, RefreshTokenStore};
pub(crate) use web_session::expires_after;
pub use web_session::{generate_session_id, RedisSessionStore, SessionStore, WebSession};
