use serde::{Deserialize, Serialize};

/// Access-token claims issued by the business backend.
///
/// The backend signs `{sub, exp}` with `sub` holding the user's uuid as
/// text. `role` is only present on tokens minted by newer issuers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    /// Role id; see `Role::from_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<u8>,
}
