use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Actor context resolved from a bearer token issued by the external
/// identity provider. The core never authenticates credentials itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Username of the staff member (token subject)
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user may manage the service/counter catalog
    pub fn is_admin(&self) -> bool {
        self.has_role(crate::shared::constants::ROLE_ADMIN)
    }
}

/// Claims carried by tokens from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
}
