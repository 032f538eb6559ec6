use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::roles::UserRole;

/// Claims carried by an access token.
///
/// Authorization decisions are made from `role` alone, so a role change
/// takes effect once the holder's current token expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    pub nbf: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-456","email":"user@school.edu","role":"teacher","iss":"school-management-system","exp":9999999999,"iat":9999999900,"nbf":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-456");
        assert_eq!(claims.role, UserRole::Teacher);
        assert_eq!(claims.iss, "school-management-system");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_claims_reject_unknown_role() {
        let json = r#"{"sub":"u","email":"e","role":"superuser","iss":"i","exp":1,"iat":1,"nbf":1}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
