use serde::{Deserialize, Serialize};

/// Role claim carried on the identity token.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Reviewer,
    Artist,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Reviewer => "reviewer",
            UserRole::Artist => "artist",
        }
    }

    /// Unknown or missing claims fall back to the least privileged role.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => UserRole::Admin,
            Some("reviewer") => UserRole::Reviewer,
            _ => UserRole::Artist,
        }
    }
}

/// A verified caller as yielded by the identity service.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Caller {
    pub uid: String,
    pub role: UserRole,
}

impl Caller {
    pub fn new(uid: impl Into<String>, role: UserRole) -> Self {
        Caller { uid: uid.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_reviewer_or_admin(&self) -> bool {
        matches!(self.role, UserRole::Reviewer | UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_claim() {
        assert_eq!(UserRole::from_claim(Some("admin")), UserRole::Admin);
        assert_eq!(UserRole::from_claim(Some(" Reviewer ")), UserRole::Reviewer);
        assert_eq!(UserRole::from_claim(Some("superuser")), UserRole::Artist);
        assert_eq!(UserRole::from_claim(None), UserRole::Artist);
    }
}
