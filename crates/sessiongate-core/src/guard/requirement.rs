use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A role a view can require, compared by exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const USER: &'static str = "user";

    /// Returns `None` for an empty role name, which declares no requirement.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a session user's role
    pub fn matches(&self, role: Option<&str>) -> bool {
        role == Some(self.0.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static authorization metadata declared on a view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteRequirement {
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_role",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<Role>,
}

fn deserialize_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.and_then(Role::new))
}

impl RouteRequirement {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            role: None,
        }
    }

    pub fn with_role(role: Role) -> Self {
        Self {
            requires_auth: true,
            role: Some(role),
        }
    }

    /// A declared role implies authentication even if `requires_auth` was
    /// left unset.
    pub fn needs_auth(&self) -> bool {
        self.requires_auth || self.role.is_some()
    }

    /// Combine a parent view's requirement with a nested child's. The child
    /// can tighten but not loosen authentication; a child role replaces an
    /// inherited one.
    pub fn merge(&self, child: &RouteRequirement) -> RouteRequirement {
        RouteRequirement {
            requires_auth: self.requires_auth || child.requires_auth,
            role: child.role.clone().or_else(|| self.role.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_role_is_undeclared() {
        assert_eq!(Role::new(""), None);
        assert_eq!(Role::new("admin"), Some(Role::admin()));
    }

    #[test]
    fn test_role_matches_exactly() {
        let admin = Role::admin();
        assert!(admin.matches(Some("admin")));
        assert!(!admin.matches(Some("Admin")));
        assert!(!admin.matches(Some("admin ")));
        assert!(!admin.matches(Some("user")));
        assert!(!admin.matches(None));
    }

    #[test]
    fn test_role_implies_auth() {
        let requirement = RouteRequirement {
            requires_auth: false,
            role: Some(Role::user()),
        };
        assert!(requirement.needs_auth());
        assert!(!RouteRequirement::public().needs_auth());
        assert!(RouteRequirement::authenticated().needs_auth());
    }

    #[test]
    fn test_merge_parent_and_child() {
        let parent = RouteRequirement::with_role(Role::user());

        assert_eq!(parent.merge(&RouteRequirement::public()), parent);

        let child = RouteRequirement::with_role(Role::admin());
        assert_eq!(parent.merge(&child), child);

        let merged = RouteRequirement::public().merge(&RouteRequirement::authenticated());
        assert_eq!(merged, RouteRequirement::authenticated());
    }

    #[test]
    fn test_requirement_deserializes_with_defaults() {
        let requirement: RouteRequirement = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert!(!requirement.requires_auth);
        assert!(requirement.needs_auth());
        assert_eq!(requirement.role, Some(Role::admin()));

        let requirement: RouteRequirement =
            serde_json::from_str(r#"{"requires_auth":true,"role":""}"#).unwrap();
        assert_eq!(requirement, RouteRequirement::authenticated());

        let requirement: RouteRequirement = serde_json::from_str("{}").unwrap();
        assert_eq!(requirement, RouteRequirement::public());
    }
}
