// Permission model - a closed capability set over (resource, action)
use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, Deserializer};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::user::Role;

/// Every resource the permission system knows about. Closed enumeration
/// so a typo in a permission payload is a deserialization error, not an
/// implicit `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Customers,
    Teams,
    Users,
    Settings,
    Dashboard,
    Branches,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Customers,
        Resource::Teams,
        Resource::Users,
        Resource::Settings,
        Resource::Dashboard,
        Resource::Branches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Teams => "teams",
            Resource::Users => "users",
            Resource::Settings => "settings",
            Resource::Dashboard => "dashboard",
            Resource::Branches => "branches",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Resource::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

/// Whether a user's effective permissions come from their role or from a
/// fully custom set. Custom mode replaces the role grants outright - the
/// two sources are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    RoleOnly,
    CustomOnly,
}

/// A set of granted (resource, action) capabilities.
///
/// On the wire this is the nested boolean map the API has always exposed
/// (`{"customers": {"view": true, ...}, ...}`); internally it is a closed
/// set so missing-permission checks cannot silently key-miss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: BTreeSet<(Resource, Action)>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, resource: Resource, action: Action) {
        self.granted.insert((resource, action));
    }

    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.granted.contains(&(resource, action))
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    /// Role-derived defaults, total over `Role`.
    pub fn for_role(role: Role) -> Self {
        let mut set = Self::empty();
        match role {
            Role::Admin => {
                for resource in Resource::ALL {
                    for action in Action::ALL {
                        set.grant(resource, action);
                    }
                }
            }
            Role::Manager => {
                for action in [Action::View, Action::Create, Action::Edit] {
                    set.grant(Resource::Customers, action);
                    set.grant(Resource::Teams, action);
                }
                set.grant(Resource::Customers, Action::Delete);
                set.grant(Resource::Users, Action::View);
                set.grant(Resource::Dashboard, Action::View);
                set.grant(Resource::Dashboard, Action::Edit);
                set.grant(Resource::Settings, Action::View);
                set.grant(Resource::Branches, Action::View);
            }
            Role::Agent => {
                set.grant(Resource::Customers, Action::View);
                set.grant(Resource::Customers, Action::Edit);
                set.grant(Resource::Dashboard, Action::View);
            }
        }
        set
    }

    /// Effective permissions for a user: role grants in `RoleOnly` mode,
    /// the custom set alone in `CustomOnly` mode.
    pub fn effective(mode: PermissionMode, role: Role, custom: &PermissionSet) -> PermissionSet {
        match mode {
            PermissionMode::RoleOnly => PermissionSet::for_role(role),
            PermissionMode::CustomOnly => custom.clone(),
        }
    }

    /// Expand to the nested boolean map, one entry per resource with all
    /// four action flags spelled out.
    pub fn to_flags(&self) -> BTreeMap<&'static str, BTreeMap<&'static str, bool>> {
        let mut flags = BTreeMap::new();
        for resource in Resource::ALL {
            let mut actions = BTreeMap::new();
            for action in Action::ALL {
                actions.insert(action.as_str(), self.allows(resource, action));
            }
            flags.insert(resource.as_str(), actions);
        }
        flags
    }

    /// Parse the nested boolean map. Unknown resource or action names are
    /// rejected so typos surface instead of defaulting to "denied".
    pub fn from_flags(
        flags: &BTreeMap<String, BTreeMap<String, bool>>,
    ) -> Result<Self, String> {
        let mut set = Self::empty();
        for (resource_key, actions) in flags {
            let resource = Resource::parse(resource_key)
                .ok_or_else(|| format!("unknown permission resource '{resource_key}'"))?;
            for (action_key, granted) in actions {
                let action = Action::parse(action_key)
                    .ok_or_else(|| format!("unknown permission action '{action_key}'"))?;
                if *granted {
                    set.grant(resource, action);
                }
            }
        }
        Ok(set)
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flags = self.to_flags();
        let mut map = serializer.serialize_map(Some(flags.len()))?;
        for (resource, actions) in flags {
            map.serialize_entry(resource, &actions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = BTreeMap::<String, BTreeMap<String, bool>>::deserialize(deserializer)?;
        PermissionSet::from_flags(&flags).map_err(de::Error::custom)
    }
}
