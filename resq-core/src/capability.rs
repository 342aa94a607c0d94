use crate::model::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Feature keys gated by role. Navigation and actions both check these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    ViewDashboard,
    ReportIncident,
    ViewIncidents,
    EditIncident,
    ViewActiveAlerts,
    ViewResponderReports,
    ManageUsers,
    ViewAnalytics,
    ManageSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} is not allowed to {capability:?}", role_label(.role))]
pub struct AccessDenied {
    pub role: Option<Role>,
    pub capability: Capability,
}

fn role_label(role: &Option<Role>) -> &'static str {
    role.map(Role::as_str).unwrap_or("anonymous user")
}

/// Role → permitted capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    grants: BTreeMap<Role, BTreeSet<Capability>>,
}

impl CapabilityTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        use Capability::*;

        let everyone = [ViewDashboard, ReportIncident, ViewIncidents];
        let field = [EditIncident, ViewActiveAlerts, ViewResponderReports];
        let admin = [ManageUsers, ViewAnalytics, ManageSettings];

        Self::empty()
            .grant(Role::Public, everyone)
            .grant(Role::Responder, everyone)
            .grant(Role::Responder, field)
            .grant(Role::Admin, everyone)
            .grant(Role::Admin, field)
            .grant(Role::Admin, admin)
    }

    pub fn grant(mut self, role: Role, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.grants.entry(role).or_default().extend(capabilities);
        self
    }

    pub fn allows(&self, role: Role, capability: Capability) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|granted| granted.contains(&capability))
    }

    pub fn granted(&self, role: Role) -> impl Iterator<Item = Capability> + '_ {
        self.grants.get(&role).into_iter().flatten().copied()
    }

    pub fn roles_for(&self, capability: Capability) -> BTreeSet<Role> {
        self.grants
            .iter()
            .filter(|(_, granted)| granted.contains(&capability))
            .map(|(role, _)| *role)
            .collect()
    }

    /// No role means no session; nothing is allowed.
    pub fn authorize(&self, role: Option<Role>, capability: Capability) -> Result<(), AccessDenied> {
        match role {
            Some(role) if self.allows(role, capability) => Ok(()),
            _ => Err(AccessDenied { role, capability }),
        }
    }
}
