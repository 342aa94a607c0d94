use crate::capability::{Capability, CapabilityTable};
use crate::model::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub path: String,
    pub label: String,
    pub icon: String,
    pub capability: Capability,
}

impl NavItem {
    pub fn new(path: &str, label: &str, icon: &str, capability: Capability) -> Self {
        Self {
            path: path.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            capability,
        }
    }

    pub fn allowed_roles(&self, table: &CapabilityTable) -> BTreeSet<Role> {
        table.roles_for(self.capability)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub title: String,
    pub items: Vec<NavItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMenu {
    pub sections: Vec<NavSection>,
}

impl NavMenu {
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.sections.iter().flat_map(|section| section.items.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

pub fn standard_menu() -> NavMenu {
    use Capability::*;

    NavMenu {
        sections: vec![
            NavSection {
                title: "General".into(),
                items: vec![
                    NavItem::new("/", "Dashboard", "home", ViewDashboard),
                    NavItem::new("/incidents/report", "Report Incident", "alert-triangle", ReportIncident),
                    NavItem::new("/incidents", "Incidents", "list-checks", ViewIncidents),
                ],
            },
            NavSection {
                title: "Responder Tools".into(),
                items: vec![
                    NavItem::new("/responder/alerts", "Active Alerts", "shield-alert", ViewActiveAlerts),
                    NavItem::new("/responder/reports", "Reports", "file-text", ViewResponderReports),
                ],
            },
            NavSection {
                title: "Admin".into(),
                items: vec![
                    NavItem::new("/admin/users", "User Management", "users", ManageUsers),
                    NavItem::new("/admin/analytics", "Analytics", "bar-chart", ViewAnalytics),
                    NavItem::new("/admin/settings", "Settings", "settings", ManageSettings),
                ],
            },
        ],
    }
}

/// Items the role may see, sections left empty dropped, order kept.
///
/// Without a role the result is empty; callers are expected to skip
/// rendering navigation entirely in that case.
pub fn visible_menu(menu: &NavMenu, role: Option<Role>, table: &CapabilityTable) -> NavMenu {
    let Some(role) = role else {
        return NavMenu::default();
    };

    NavMenu {
        sections: menu
            .sections
            .iter()
            .map(|section| NavSection {
                title: section.title.clone(),
                items: section
                    .items
                    .iter()
                    .filter(|item| table.allows(role, item.capability))
                    .cloned()
                    .collect(),
            })
            .filter(|section| !section.items.is_empty())
            .collect(),
    }
}

/// Exact match, or prefix match for anything but the root.
///
/// Nested paths can make several items active at once.
pub fn is_active(path: &str, current: &str) -> bool {
    if path == "/" {
        current == "/"
    } else {
        current.starts_with(path)
    }
}

pub fn active_paths<'a>(menu: &'a NavMenu, current: &str) -> Vec<&'a str> {
    menu.items()
        .filter(|item| is_active(&item.path, current))
        .map(|item| item.path.as_str())
        .collect()
}

/// Where the UI should go after a decision made by the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Route {
    Landing,
    IncidentList,
    IncidentDetail(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::IncidentList => "/incidents".to_string(),
            Route::IncidentDetail(id) => format!("/incidents/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(menu: &NavMenu) -> Vec<&str> {
        menu.items().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn public_sees_general_only() {
        let table = CapabilityTable::standard();
        let menu = visible_menu(&standard_menu(), Some(Role::Public), &table);
        assert_eq!(menu.sections.len(), 1);
        assert_eq!(menu.sections[0].title, "General");
        assert_eq!(labels(&menu), vec!["Dashboard", "Report Incident", "Incidents"]);
    }

    #[test]
    fn responder_gets_tools_but_not_admin() {
        let table = CapabilityTable::standard();
        let menu = visible_menu(&standard_menu(), Some(Role::Responder), &table);
        let titles: Vec<_> = menu.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["General", "Responder Tools"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = CapabilityTable::standard();
        for role in Role::ALL {
            let once = visible_menu(&standard_menu(), Some(role), &table);
            let twice = visible_menu(&once, Some(role), &table);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn admin_menu_is_superset_of_public() {
        let table = CapabilityTable::standard();
        let admin = visible_menu(&standard_menu(), Some(Role::Admin), &table);
        let public = visible_menu(&standard_menu(), Some(Role::Public), &table);
        let admin_paths: BTreeSet<_> = admin.items().map(|i| i.path.clone()).collect();
        assert!(public.items().all(|item| admin_paths.contains(&item.path)));
        assert_eq!(admin.items().count(), standard_menu().items().count());
    }

    #[test]
    fn no_role_yields_empty_menu() {
        let table = CapabilityTable::standard();
        assert!(visible_menu(&standard_menu(), None, &table).is_empty());
    }

    #[test]
    fn sections_emptied_by_custom_table_are_dropped() {
        let table = CapabilityTable::empty().grant(Role::Public, [Capability::ManageUsers]);
        let menu = visible_menu(&standard_menu(), Some(Role::Public), &table);
        assert_eq!(menu.sections.len(), 1);
        assert_eq!(menu.sections[0].title, "Admin");
        assert_eq!(labels(&menu), vec!["User Management"]);
    }

    #[test]
    fn allowed_roles_follow_the_table() {
        let table = CapabilityTable::standard();
        let menu = standard_menu();
        let alerts = menu
            .items()
            .find(|item| item.path == "/responder/alerts")
            .expect("alerts item");
        assert_eq!(
            alerts.allowed_roles(&table),
            BTreeSet::from([Role::Responder, Role::Admin])
        );
    }

    #[test]
    fn root_is_active_only_on_exact_match() {
        assert!(is_active("/", "/"));
        assert!(!is_active("/", "/incidents"));
    }

    #[test]
    fn nested_paths_mark_several_items_active() {
        let menu = standard_menu();
        assert_eq!(
            active_paths(&menu, "/incidents/report"),
            vec!["/incidents/report", "/incidents"]
        );
        assert_eq!(active_paths(&menu, "/incidents/42"), vec!["/incidents"]);
    }

    #[test]
    fn routes_render_paths() {
        assert_eq!(Route::Landing.path(), "/");
        assert_eq!(Route::IncidentDetail("abc".into()).path(), "/incidents/abc");
    }
}
