// src/navigation.rs
//! Role and platform aware navigation resolution
//!
//! Everything here is a pure function of `(role, platform)`. The platform
//! only changes the topology of the drawer; the set of reachable screens is
//! decided by the role alone.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::models::UserRole;

// ==================== SCREENS ====================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    Home,
    Calendar,
    PersonalReport,
    Support,
    UserManagement,
    LaboratoryManagement,
    EquipmentManagement,
    MaintenanceManagement,
    LoanManagement,
    ReservationManagement,
    CategoryManagement,
    AdminDashboard,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Sign in",
            Screen::Register => "Register",
            Screen::Home => "Home",
            Screen::Calendar => "Calendar",
            Screen::PersonalReport => "My lab usage",
            Screen::Support => "Support",
            Screen::UserManagement => "Users",
            Screen::LaboratoryManagement => "Laboratories",
            Screen::EquipmentManagement => "Equipment",
            Screen::MaintenanceManagement => "Maintenance",
            Screen::LoanManagement => "Loans",
            Screen::ReservationManagement => "Reservations",
            Screen::CategoryManagement => "Categories",
            Screen::AdminDashboard => "Admin dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    Mobile,
}

/// Screens each role may reach, in drawer order.
pub fn reachable_screens(role: UserRole) -> &'static [Screen] {
    use Screen::*;

    match role {
        UserRole::Student | UserRole::Professor => &[Home, Calendar, PersonalReport, Support],
        UserRole::Staff => &[Home, EquipmentManagement, MaintenanceManagement, PersonalReport, Support],
        UserRole::Admin => &[
            Home,
            Calendar,
            UserManagement,
            LaboratoryManagement,
            EquipmentManagement,
            MaintenanceManagement,
            LoanManagement,
            ReservationManagement,
            CategoryManagement,
            Support,
            PersonalReport,
            AdminDashboard,
        ],
    }
}

// ==================== LAYOUTS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabPlacement {
    Top,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabNavigator {
    pub placement: TabPlacement,
    pub tabs: Vec<Screen>,
}

/// What the drawer shows when it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    Screen(Screen),
    Tabs(TabNavigator),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerLayout {
    pub role: UserRole,
    pub platform: Platform,
    pub landing: Landing,
    /// Every reachable screen in drawer order, including those behind the landing tabs.
    pub screens: Vec<Screen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Navigation {
    /// Signed out: only the login or register view is mounted.
    Auth { screen: Screen },
    Drawer(DrawerLayout),
    /// The user's role has no screens; rendered as an explicit denial naming the role.
    Denied { role: String },
}

impl Navigation {
    pub fn reachable(&self) -> Vec<Screen> {
        match self {
            Navigation::Auth { .. } => vec![Screen::Login, Screen::Register],
            Navigation::Drawer(layout) => layout.screens.clone(),
            Navigation::Denied { .. } => Vec::new(),
        }
    }

    pub fn can_reach(&self, screen: Screen) -> bool {
        match self {
            Navigation::Auth { .. } => matches!(screen, Screen::Login | Screen::Register),
            Navigation::Drawer(layout) => layout.screens.contains(&screen),
            Navigation::Denied { .. } => false,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Navigation::Denied { .. })
    }

    pub fn denial_message(&self) -> Option<String> {
        match self {
            Navigation::Denied { role } => Some(format!("Access denied: invalid role '{}'", role)),
            _ => None,
        }
    }
}

pub fn drawer_for(role: UserRole, platform: Platform) -> DrawerLayout {
    let screens = reachable_screens(role).to_vec();

    let landing = match platform {
        Platform::Mobile => Landing::Screen(Screen::Home),
        Platform::Web => {
            // Calendar only joins the tabs for roles that may reach it.
            let tabs = [Screen::Home, Screen::Calendar]
                .into_iter()
                .filter(|s| screens.contains(s))
                .collect();
            Landing::Tabs(TabNavigator {
                placement: TabPlacement::Top,
                tabs,
            })
        }
    };

    DrawerLayout {
        role,
        platform,
        landing,
        screens,
    }
}

/// Resolves the navigation of a signed-in user from the raw backend role value.
pub fn resolve_navigation(role_value: &str, platform: Platform) -> Navigation {
    match UserRole::from_wire(role_value) {
        Some(role) if !reachable_screens(role).is_empty() => Navigation::Drawer(drawer_for(role, platform)),
        _ => {
            tracing::warn!(role = role_value, "no navigation for role; denying access");
            Navigation::Denied {
                role: role_value.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use strum::IntoEnumIterator;

    fn reachable_set(role: &str, platform: Platform) -> BTreeSet<Screen> {
        resolve_navigation(role, platform).reachable().into_iter().collect()
    }

    #[test]
    fn test_every_known_role_has_screens() {
        for role in UserRole::all_values() {
            for platform in Platform::iter() {
                let nav = resolve_navigation(role, platform);
                assert!(!nav.is_denied(), "{} on {}", role, platform);
                assert!(!nav.reachable().is_empty());
            }
        }
    }

    #[test]
    fn test_unknown_role_is_denied() {
        for role in ["", "visitante", "staff", "root"] {
            let nav = resolve_navigation(role, Platform::Web);
            assert!(nav.reachable().is_empty());
            assert_eq!(nav, Navigation::Denied { role: role.to_string() });
        }
        let nav = resolve_navigation("visitante", Platform::Mobile);
        assert_eq!(nav.denial_message().unwrap(), "Access denied: invalid role 'visitante'");
    }

    #[test]
    fn test_role_matching_is_exact() {
        for role in ["ADMIN", "Admin", " admin", "admin ", " admin ", "Estudiante"] {
            for platform in Platform::iter() {
                let nav = resolve_navigation(role, platform);
                assert!(nav.reachable().is_empty(), "{:?} on {}", role, platform);
                assert!(!nav.can_reach(Screen::AdminDashboard));
                assert_eq!(nav, Navigation::Denied { role: role.to_string() });
            }
        }
    }

    #[test]
    fn test_platform_never_changes_authorization() {
        for role in UserRole::all_values() {
            assert_eq!(reachable_set(role, Platform::Web), reachable_set(role, Platform::Mobile));
        }
    }

    #[test]
    fn test_staff_screens() {
        for platform in Platform::iter() {
            let nav = resolve_navigation("personal", platform);
            assert!(nav.can_reach(Screen::EquipmentManagement));
            assert!(nav.can_reach(Screen::MaintenanceManagement));
            assert!(!nav.can_reach(Screen::UserManagement));
            assert!(!nav.can_reach(Screen::Calendar));
            assert!(!nav.can_reach(Screen::AdminDashboard));
        }
    }

    #[test]
    fn test_student_and_professor_share_screens() {
        assert_eq!(reachable_screens(UserRole::Student), reachable_screens(UserRole::Professor));
        assert_eq!(
            reachable_screens(UserRole::Student),
            &[Screen::Home, Screen::Calendar, Screen::PersonalReport, Screen::Support]
        );
    }

    #[test]
    fn test_admin_reaches_everything_but_auth_views() {
        let nav = resolve_navigation("admin", Platform::Mobile);
        for screen in Screen::iter() {
            let expected = !matches!(screen, Screen::Login | Screen::Register);
            assert_eq!(nav.can_reach(screen), expected, "{}", screen);
        }
    }

    #[test]
    fn test_web_nests_top_tabs() {
        let layout = drawer_for(UserRole::Admin, Platform::Web);
        assert_eq!(
            layout.landing,
            Landing::Tabs(TabNavigator {
                placement: TabPlacement::Top,
                tabs: vec![Screen::Home, Screen::Calendar],
            })
        );

        let staff = drawer_for(UserRole::Staff, Platform::Web);
        match staff.landing {
            Landing::Tabs(tabs) => assert_eq!(tabs.tabs, vec![Screen::Home]),
            other => panic!("unexpected landing: {:?}", other),
        }

        let mobile = drawer_for(UserRole::Student, Platform::Mobile);
        assert_eq!(mobile.landing, Landing::Screen(Screen::Home));
    }

    #[test]
    fn test_screen_route_names() {
        assert_eq!(Screen::AdminDashboard.to_string(), "admin_dashboard");
        assert_eq!("personal_report".parse::<Screen>().unwrap(), Screen::PersonalReport);
        assert_eq!(Platform::Web.as_ref(), "web");
    }
}
