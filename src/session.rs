// src/session.rs
//! Session shell: who is signed in, and what they may reach.

use serde::Serialize;
use validator::Validate;

use crate::api::LabApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, RegistrationForm, User};
use crate::navigation::{resolve_navigation, Navigation, Platform, Screen};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated { showing_register: bool },
    Authenticated { user: User },
    /// Signed in with a role that maps to no screens. Only logout leaves this state.
    Denied { role: String },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated { showing_register: false }
    }
}

/// Explicit session context. The only mutable state of the shell lives here.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// Id of the signed-in user; a precondition for personal reports.
    pub fn current_user_id(&self) -> ClientResult<i64> {
        let user = self.current_user().ok_or_else(ClientError::not_authenticated)?;
        user.id.ok_or_else(ClientError::missing_user_id)
    }

    /// Flips between the login and registration views. No-op once signed in.
    pub fn toggle_register(&mut self) -> bool {
        if let SessionState::Unauthenticated { showing_register } = &mut self.state {
            *showing_register = !*showing_register;
            true
        } else {
            false
        }
    }

    pub async fn login<A>(&mut self, api: &A, credentials: &Credentials) -> ClientResult<&SessionState>
    where
        A: LabApi + ?Sized,
    {
        if !matches!(self.state, SessionState::Unauthenticated { .. }) {
            return Err(ClientError::Precondition("A user is already signed in".to_string()));
        }
        credentials.validate()?;

        match api.login(credentials).await {
            Ok(user) => {
                self.complete_login(user);
                Ok(&self.state)
            }
            Err(err) => {
                tracing::warn!(email = %credentials.email, error = %err, "login rejected");
                Err(err)
            }
        }
    }

    /// Enters the authenticated state, or the denied state when the role has no screens.
    pub(crate) fn complete_login(&mut self, user: User) {
        let navigation = resolve_navigation(&user.role, Platform::Mobile);
        self.state = if navigation.is_denied() {
            SessionState::Denied { role: user.role }
        } else {
            tracing::info!(user_id = ?user.id, role = %user.role, "user signed in");
            SessionState::Authenticated { user }
        };
    }

    /// Registers a new account and returns to the login view on success.
    pub async fn register<A>(&mut self, api: &A, form: &RegistrationForm) -> ClientResult<User>
    where
        A: LabApi + ?Sized,
    {
        if !matches!(self.state, SessionState::Unauthenticated { .. }) {
            return Err(ClientError::Precondition("Sign out before registering a new account".to_string()));
        }
        form.validate()?;

        let user = api.register(form).await?;
        tracing::info!(email = %form.email, "account registered");
        self.state = SessionState::Unauthenticated { showing_register: false };
        Ok(user)
    }

    /// Drops the user and every bit of navigation derived from it.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user() {
            tracing::info!(user_id = ?user.id, "user signed out");
        }
        self.state = SessionState::default();
    }

    pub fn navigation(&self, platform: Platform) -> Navigation {
        match &self.state {
            SessionState::Unauthenticated { showing_register } => Navigation::Auth {
                screen: if *showing_register { Screen::Register } else { Screen::Login },
            },
            SessionState::Authenticated { user } => resolve_navigation(&user.role, platform),
            SessionState::Denied { role } => Navigation::Denied { role: role.clone() },
        }
    }

    /// Checks that `screen` is reachable before it is mounted.
    pub fn authorize(&self, screen: Screen, platform: Platform) -> ClientResult<()> {
        let navigation = self.navigation(platform);
        if navigation.can_reach(screen) {
            return Ok(());
        }
        match navigation {
            Navigation::Denied { role } => Err(ClientError::invalid_role(&role)),
            _ => Err(ClientError::screen_forbidden(screen.as_ref())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::*;
    use async_trait::async_trait;

    /// Backend double: accepts one password and echoes a user with `role`.
    pub(crate) struct FakeAuthApi {
        pub role: String,
    }

    fn user_with_role(role: &str) -> User {
        User {
            id: Some(1),
            first_name: "Ana".to_string(),
            last_name: "Rojas".to_string(),
            email: "ana@usb.edu".to_string(),
            national_id: None,
            role: role.to_string(),
            registered_at: None,
        }
    }

    #[async_trait]
    impl LabApi for FakeAuthApi {
        async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
            if credentials.password == "secreto" {
                Ok(user_with_role(&self.role))
            } else {
                Err(ClientError::Backend {
                    status: 401,
                    message: "Credenciales incorrectas".to_string(),
                })
            }
        }

        async fn register(&self, form: &RegistrationForm) -> ClientResult<User> {
            Ok(user_with_role(form.tipo_usuario.as_str()))
        }

        async fn users(&self) -> ClientResult<Vec<User>> { Ok(Vec::new()) }
        async fn laboratories(&self) -> ClientResult<Vec<Laboratory>> { Ok(Vec::new()) }
        async fn equipment(&self) -> ClientResult<Vec<Equipment>> { Ok(Vec::new()) }
        async fn categories(&self) -> ClientResult<Vec<EquipmentCategory>> { Ok(Vec::new()) }
        async fn loans(&self) -> ClientResult<Vec<Loan>> { Ok(Vec::new()) }
        async fn reservations(&self) -> ClientResult<Vec<LabReservation>> { Ok(Vec::new()) }
        async fn maintenance(&self) -> ClientResult<Vec<MaintenanceRecord>> { Ok(Vec::new()) }

        async fn user_loan_report(&self, _user_id: i64) -> ClientResult<LoanActivityReport> {
            Ok(LoanActivityReport::default())
        }

        async fn user_lab_report(&self, _user_id: i64) -> ClientResult<UserLabReport> {
            Ok(UserLabReport::default())
        }
    }

    fn good() -> Credentials {
        Credentials::new("ana@usb.edu", "secreto")
    }

    #[tokio::test]
    async fn test_logout_revokes_admin_dashboard() {
        let api = FakeAuthApi { role: "admin".to_string() };
        let mut session = Session::new();

        session.login(&api, &good()).await.unwrap();
        assert!(session.authorize(Screen::AdminDashboard, Platform::Web).is_ok());

        session.logout();
        assert_eq!(session.state(), &SessionState::Unauthenticated { showing_register: false });
        for platform in [Platform::Web, Platform::Mobile] {
            assert!(session.authorize(Screen::AdminDashboard, platform).is_err());
            assert_eq!(session.navigation(platform), Navigation::Auth { screen: Screen::Login });
        }
        assert!(matches!(session.current_user_id(), Err(ClientError::Precondition(_))));
    }

    #[tokio::test]
    async fn test_failed_login_stays_unauthenticated() {
        let api = FakeAuthApi { role: "admin".to_string() };
        let mut session = Session::new();

        let err = session.login(&api, &Credentials::new("ana@usb.edu", "mal")).await.unwrap_err();
        assert_eq!(err.to_alert("sign in").message, "Could not sign in: Credenciales incorrectas");
        assert_eq!(session.state(), &SessionState::default());

        let err = session.login(&api, &Credentials::new("not-an-email", "secreto")).await.unwrap_err();
        assert!(matches!(err, ClientError::ValidationError(_)));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_unknown_role_lands_in_denied() {
        let api = FakeAuthApi { role: "visitante".to_string() };
        let mut session = Session::new();

        let state = session.login(&api, &good()).await.unwrap();
        assert_eq!(state, &SessionState::Denied { role: "visitante".to_string() });
        assert_eq!(session.navigation(Platform::Web).reachable(), Vec::<Screen>::new());

        let err = session.authorize(Screen::Home, Platform::Mobile).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRole(ref r) if r == "visitante"));

        // Denied only leaves through logout.
        assert!(!session.toggle_register());
        assert!(session.login(&api, &good()).await.is_err());
        session.logout();
        assert_eq!(session.state(), &SessionState::default());
    }

    #[tokio::test]
    async fn test_mis_cased_admin_role_is_denied() {
        for role in ["ADMIN", "Admin", " admin "] {
            let api = FakeAuthApi { role: role.to_string() };
            let mut session = Session::new();

            let state = session.login(&api, &good()).await.unwrap();
            assert_eq!(state, &SessionState::Denied { role: role.to_string() });
            let err = session.authorize(Screen::AdminDashboard, Platform::Web).unwrap_err();
            assert!(matches!(err, ClientError::InvalidRole(_)));
            assert!(session.authorize(Screen::UserManagement, Platform::Mobile).is_err());
        }
    }

    #[tokio::test]
    async fn test_register_returns_to_login() {
        let api = FakeAuthApi { role: "estudiante".to_string() };
        let mut session = Session::new();

        assert!(session.toggle_register());
        assert_eq!(session.navigation(Platform::Mobile), Navigation::Auth { screen: Screen::Register });

        let form = RegistrationForm {
            nombre: "Luis".to_string(),
            apellido: "Vargas".to_string(),
            email: "luis@usb.edu".to_string(),
            password: "secreto1".to_string(),
            numero_identificacion: "8812".to_string(),
            tipo_usuario: UserRole::Staff,
        };
        let user = session.register(&api, &form).await.unwrap();
        assert_eq!(user.parsed_role(), Some(UserRole::Staff));
        assert_eq!(session.state(), &SessionState::Unauthenticated { showing_register: false });
    }

    #[test]
    fn test_toggle_register_round_trip() {
        let mut session = Session::new();
        session.toggle_register();
        session.toggle_register();
        assert_eq!(session.state(), &SessionState::Unauthenticated { showing_register: false });
    }

    #[test]
    fn test_staff_cannot_open_user_management() {
        let mut session = Session::new();
        session.complete_login(user_with_role("personal"));
        assert_eq!(session.current_user_id().unwrap(), 1);
        assert!(session.authorize(Screen::EquipmentManagement, Platform::Web).is_ok());
        let err = session.authorize(Screen::UserManagement, Platform::Web).unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
    }

    #[test]
    fn test_missing_user_id_is_a_precondition_failure() {
        let mut session = Session::new();
        session.complete_login(User { id: None, ..user_with_role("profesor") });
        let err = session.current_user_id().unwrap_err();
        assert_eq!(err.to_string(), "Precondition Failed: No authenticated user id available");
    }
}
