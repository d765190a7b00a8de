// Organization service - users, permissions, activity log, teams
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repositories::{
    ActivityPage, ActivityRepository, AuthProvider, PageRequest, TeamRepository, UserRepository,
};
use crate::domain::activity::ActivityEntry;
use crate::domain::permission::{PermissionMode, PermissionSet};
use crate::domain::team::Team;
use crate::domain::user::{is_valid_pin, Role, User};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub branch_id: Option<String>,
    pub team_id: Option<String>,
    pub pin: String,
}

/// Partial account update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<String>,
    pub team_id: Option<String>,
    pub is_active: Option<bool>,
    pub pin: Option<String>,
}

/// The permission payload exposed over the API: the mode switch plus the
/// effective grants (role-derived or fully custom, never merged).
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionsView {
    pub permission_mode: PermissionMode,
    pub role: Role,
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone, Default)]
pub struct PermissionsPatch {
    pub permission_mode: Option<PermissionMode>,
    pub permissions: Option<PermissionSet>,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub branch_id: String,
    pub leader_id: Option<String>,
}

#[derive(Clone)]
pub struct OrgService {
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    activity: Arc<dyn ActivityRepository>,
    auth: Arc<dyn AuthProvider>,
}

impl OrgService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        activity: Arc<dyn ActivityRepository>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            users,
            teams,
            activity,
            auth,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.list().await?)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.users
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    /// Create an account. The PIN is validated here, then exchanged for
    /// synthetic credentials at the auth provider before the user row is
    /// written, so a provider failure leaves no orphaned user.
    pub async fn create_user(&self, new: NewUser) -> Result<User, ServiceError> {
        if new.username.trim().is_empty() {
            return Err(ServiceError::validation("username is required"));
        }
        if !is_valid_pin(&new.pin) {
            return Err(ServiceError::validation("PIN must be exactly 4 digits"));
        }
        if self.users.get_by_username(&new.username).await?.is_some() {
            return Err(ServiceError::validation("username is already taken"));
        }

        self.auth.create_account(&new.username, &new.pin).await?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            display_name: new.display_name,
            role: new.role,
            branch_id: new.branch_id,
            team_id: new.team_id,
            permission_mode: PermissionMode::RoleOnly,
            custom_permissions: PermissionSet::empty(),
            memo: String::new(),
            is_active: true,
            created_at: Utc::now(),
        };
        let user = self.users.insert(user).await?;
        self.record_activity(&user.id, "user_created", None).await;
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<User, ServiceError> {
        let mut user = self.get_user(id).await?;

        if let Some(pin) = &update.pin {
            if !is_valid_pin(pin) {
                return Err(ServiceError::validation("PIN must be exactly 4 digits"));
            }
            self.auth.update_password(&user.username, pin).await?;
        }
        if let Some(display_name) = update.display_name {
            user.display_name = display_name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(branch_id) = update.branch_id {
            user.branch_id = Some(branch_id);
        }
        if let Some(team_id) = update.team_id {
            user.team_id = Some(team_id);
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }

        let user = self.users.update(user).await?;
        self.record_activity(&user.id, "user_updated", None).await;
        Ok(user)
    }

    pub async fn permissions(&self, id: &str) -> Result<PermissionsView, ServiceError> {
        let user = self.get_user(id).await?;
        Ok(PermissionsView {
            permission_mode: user.permission_mode,
            role: user.role,
            permissions: user.effective_permissions(),
        })
    }

    /// Patch the permission mode and/or the custom set. Supplying a
    /// custom set implies custom mode unless the patch says otherwise.
    pub async fn update_permissions(
        &self,
        id: &str,
        patch: PermissionsPatch,
    ) -> Result<PermissionsView, ServiceError> {
        let mut user = self.get_user(id).await?;

        if let Some(permissions) = patch.permissions {
            user.custom_permissions = permissions;
            user.permission_mode = PermissionMode::CustomOnly;
        }
        if let Some(mode) = patch.permission_mode {
            user.permission_mode = mode;
        }

        let user = self.users.update(user).await?;
        self.record_activity(&user.id, "permissions_updated", None)
            .await;
        Ok(PermissionsView {
            permission_mode: user.permission_mode,
            role: user.role,
            permissions: user.effective_permissions(),
        })
    }

    pub async fn update_user_memo(&self, id: &str, memo: String) -> Result<User, ServiceError> {
        let mut user = self.get_user(id).await?;
        user.memo = memo;
        Ok(self.users.update(user).await?)
    }

    pub async fn append_activity(
        &self,
        user_id: &str,
        action: String,
        detail: Option<String>,
    ) -> Result<ActivityEntry, ServiceError> {
        if action.trim().is_empty() {
            return Err(ServiceError::validation("action is required"));
        }
        self.get_user(user_id).await?;

        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action,
            detail,
            created_at: Utc::now(),
        };
        self.activity.append(entry.clone()).await?;
        Ok(entry)
    }

    pub async fn activity(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<ActivityPage, ServiceError> {
        self.get_user(user_id).await?;
        let page = PageRequest {
            page: page.page.max(1),
            limit: page.limit.clamp(1, 100),
        };
        Ok(self.activity.list_page(user_id, page).await?)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, ServiceError> {
        Ok(self.teams.list().await?)
    }

    pub async fn get_team(&self, id: &str) -> Result<Team, ServiceError> {
        self.teams
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("team"))
    }

    pub async fn create_team(&self, new: NewTeam) -> Result<Team, ServiceError> {
        if new.name.trim().is_empty() {
            return Err(ServiceError::validation("team name is required"));
        }
        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            branch_id: new.branch_id,
            leader_id: new.leader_id,
            memo: String::new(),
            member_ids: Vec::new(),
        };
        Ok(self.teams.insert(team).await?)
    }

    pub async fn update_team_memo(&self, id: &str, memo: String) -> Result<Team, ServiceError> {
        let mut team = self.get_team(id).await?;
        team.memo = memo;
        Ok(self.teams.update(team).await?)
    }

    /// Move a user into a team (drag-and-drop reassignment). The user is
    /// removed from any team that currently lists them, added to the
    /// target, and the user row is updated last. No rollback on partial
    /// failure - the caller only refreshes its view after success.
    pub async fn move_member(&self, user_id: &str, to_team: &str) -> Result<Team, ServiceError> {
        let mut user = self.get_user(user_id).await?;
        let mut target = self.get_team(to_team).await?;

        for mut team in self.teams.list().await? {
            if team.id != target.id && team.remove_member(user_id) {
                self.teams.update(team).await?;
            }
        }

        target.add_member(user_id);
        let target = self.teams.update(target).await?;

        user.team_id = Some(target.id.clone());
        self.users.update(user).await?;
        self.record_activity(user_id, "team_changed", Some(target.name.clone()))
            .await;
        Ok(target)
    }

    /// Internal audit hook. Best effort - a full activity store must not
    /// fail the operation it records.
    async fn record_activity(&self, user_id: &str, action: &str, detail: Option<String>) {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            detail,
            created_at: Utc::now(),
        };
        if let Err(e) = self.activity.append(entry).await {
            tracing::warn!(user = %user_id, action, error = %e, "failed to record activity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::{Action, Resource};
    use crate::infrastructure::auth_provider::RecordingAuthProvider;
    use crate::infrastructure::memory::MemoryStore;

    fn service() -> (OrgService, Arc<MemoryStore>, Arc<RecordingAuthProvider>) {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(RecordingAuthProvider::default());
        let service = OrgService::new(store.clone(), store.clone(), store.clone(), auth.clone());
        (service, store, auth)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            display_name: username.to_uppercase(),
            role: Role::Agent,
            branch_id: None,
            team_id: None,
            pin: "1234".to_string(),
        }
    }

    #[tokio::test]
    async fn create_user_exchanges_pin_for_credentials() {
        let (service, _, auth) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();
        assert_eq!(user.permission_mode, PermissionMode::RoleOnly);
        assert_eq!(auth.created(), vec![("agent1".to_string(), "1234".to_string())]);
    }

    #[tokio::test]
    async fn create_user_rejects_bad_pin() {
        let (service, _, auth) = service();
        for pin in ["123", "12345", "12a4", ""] {
            let mut user = new_user("agent1");
            user.pin = pin.to_string();
            assert!(matches!(
                service.create_user(user).await.unwrap_err(),
                ServiceError::Validation(_)
            ));
        }
        assert!(auth.created().is_empty());
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_username() {
        let (service, _, _) = service();
        service.create_user(new_user("agent1")).await.unwrap();
        assert!(matches!(
            service.create_user(new_user("agent1")).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn pin_change_goes_through_auth_provider() {
        let (service, _, auth) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();
        service
            .update_user(
                &user.id,
                UserUpdate {
                    pin: Some("9876".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(auth.updated(), vec![("agent1".to_string(), "9876".to_string())]);
    }

    #[tokio::test]
    async fn custom_permissions_fully_replace_role() {
        let (service, _, _) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();

        // Role mode: agent sees customers
        let view = service.permissions(&user.id).await.unwrap();
        assert!(view.permissions.allows(Resource::Customers, Action::View));

        // Custom mode with a settings-only set drops the role grants
        let mut custom = PermissionSet::empty();
        custom.grant(Resource::Settings, Action::View);
        let view = service
            .update_permissions(
                &user.id,
                PermissionsPatch {
                    permission_mode: None,
                    permissions: Some(custom),
                },
            )
            .await
            .unwrap();
        assert_eq!(view.permission_mode, PermissionMode::CustomOnly);
        assert!(view.permissions.allows(Resource::Settings, Action::View));
        assert!(!view.permissions.allows(Resource::Customers, Action::View));

        // Switching back to role mode restores the role grants
        let view = service
            .update_permissions(
                &user.id,
                PermissionsPatch {
                    permission_mode: Some(PermissionMode::RoleOnly),
                    permissions: None,
                },
            )
            .await
            .unwrap();
        assert!(view.permissions.allows(Resource::Customers, Action::View));
    }

    #[tokio::test]
    async fn activity_log_appends_and_pages() {
        let (service, _, _) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();

        for i in 0..5 {
            service
                .append_activity(&user.id, format!("login_{i}"), None)
                .await
                .unwrap();
        }

        let page = service
            .activity(&user.id, PageRequest { page: 1, limit: 3 })
            .await
            .unwrap();
        assert_eq!(page.entries.len(), 3);
        // user_created + 5 appended entries
        assert_eq!(page.pagination.total, 6);
        assert_eq!(page.pagination.total_pages, 2);
        // Newest first
        assert_eq!(page.entries[0].action, "login_4");
    }

    #[tokio::test]
    async fn activity_for_unknown_user_is_not_found() {
        let (service, _, _) = service();
        assert!(matches!(
            service
                .activity("missing", PageRequest::default())
                .await
                .unwrap_err(),
            ServiceError::NotFound("user")
        ));
    }

    #[tokio::test]
    async fn move_member_reassigns_between_teams() {
        let (service, _, _) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();
        let alpha = service
            .create_team(NewTeam {
                name: "Alpha".to_string(),
                branch_id: "b1".to_string(),
                leader_id: None,
            })
            .await
            .unwrap();
        let bravo = service
            .create_team(NewTeam {
                name: "Bravo".to_string(),
                branch_id: "b1".to_string(),
                leader_id: None,
            })
            .await
            .unwrap();

        service.move_member(&user.id, &alpha.id).await.unwrap();
        let moved = service.move_member(&user.id, &bravo.id).await.unwrap();
        assert_eq!(moved.member_ids, vec![user.id.clone()]);

        let alpha = service.get_team(&alpha.id).await.unwrap();
        assert!(alpha.member_ids.is_empty());
        let user = service.get_user(&user.id).await.unwrap();
        assert_eq!(user.team_id, Some(bravo.id));
    }

    #[tokio::test]
    async fn memo_updates() {
        let (service, _, _) = service();
        let user = service.create_user(new_user("agent1")).await.unwrap();
        let updated = service
            .update_user_memo(&user.id, "prefers evening calls".to_string())
            .await
            .unwrap();
        assert_eq!(updated.memo, "prefers evening calls");

        let team = service
            .create_team(NewTeam {
                name: "Alpha".to_string(),
                branch_id: "b1".to_string(),
                leader_id: None,
            })
            .await
            .unwrap();
        let team = service
            .update_team_memo(&team.id, "new joiners".to_string())
            .await
            .unwrap();
        assert_eq!(team.memo, "new joiners");
    }
}
