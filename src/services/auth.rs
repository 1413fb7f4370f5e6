//! Authentication service implementation
//!
//! This service handles login against argon2 password hashes, role-based
//! permission checks and the admin-side user management operations.

use std::collections::HashSet;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, info, warn};

use crate::config::BootstrapAdminConfig;
use crate::database::repositories::UserRepository;
use crate::models::user::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::models::event::Event;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username};
use crate::utils::logging::log_admin_action;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create, edit, deactivate users
    ManageUsers,
    /// Approve or reject pending events
    ReviewEvents,
    /// See events in every status
    ViewAllEvents,
    /// Create events and manage their tickets and messages
    ManageOwnEvents,
    /// Register for approved events and cancel own registrations
    RegisterForEvents,
}

impl Permission {
    pub fn granted_to(role: Role) -> HashSet<Permission> {
        let granted: &[Permission] = match role {
            Role::Admin => &[Permission::ManageUsers, Permission::ReviewEvents, Permission::ViewAllEvents],
            Role::Organizer => &[Permission::ManageOwnEvents],
            Role::Attendee => &[Permission::RegisterForEvents],
        };
        granted.iter().copied().collect()
    }
}

/// Authenticated user with the permissions of their role
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub permissions: HashSet<Permission>,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        let permissions = Permission::granted_to(user.role);
        Self { user, permissions }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Require specific permission or return error
    pub fn require_permission(&self, permission: Permission) -> Result<()> {
        if !self.has_permission(permission) {
            return Err(EventDeskError::PermissionDenied(format!(
                "User {} ({}) lacks required permission: {:?}",
                self.user.user_id, self.user.role, permission
            )));
        }
        Ok(())
    }

    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.user.role != role {
            return Err(EventDeskError::PermissionDenied(format!(
                "User {} is {} but {} is required",
                self.user.user_id, self.user.role, role
            )));
        }
        Ok(())
    }

    /// Organizers manage only the events they own
    pub fn can_manage_event(&self, event: &Event) -> bool {
        self.has_permission(Permission::ManageOwnEvents) && event.organizer_id == self.user.user_id
    }

    pub fn require_event_owner(&self, event: &Event) -> Result<()> {
        if !self.can_manage_event(event) {
            return Err(EventDeskError::PermissionDenied(format!(
                "User {} does not organize event {}",
                self.user.user_id, event.event_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Log in with username and password
    ///
    /// Unknown users, deactivated users and wrong passwords all fail with the
    /// same `Authentication` error.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthContext> {
        debug!(username = username, "Authenticating user");

        let user = match self.users.find_active_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = username, "Login attempt for unknown or inactive user");
                return Err(Self::invalid_credentials());
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.user_id, "Login attempt with wrong password");
            return Err(Self::invalid_credentials());
        }

        info!(user_id = user.user_id, role = %user.role, "User logged in");
        Ok(AuthContext::new(user))
    }

    /// Create a user; only admins may do this
    pub async fn create_user(&self, actor: &AuthContext, request: CreateUserRequest) -> Result<User> {
        actor.require_permission(Permission::ManageUsers)?;
        let user = self.create_user_unchecked(request).await?;

        log_admin_action(actor.user.user_id, "create_user", Some(&user.username), Some(user.role.as_str()));
        Ok(user)
    }

    /// Create a user without an acting admin; used to seed the first account
    pub async fn create_user_unchecked(&self, request: CreateUserRequest) -> Result<User> {
        validate_new_user(&request)?;
        let password_hash = hash_password(&request.password)?;

        self.users
            .create(&request.username, &password_hash, &request.email, &request.full_name, request.role)
            .await
    }

    /// Ensure an admin account exists, creating it when the users table has none
    pub async fn ensure_admin(&self, request: CreateUserRequest) -> Result<Option<User>> {
        if !self.users.list_by_role(Role::Admin).await?.is_empty() {
            return Ok(None);
        }

        let request = CreateUserRequest { role: Role::Admin, ..request };
        let user = self.create_user_unchecked(request).await?;
        info!(user_id = user.user_id, username = %user.username, "Bootstrap admin created");
        Ok(Some(user))
    }

    /// Create the configured first admin; a no-op without a configured password
    pub async fn bootstrap_admin(&self, config: &BootstrapAdminConfig) -> Result<Option<User>> {
        let Some(password) = config.password.clone() else {
            debug!("No bootstrap admin password configured");
            return Ok(None);
        };

        self.ensure_admin(CreateUserRequest {
            username: config.username.clone(),
            password,
            email: config.email.clone(),
            full_name: config.full_name.clone(),
            role: Role::Admin,
        })
        .await
    }

    pub async fn update_user(&self, actor: &AuthContext, user_id: i64, request: UpdateUserRequest) -> Result<User> {
        actor.require_permission(Permission::ManageUsers)?;
        if let Some(email) = request.email.as_deref() {
            if !is_valid_email(email) {
                return Err(EventDeskError::InvalidInput(format!("Invalid email address: {}", email)));
            }
        }

        let deactivating = request.is_active == Some(false);
        if deactivating && actor.user.user_id == user_id {
            return Err(EventDeskError::InvalidInput("Admins cannot deactivate their own account".to_string()));
        }

        let target = self.find_user(user_id).await?;
        let demoting = request.role.is_some_and(|role| role != Role::Admin);
        if target.role == Role::Admin && target.is_active && (deactivating || demoting) {
            let admins = self.users.list_by_role(Role::Admin).await?;
            if admins.len() <= 1 {
                return Err(EventDeskError::InvalidInput("The last admin cannot be demoted or deactivated".to_string()));
            }
        }

        let user = self.users.update(user_id, request).await?;
        log_admin_action(actor.user.user_id, "update_user", Some(&user.username), None);
        Ok(user)
    }

    /// Soft delete: the user can no longer log in or register
    pub async fn deactivate_user(&self, actor: &AuthContext, user_id: i64) -> Result<()> {
        actor.require_permission(Permission::ManageUsers)?;
        if actor.user.user_id == user_id {
            return Err(EventDeskError::InvalidInput("Admins cannot deactivate their own account".to_string()));
        }

        self.users.deactivate(user_id).await?;
        log_admin_action(actor.user.user_id, "deactivate_user", Some(&user_id.to_string()), None);
        Ok(())
    }

    pub async fn find_user(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(EventDeskError::UserNotFound { user_id })
    }

    pub async fn list_users(&self, actor: &AuthContext) -> Result<Vec<User>> {
        actor.require_permission(Permission::ManageUsers)?;
        self.users.list_active().await
    }

    pub async fn list_users_by_role(&self, actor: &AuthContext, role: Role) -> Result<Vec<User>> {
        actor.require_permission(Permission::ManageUsers)?;
        self.users.list_by_role(role).await
    }

    fn invalid_credentials() -> EventDeskError {
        EventDeskError::Authentication("Invalid username or password".to_string())
    }
}

fn validate_new_user(request: &CreateUserRequest) -> Result<()> {
    if !is_valid_username(&request.username) {
        return Err(EventDeskError::InvalidInput(format!("Invalid username: {}", request.username)));
    }
    if !is_valid_email(&request.email) {
        return Err(EventDeskError::InvalidInput(format!("Invalid email address: {}", request.email)));
    }
    if request.full_name.trim().is_empty() {
        return Err(EventDeskError::InvalidInput("Full name cannot be empty".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(EventDeskError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EventDeskError::Authentication(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| EventDeskError::Authentication(format!("Stored password hash is malformed: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
