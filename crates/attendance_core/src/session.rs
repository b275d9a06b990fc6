//! Login, logout and role gating.

use crate::error::Result;
use crate::overrides;
use crate::profile::{ProfileKey, ProfileStore};
use crate::schema::{Role, Session, User};
use tracing::{info, warn};

/// Where a caller should land when it cannot stay on the requested view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Login,
    Senator,
    Admin,
}

impl Role {
    pub fn dashboard(self) -> Dashboard {
        match self {
            Role::Senator => Dashboard::Senator,
            Role::Admin => Dashboard::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Session),
    /// No session; send the caller to the login entry point.
    Login,
    /// Signed in, but this view belongs to another role.
    Redirect(Dashboard),
}

/// Exact match on the trimmed pid and the untrimmed password. Unknown pid and
/// wrong password are indistinguishable to the caller.
pub fn validate<'a>(pid: &str, password: &str, directory: &'a [User]) -> Option<&'a User> {
    let pid = pid.trim();
    directory
        .iter()
        .find(|user| user.pid == pid && user.password == password)
}

pub fn create_session(
    store: &mut dyn ProfileStore,
    user: &User,
    now_millis: i64,
) -> Result<Session> {
    let session = Session {
        pid: user.pid.clone(),
        role: user.role,
        timestamp: now_millis,
    };
    overrides::write(store, ProfileKey::Session, &session)?;
    info!(pid = %session.pid, role = %session.role, "session created");
    Ok(session)
}

/// Validate and, on success, replace whatever session was active.
pub fn login(
    store: &mut dyn ProfileStore,
    directory: &[User],
    pid: &str,
    password: &str,
    now_millis: i64,
) -> Result<Option<Session>> {
    match validate(pid, password, directory) {
        Some(user) => create_session(store, user, now_millis).map(Some),
        None => {
            warn!(pid = %pid.trim(), "login rejected");
            Ok(None)
        }
    }
}

/// A corrupt session blob reads as signed out.
pub fn current_session(store: &dyn ProfileStore) -> Result<Option<Session>> {
    overrides::read(store, ProfileKey::Session, None)
}

pub fn logout(store: &mut dyn ProfileStore) -> Result<()> {
    if let Some(session) = current_session(store)? {
        info!(pid = %session.pid, "session cleared");
    }
    store.remove(ProfileKey::Session)
}

pub fn require_auth(store: &dyn ProfileStore, expected: Option<Role>) -> Result<Access> {
    let Some(session) = current_session(store)? else {
        return Ok(Access::Login);
    };
    match expected {
        Some(role) if role != session.role => Ok(Access::Redirect(session.role.dashboard())),
        _ => Ok(Access::Granted(session)),
    }
}
