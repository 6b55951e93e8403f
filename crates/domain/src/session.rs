//! Session collaborator contract
//!
//! The session is owned by the caller (a web framework's session store, a
//! CLI's in-memory state, ...). The client only reads and writes the fields
//! below and destroys the session on logout.

use uuid::Uuid;

use crate::types::User;

/// Mutable per-user session the client operates on
///
/// Implementations must keep the code verifier namespaced to this session;
/// it is never shared across sessions.
pub trait Session: Send {
    /// Opaque session identifier, passed to the change callback
    fn id(&self) -> &str;

    /// Authenticated user, if any
    fn user(&self) -> Option<&User>;

    /// Mutable access to the authenticated user
    fn user_mut(&mut self) -> Option<&mut User>;

    /// Replace (or clear) the authenticated user
    fn set_user(&mut self, user: Option<User>);

    /// PKCE verifier of the in-flight authorization attempt
    fn code_verifier(&self) -> Option<&str>;

    /// Store (or clear) the PKCE verifier
    fn set_code_verifier(&mut self, verifier: Option<String>);

    /// Remove and return the PKCE verifier
    fn take_code_verifier(&mut self) -> Option<String>;

    /// Destroy the session in its backing store
    fn destroy(&mut self);

    /// Whether `destroy` has been called
    fn is_destroyed(&self) -> bool;
}

/// In-memory [`Session`] implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySession {
    id: String,
    user: Option<User>,
    code_verifier: Option<String>,
    destroyed: bool,
}

impl MemorySession {
    /// Create an empty session with a random identifier
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create an empty session with a caller-chosen identifier
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Builder-style helper to seed an authenticated user
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

impl Session for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn user_mut(&mut self) -> Option<&mut User> {
        self.user.as_mut()
    }

    fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    fn code_verifier(&self) -> Option<&str> {
        self.code_verifier.as_deref()
    }

    fn set_code_verifier(&mut self, verifier: Option<String>) {
        self.code_verifier = verifier;
    }

    fn take_code_verifier(&mut self) -> Option<String> {
        self.code_verifier.take()
    }

    fn destroy(&mut self) {
        self.user = None;
        self.code_verifier = None;
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
