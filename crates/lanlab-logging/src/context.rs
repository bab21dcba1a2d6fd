//! Session context injection
//!
//! A [`SessionContextGuard`] enters a `session` span carrying the session id
//! and mode, so every event logged while the guard lives is tagged with them.
//! The current context is also kept in thread-local storage for callers that
//! need it outside of tracing.

use std::cell::RefCell;

use tracing::span::EnteredSpan;
use uuid::Uuid;

/// Session context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContextData {
    /// Unique id for one learner session
    pub session_id: Uuid,
    /// "free" or the id of the active course
    pub mode: String,
}

thread_local! {
    static SESSION_CONTEXT: RefCell<Option<SessionContextData>> = const { RefCell::new(None) };
}

/// RAII guard for session context
///
/// Restores the previous context (if any) when dropped.
///
/// # Example
///
/// ```ignore
/// use lanlab_logging::SessionContextGuard;
///
/// let _guard = SessionContextGuard::new(uuid::Uuid::new_v4(), "basic_course");
/// tracing::info!("Device placed"); // carries session_id and mode
/// ```
pub struct SessionContextGuard {
    previous: Option<SessionContextData>,
    _span: EnteredSpan,
}

impl SessionContextGuard {
    pub fn new(session_id: Uuid, mode: impl Into<String>) -> Self {
        let data = SessionContextData {
            session_id,
            mode: mode.into(),
        };
        let span = tracing::info_span!("session", session_id = %data.session_id, mode = %data.mode).entered();
        let previous = SESSION_CONTEXT.with(|ctx| ctx.replace(Some(data)));
        Self {
            previous,
            _span: span,
        }
    }

    /// The context active on this thread, if any
    pub fn current() -> Option<SessionContextData> {
        SESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
    }
}

impl Drop for SessionContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SESSION_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = previous;
        });
    }
}
