//! Multi-turn dialogue state.
//!
//! ```text
//!            ┌──────────── answer / data unavailable ─────────────┐
//!            ▼                                                     │
//!  IDLE ──► COLLECTING ──► READY ──► DISPATCHED ──── not found ──► COLLECTING
//!    │          ▲   │                                 (required slots cleared)
//!    └──────────┘   └── missing / ambiguous slot: ask, stay COLLECTING
//!
//!  any non-terminal state ── idle timeout ──► EXPIRED
//! ```
//!
//! - [`DialogueSession`] holds one user's context.
//! - [`DialogueManager`] decides dispatch vs. clarification for a turn.
//! - [`SessionStore`] is the session arena with per-session serialization.
//! - [`SessionSweeper`] expires idle sessions in the background.

pub mod manager;
pub mod session;
pub mod store;
pub mod sweeper;

pub use manager::{DialogueManager, DispatchPlan};
pub use session::{DialogueSession, DialogueState, SessionId};
pub use store::SessionStore;
pub use sweeper::SessionSweeper;
