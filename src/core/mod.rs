//! # Core Application Logic
//!
//! This module contains ragchat's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • App (routes, state)  │
//!                    │  • Action / Effect      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::SpawnRequest
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │ ── Action::Completed ──▶ │ generation │
//!     │  Adapter   │ ◀─────────────────────── │   client   │
//!     │ (ratatui)  │                          │ (reqwest)  │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, which owns the route and the open session
//! - [`session`]: The active conversation controller and its reducer
//! - [`exchange`]: Query/response pairs and the message log
//! - [`route`]: Paths and active-entry matching
//! - [`history`]: Conversation summaries for the sidebar
//! - [`config`]: Config file, env and CLI resolution

pub mod config;
pub mod exchange;
pub mod history;
pub mod route;
pub mod session;
pub mod state;
