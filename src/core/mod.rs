//! # Core Application Logic
//!
//! This module contains Docent's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • perform() (effects)  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    CLI     │      │   tests    │
//!     │  (ratatui) │      │ subcommands│      │  (Driver)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`effect`]: Runs an `Effect` against the backend
//! - [`driver`]: Sequential update/perform loop
//! - [`browser`], [`selection`], [`conversation`], [`chat`]: session components
//! - [`auth`], [`store`], [`credentials`]: sign-in and persistence
//! - [`config`]: layered settings

pub mod action;
pub mod auth;
pub mod browser;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod driver;
pub mod effect;
pub mod error;
pub mod selection;
pub mod state;
pub mod store;

pub use action::{Action, Effect, update};
pub use error::SessionError;
pub use state::App;
