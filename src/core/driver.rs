//! Sequential runner: feeds an action through `update`, performs the
//! resulting effect, and repeats until nothing is left to do.
//!
//! The TUI performs effects on spawned tasks instead, so the screen keeps
//! redrawing while a request is in flight. The CLI subcommands and the
//! integration tests use this driver.

use std::sync::Arc;

use crate::api::Backend;
use crate::core::action::{Action, Effect, update};
use crate::core::effect::perform;
use crate::core::state::App;

pub struct Driver {
    pub app: App,
    backend: Arc<dyn Backend>,
}

impl Driver {
    pub fn new(app: App, backend: Arc<dyn Backend>) -> Self {
        Self { app, backend }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Returns `Effect::Quit` if the chain asked to quit, else `Effect::None`.
    pub async fn dispatch(&mut self, action: Action) -> Effect {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            let effect = update(&mut self.app, action);
            if effect == Effect::Quit {
                return Effect::Quit;
            }
            next = perform(effect, self.backend.as_ref()).await;
        }
        Effect::None
    }
}
