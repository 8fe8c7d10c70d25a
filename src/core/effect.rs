//! Performs an [`Effect`] against the backend and turns the outcome back
//! into an [`Action`]. This is the only place core code awaits the network.

use log::debug;

use crate::api::Backend;
use crate::core::action::{Action, Effect};

/// `None` for effects that have nothing to report (`None`, `Quit`).
pub async fn perform(effect: Effect, backend: &dyn Backend) -> Option<Action> {
    match effect {
        Effect::None | Effect::Quit => None,
        Effect::FetchListing { token, request } => {
            debug!("perform: list {:?} (ticket {})", request.folder_id, request.ticket);
            let result = backend
                .list_files(&token, request.folder_id.as_deref())
                .await;
            Some(Action::ListingLoaded {
                ticket: request.ticket,
                result,
            })
        }
        Effect::SendMessage { token, turn } => {
            debug!("perform: send turn {}", turn.ticket);
            let result = backend.send_message(&token, &turn.request).await;
            Some(Action::ReplyReceived {
                ticket: turn.ticket,
                result,
            })
        }
        Effect::FetchLoginUrl { redirect_uri } => {
            Some(Action::LoginUrlReady(backend.login_url(&redirect_uri).await))
        }
        Effect::ExchangeCode { code, redirect_uri } => Some(Action::ExchangeFinished(
            backend.exchange_code(&code, &redirect_uri).await,
        )),
    }
}
