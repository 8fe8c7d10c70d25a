//! File-store app registration, read and written on behalf of the signed-in
//! user. A rejected token signs the gate out, same as everywhere else.

use log::{info, warn};

use crate::api::{ApiError, Credentials, CredentialsBackend};
use crate::core::auth::SessionGate;
use crate::core::error::SessionError;

/// `Ok(None)` when nothing has been configured yet.
pub async fn fetch_credentials(
    gate: &mut SessionGate,
    backend: &dyn CredentialsBackend,
) -> Result<Option<Credentials>, SessionError> {
    let token = gate.token()?.to_string();
    let result = backend.get_credentials(&token).await;
    settle(gate, result)
}

pub async fn save_credentials(
    gate: &mut SessionGate,
    backend: &dyn CredentialsBackend,
    credentials: &Credentials,
) -> Result<(), SessionError> {
    if !credentials.is_configured() {
        return Err(SessionError::InvalidOperation(
            "client id, client secret and tenant id are all required",
        ));
    }
    let token = gate.token()?.to_string();
    let result = backend.save_credentials(&token, credentials).await;
    settle(gate, result)?;
    info!("Saved file-store credentials");
    Ok(())
}

fn settle<T>(gate: &mut SessionGate, result: Result<T, ApiError>) -> Result<T, SessionError> {
    result.map_err(|err| {
        if err == ApiError::Unauthorized {
            warn!("Credentials call rejected the session; signing out");
            gate.logout();
        }
        SessionError::from(err)
    })
}
