//! Interaction flows: GETPIN, CONFIRM and MESSAGE.
//!
//! Each flow snapshots the session into a request, hands it to the
//! presenter and waits on a rendezvous until the presenter (or the timeout)
//! completes it.

use crate::encoding::Response;
use crate::error::ProtocolError;
use crate::gate::CredentialGate;
use crate::ports::{Completion, ConfirmRequest, InputOutcome, InputRequest, MessageRequest, Presenter};
use crate::session::SessionState;
use crate::timeout::TimeoutController;
use std::sync::Arc;
use tracing::{debug, info};

/// Ask for a credential, using the cache when the silent path allows it.
pub async fn get_pin(
    session: &mut SessionState,
    presenter: &Arc<dyn Presenter>,
    gate: &CredentialGate,
) -> Response {
    if let Some(credential) = gate.try_silent(session).await {
        info!(key = session.key_info(), "returning cached credential");
        session.reset_after_get_pin();
        return Response::credential(&credential);
    }

    let request = InputRequest {
        title: session.window_title.clone(),
        description: session.effective_description().to_string(),
        prompt: session.prompt.clone(),
        key_info: session.key_info().to_string(),
        ok_label: session.ok_text.clone(),
        cancel_label: session.effective_cancel().to_string(),
        is_error: session.is_error(),
        allow_cache: session.allow_external_cache,
        repeat_prompt: session.repeat_prompt.clone(),
        repeat_error: session.repeat_error.clone(),
    };

    let (done, waiter) = Completion::channel();
    let mut timeout = TimeoutController::arm(
        session.timeout_seconds,
        Arc::clone(presenter),
        done.clone(),
        InputOutcome::cancelled(),
    );

    debug!(key = session.key_info(), timeout = session.timeout_seconds, "requesting input");
    presenter.request_input(request, done);
    let outcome = waiter.wait().await.unwrap_or_else(InputOutcome::cancelled);
    timeout.cancel();

    let Some(credential) = outcome.credential else {
        info!("input cancelled");
        session.reset_after_get_pin();
        return ProtocolError::Cancelled.into();
    };

    gate.remember(session, &credential, outcome.save_requested).await;
    session.reset_after_get_pin();
    Response::credential(&credential)
}

/// Ask a yes/no question.
pub async fn confirm(session: &mut SessionState, presenter: &Arc<dyn Presenter>) -> Response {
    let request = ConfirmRequest {
        title: session.window_title.clone(),
        description: session.description.clone(),
        ok_label: session.ok_text.clone(),
        cancel_label: session.effective_cancel().to_string(),
    };

    let (done, waiter) = Completion::channel();
    presenter.request_confirm(request, done);
    let confirmed = waiter.wait().await.unwrap_or(false);

    session.reset_after_confirm();
    debug!(confirmed, "confirmation answered");
    if confirmed {
        Response::Ok
    } else {
        ProtocolError::NotConfirmed.into()
    }
}

/// Show `text` and wait until the user dismisses it.
pub async fn message(session: &SessionState, presenter: &Arc<dyn Presenter>, text: String) -> Response {
    let request = MessageRequest {
        title: session.window_title.clone(),
        description: text,
        ok_label: session.ok_text.clone(),
    };

    let (done, waiter) = Completion::channel();
    presenter.request_message(request, done);
    waiter.wait().await;
    Response::Ok
}
