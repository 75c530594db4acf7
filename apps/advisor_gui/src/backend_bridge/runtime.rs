//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{PredictionClient, Settings};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::{FeedbackRecord, Observation};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.try_send(event).is_err() {
        tracing::warn!("ui event queue unavailable; dropping backend event");
    }
}

/// Starts the worker thread. Commands are handled one at a time, so a
/// prediction cycle always finishes before the next command is read.
pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client = match PredictionClient::from_settings(&settings) {
            Ok(client) => client,
            Err(err) => {
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_client_error(
                        UiErrorContext::BackendStartup,
                        &err,
                    )),
                );
                tracing::error!("failed to build prediction client: {err}");
                return;
            }
        };
        tracing::info!(base_url = client.base_url(), "backend worker ready");
        emit(
            &ui_tx,
            UiEvent::Info(format!("Servis: {}", client.base_url())),
        );

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Predict { observation } => {
                        run_prediction(&client, observation, &ui_tx).await;
                    }
                    BackendCommand::SendFeedback { record } => {
                        run_feedback(&client, &record, &ui_tx).await;
                    }
                }
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

async fn run_prediction(
    client: &PredictionClient,
    observation: Observation,
    ui_tx: &Sender<UiEvent>,
) {
    let observation_id = match client.submit(&observation).await {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!("submission failed: {err:?}");
            let err = UiError::from_client_error(UiErrorContext::Predict, &err);
            emit(ui_tx, UiEvent::PredictionFailed(err));
            return;
        }
    };
    emit(ui_tx, UiEvent::Queued(observation_id));

    let result = client
        .poll(observation_id, &mut |progress| {
            emit(ui_tx, UiEvent::PollAttempt(progress))
        })
        .await;

    match result {
        Ok(prediction) => emit(ui_tx, UiEvent::PredictionReady(prediction)),
        Err(err) => emit(
            ui_tx,
            UiEvent::PredictionFailed(UiError::from_client_error(UiErrorContext::Predict, &err)),
        ),
    }
}

async fn run_feedback(
    client: &PredictionClient,
    record: &FeedbackRecord,
    ui_tx: &Sender<UiEvent>,
) {
    match client.send_feedback(record).await {
        Ok(()) => emit(ui_tx, UiEvent::FeedbackSent),
        Err(err) => emit(
            ui_tx,
            UiEvent::FeedbackFailed(UiError::from_client_error(UiErrorContext::Feedback, &err)),
        ),
    }
}
