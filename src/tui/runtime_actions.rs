use tracing::info;

use crate::alert::{AlertSink, IdleAlert, WebhookNotifier};
use crate::context::AppContext;
use crate::remote::{attach_ssh_args, shell_ssh_args};

use super::runtime_sessions::{SessionCommand, SessionCommandWorker, start_session_command};
use super::{AppModel, FollowUp, UiAction};

/// Applies one queued UI action to the shared workspace. Remote mutations are handed to the
/// session command worker; attach and shell handoffs are returned for the runtime to execute
/// with the terminal released.
pub(super) fn apply_action(
    model: &mut AppModel,
    context: &AppContext,
    commands: &mut SessionCommandWorker,
    action: UiAction,
) -> FollowUp {
    match action {
        UiAction::Refresh => FollowUp::Refresh,
        UiAction::Attach(key) => {
            info!(%key, "attaching");
            FollowUp::Handoff(attach_ssh_args(&key.node, &key.session))
        }
        UiAction::OpenShell { node } => {
            info!(node, "opening shell");
            FollowUp::Handoff(shell_ssh_args(&node))
        }
        UiAction::SetNote { key, text } => {
            let cleared = text.trim().is_empty();
            match context.set_note(key.clone(), &text) {
                Ok(()) if cleared => model.set_status_message(format!("note cleared for {key}")),
                Ok(()) => model.set_status_message(format!("note saved for {key}")),
                Err(err) => model.set_status_message(err),
            }
            FollowUp::None
        }
        UiAction::DeleteNote(key) => {
            if context.delete_note(&key) {
                model.set_status_message(format!("note deleted for {key}"));
            }
            FollowUp::None
        }
        UiAction::Watch { key, minutes } => {
            match context.watch(key.clone(), &minutes) {
                Ok(threshold) => model.set_status_message(format!(
                    "watching {key}, alert after {} min idle",
                    threshold / 60
                )),
                Err(err) => model.set_status_message(format!("cannot watch {key}: {err}")),
            }
            FollowUp::None
        }
        UiAction::Unwatch(key) => {
            if context.unwatch(&key) {
                model.set_status_message(format!("stopped watching {key}"));
            }
            FollowUp::None
        }
        UiAction::CreateSession { node, name } => start_session_command(
            model,
            context,
            commands,
            SessionCommand::Create { node, name },
        ),
        UiAction::KillSession(key) => {
            start_session_command(model, context, commands, SessionCommand::Kill(key))
        }
        UiAction::SaveSettings(config) => {
            match context.update_config(config) {
                Ok(()) => model.set_status_message("settings saved"),
                Err(err) => model.set_status_message(format!("failed to save settings: {err}")),
            }
            FollowUp::None
        }
        UiAction::ClearErrors => {
            context.clear_error_log();
            model.set_status_message("error log cleared");
            FollowUp::None
        }
    }
}

/// Alert sink that reads the webhook from the current config on every alert, so settings
/// edits apply without restarting the refresh coordinator.
pub(super) struct ConfiguredWebhook {
    context: AppContext,
}

impl ConfiguredWebhook {
    pub(super) fn new(context: AppContext) -> Self {
        Self { context }
    }
}

impl AlertSink for ConfiguredWebhook {
    fn notify(&self, alert: &IdleAlert) -> Result<(), String> {
        let config = self.context.config();
        WebhookNotifier::new(config.webhook(), config.webhook_timeout()).notify(alert)
    }
}
