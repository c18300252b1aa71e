use std::sync::{Arc, Mutex, MutexGuard};

use shared::domain::{ProjectSummary, UpdateSummary, UserId};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    outputs::OutputHub,
    strings::{LocalizedKey, StringsProvider},
    SessionProvider,
};

const OUTPUT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsEmptyStateOutput {
    BackProjectButtonHidden(bool),
    LeaveACommentButtonHidden(bool),
    LoginButtonHidden(bool),
    SubtitleIsHidden(bool),
    SubtitleText(String),
    GoBackToProject,
    GoToCommentDialog,
    GoToLoginTout,
}

#[derive(Debug, Clone, Copy)]
struct Seeded {
    project: ProjectSummary,
    update: Option<UpdateSummary>,
    viewer: Option<UserId>,
}

pub struct CommentsEmptyStateController {
    session: Arc<dyn SessionProvider>,
    strings: Arc<dyn StringsProvider>,
    seeded: Mutex<Option<Seeded>>,
    outputs: OutputHub<CommentsEmptyStateOutput>,
}

impl CommentsEmptyStateController {
    pub fn new(session: Arc<dyn SessionProvider>, strings: Arc<dyn StringsProvider>) -> Self {
        Self {
            session,
            strings,
            seeded: Mutex::new(None),
            outputs: OutputHub::new(OUTPUT_BUFFER),
        }
    }

    pub fn subscribe_outputs(&self) -> broadcast::Receiver<CommentsEmptyStateOutput> {
        self.outputs.subscribe()
    }

    /// Reads the session identity once and re-derives every visibility
    /// output from scratch. Session changes after this call have no effect
    /// until `configure` is invoked again.
    pub fn configure(&self, project: ProjectSummary, update: Option<UpdateSummary>) {
        let viewer = self.session.current_user();
        let seeded = Seeded {
            project,
            update,
            viewer,
        };

        let mut slot = self.lock_seeded();
        *slot = Some(seeded);
        debug!(
            project_id = project.project_id.0,
            update_sequence = update.map(|u| u.sequence),
            viewer = ?viewer.map(|u| u.0),
            "comments empty state configured"
        );
        for output in derive_outputs(&seeded, self.strings.as_ref()) {
            self.outputs.emit(output);
        }
    }

    pub fn back_project_tapped(&self) {
        self.emit_if_seeded(CommentsEmptyStateOutput::GoBackToProject);
    }

    pub fn leave_a_comment_tapped(&self) {
        self.emit_if_seeded(CommentsEmptyStateOutput::GoToCommentDialog);
    }

    pub fn login_tapped(&self) {
        self.emit_if_seeded(CommentsEmptyStateOutput::GoToLoginTout);
    }

    // Taps are pass-through navigation triggers; visibility gating already
    // happened through the derived outputs.
    fn emit_if_seeded(&self, output: CommentsEmptyStateOutput) {
        let slot = self.lock_seeded();
        if slot.is_some() {
            self.outputs.emit(output);
        } else {
            debug!(?output, "ignoring tap before configure");
        }
    }

    // The seeded slot is replaced wholesale and never left partial, so a
    // poisoned lock still holds consistent data.
    fn lock_seeded(&self) -> MutexGuard<'_, Option<Seeded>> {
        match self.seeded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn derive_outputs(
    seeded: &Seeded,
    strings: &dyn StringsProvider,
) -> Vec<CommentsEmptyStateOutput> {
    let is_logged_in = seeded.viewer.is_some();
    let is_creator = is_logged_in && seeded.viewer == Some(seeded.project.creator_id);
    let is_backer = seeded.project.is_backing == Some(true);

    let subtitle_is_hidden = is_backer || is_creator;
    let mut outputs = vec![
        CommentsEmptyStateOutput::BackProjectButtonHidden(is_backer || is_creator),
        CommentsEmptyStateOutput::LeaveACommentButtonHidden(!is_backer),
        CommentsEmptyStateOutput::LoginButtonHidden(is_logged_in),
        CommentsEmptyStateOutput::SubtitleIsHidden(subtitle_is_hidden),
    ];
    if !subtitle_is_hidden {
        let key = if is_logged_in {
            LocalizedKey::BecomeABackerToLeaveAComment
        } else {
            LocalizedKey::LogInToLeaveAComment
        };
        outputs.push(CommentsEmptyStateOutput::SubtitleText(
            strings.localized(key),
        ));
    }
    outputs
}

#[cfg(test)]
#[path = "tests/comments_empty_state_tests.rs"]
mod tests;
