use super::*;
use crate::EnglishStrings;
use shared::domain::{ProjectId, UpdateId};

struct TestSession {
    user: Mutex<Option<UserId>>,
}

impl TestSession {
    fn logged_out() -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(None),
        })
    }

    fn logged_in(user_id: i64) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(UserId(user_id))),
        })
    }

    fn switch_to(&self, user_id: i64) {
        *self.user.lock().expect("session lock") = Some(UserId(user_id));
    }
}

impl SessionProvider for TestSession {
    fn current_user(&self) -> Option<UserId> {
        *self.user.lock().expect("session lock")
    }
}

fn project(creator_id: i64, is_backing: Option<bool>) -> ProjectSummary {
    ProjectSummary {
        project_id: ProjectId(1),
        creator_id: UserId(creator_id),
        is_backing,
    }
}

fn controller(session: Arc<TestSession>) -> CommentsEmptyStateController {
    CommentsEmptyStateController::new(session, Arc::new(EnglishStrings))
}

fn drain(
    rx: &mut broadcast::Receiver<CommentsEmptyStateOutput>,
) -> Vec<CommentsEmptyStateOutput> {
    let mut outputs = Vec::new();
    while let Ok(output) = rx.try_recv() {
        outputs.push(output);
    }
    outputs
}

#[test]
fn logged_out_viewer_is_prompted_to_log_in() {
    let controller = controller(TestSession::logged_out());
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, None), None);

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::BackProjectButtonHidden(false),
            CommentsEmptyStateOutput::LeaveACommentButtonHidden(true),
            CommentsEmptyStateOutput::LoginButtonHidden(false),
            CommentsEmptyStateOutput::SubtitleIsHidden(false),
            CommentsEmptyStateOutput::SubtitleText("Log in to leave a comment".into()),
        ]
    );
}

#[test]
fn backer_gets_comment_rights_and_no_subtitle() {
    let controller = controller(TestSession::logged_in(1));
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, Some(true)), None);

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::BackProjectButtonHidden(true),
            CommentsEmptyStateOutput::LeaveACommentButtonHidden(false),
            CommentsEmptyStateOutput::LoginButtonHidden(true),
            CommentsEmptyStateOutput::SubtitleIsHidden(true),
        ]
    );
}

#[test]
fn update_context_does_not_change_the_derivation() {
    let controller = controller(TestSession::logged_in(1));
    let mut rx = controller.subscribe_outputs();

    let update = UpdateSummary {
        update_id: UpdateId(9),
        sequence: 4,
    };
    controller.configure(project(400, Some(true)), Some(update));

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::BackProjectButtonHidden(true),
            CommentsEmptyStateOutput::LeaveACommentButtonHidden(false),
            CommentsEmptyStateOutput::LoginButtonHidden(true),
            CommentsEmptyStateOutput::SubtitleIsHidden(true),
        ]
    );
}

#[test]
fn logged_in_non_backer_is_prompted_to_back() {
    let controller = controller(TestSession::logged_in(1));
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, Some(false)), None);

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::BackProjectButtonHidden(false),
            CommentsEmptyStateOutput::LeaveACommentButtonHidden(true),
            CommentsEmptyStateOutput::LoginButtonHidden(true),
            CommentsEmptyStateOutput::SubtitleIsHidden(false),
            CommentsEmptyStateOutput::SubtitleText("Become a backer to leave a comment".into()),
        ]
    );
}

#[test]
fn creator_viewing_their_own_project_sees_no_affordances() {
    let controller = controller(TestSession::logged_in(400));
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, Some(false)), None);

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::BackProjectButtonHidden(true),
            CommentsEmptyStateOutput::LeaveACommentButtonHidden(true),
            CommentsEmptyStateOutput::LoginButtonHidden(true),
            CommentsEmptyStateOutput::SubtitleIsHidden(true),
        ]
    );
}

#[test]
fn taps_before_configure_emit_nothing() {
    let controller = controller(TestSession::logged_out());
    let mut rx = controller.subscribe_outputs();

    controller.back_project_tapped();
    controller.leave_a_comment_tapped();
    controller.login_tapped();

    assert!(drain(&mut rx).is_empty());
}

#[test]
fn taps_after_configure_route_navigation() {
    let controller = controller(TestSession::logged_in(1));
    controller.configure(project(400, Some(true)), None);

    // Late subscriber: the derivation outputs above are not replayed.
    let mut rx = controller.subscribe_outputs();

    controller.back_project_tapped();
    controller.leave_a_comment_tapped();
    controller.login_tapped();

    assert_eq!(
        drain(&mut rx),
        vec![
            CommentsEmptyStateOutput::GoBackToProject,
            CommentsEmptyStateOutput::GoToCommentDialog,
            CommentsEmptyStateOutput::GoToLoginTout,
        ]
    );
}

#[test]
fn identical_configures_derive_identical_outputs() {
    let controller = controller(TestSession::logged_in(1));
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, Some(false)), None);
    controller.configure(project(400, Some(false)), None);

    let outputs = drain(&mut rx);
    assert_eq!(outputs.len(), 10);
    assert_eq!(outputs[..5], outputs[5..]);
}

#[test]
fn session_changes_apply_only_on_the_next_configure() {
    let session = TestSession::logged_out();
    let controller = controller(session.clone());
    let mut rx = controller.subscribe_outputs();

    controller.configure(project(400, None), None);
    let first = drain(&mut rx);
    assert!(first.contains(&CommentsEmptyStateOutput::LoginButtonHidden(false)));

    session.switch_to(1);
    assert!(drain(&mut rx).is_empty());

    controller.configure(project(400, Some(true)), None);
    let second = drain(&mut rx);
    assert!(second.contains(&CommentsEmptyStateOutput::LoginButtonHidden(true)));
    assert!(second.contains(&CommentsEmptyStateOutput::LeaveACommentButtonHidden(false)));
}
