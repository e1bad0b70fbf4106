mod compose;
mod decide_approval;
mod login;
mod logout;
mod record_activity;

pub use compose::{ComposeAction, ComposeKind};
pub use decide_approval::DecideApprovalAction;
pub use login::{LoginAction, LoginOutcome};
pub use logout::LogoutAction;
pub use record_activity::ActivityRecorder;
