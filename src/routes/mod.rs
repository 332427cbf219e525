mod archive;
mod dispatch;
mod feedback;
mod health_check;
mod subscriptions;
mod unsubscribe;

pub use archive::handle_get_latest_issue;
pub use dispatch::{handle_dispatch_newsletter, CronSecret};
pub use feedback::handle_create_feedback;
pub use health_check::health_check;
pub use subscriptions::handle_create_subscription;
pub use unsubscribe::handle_unsubscribe;
