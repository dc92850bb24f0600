pub mod annotation_session;
pub mod infrastructure;
pub mod notifier;
