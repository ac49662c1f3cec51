pub mod auth;
pub mod credentials;
pub mod launcher;

pub use launcher::LaunchSessions;
