pub mod application;
pub mod session;

pub use application::Application;
pub use session::{LaunchOutcome, LaunchSession};
