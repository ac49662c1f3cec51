pub mod apps;
pub mod hosts;
pub mod open;
pub mod probe;

pub use probe::{run_probe, run_validate};
