pub mod controller;
pub mod state;

pub use controller::{RecorderController, RecorderSnapshot};
pub use state::{RecorderPhase, RecorderState};
