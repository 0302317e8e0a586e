pub mod api;
pub mod db;
pub mod fitness;
pub mod format;
pub mod recorder;
pub mod settings;
pub mod stats;

pub use db::Database;
pub use fitness::{DailyTotal, FitnessProvider, PedometerSample};
pub use recorder::{RecorderController, RecorderPhase, RecorderSnapshot, RecorderState};

/// Initialize logging (reads RUST_LOG env var). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
