pub mod config;
pub mod orchestrator;

pub use config::UnlockConfig;
pub use orchestrator::{UnlockConfirmation, UnlockOrchestrator};
