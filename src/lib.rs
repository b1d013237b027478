pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod grid;
pub mod history;
pub mod model;
pub mod ratings;
pub mod types;

pub use engine::Engine;
pub use error::PredictError;
pub use grid::assemble;
pub use history::HistoryStore;
pub use model::ModelArtifact;
