pub mod progress;
pub mod stats;
pub mod text;
