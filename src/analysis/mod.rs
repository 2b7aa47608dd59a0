pub mod recon;
pub mod security;
pub mod technical;
pub mod whale;

pub use recon::Reconnaissance;
pub use security::SecurityAnalyzer;
pub use technical::TechnicalAnalyzer;
pub use whale::WhaleTracker;
