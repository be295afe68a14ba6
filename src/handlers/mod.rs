pub mod analysis_handler;
pub mod session;

pub use analysis_handler::AnalysisHandler;
pub use session::{Outcome, Session};
