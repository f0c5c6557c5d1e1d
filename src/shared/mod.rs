pub mod errors;
pub mod ids;
pub mod logging;
pub mod network;
pub mod serde_ext;

pub use errors::ExternalError;
pub use ids::{generate_run_id, RunId};
pub use logging::EventLog;
pub use network::Network;
