//! Connection session bookkeeping
//!
//! Maps transport-assigned connection ids to the set of recordings they are
//! streaming. The registry is bookkeeping only: tearing a session down on
//! disconnect never cancels a pipeline already running for its recordings.

mod registry;

pub use registry::{SessionInfo, SessionRegistry};
