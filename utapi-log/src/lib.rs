//! Logging facade for UTAPI.
//!
//! All crates in the workspace log through the macros re-exported here, so
//! that the subscriber installed by [`init`] is the single authority on
//! filtering and output format.

mod setup;

pub use self::setup::*;

// Raw tracing macros, so that dependent crates do not need a direct tracing
// dependency.
pub use tracing::{debug, error, info, trace, warn, Level};
