//! The UTAPI metric accounting engine.
//!
//! Storage events enter through [`UtapiClient::push_metric`], which advances
//! per-interval operation and traffic counters and keeps the sampled
//! timelines of the two absolute metrics (`storageUtilized`,
//! `numberOfObjects`) consistent. Queries are answered by [`ListMetrics`],
//! which reconstructs per-interval metrics and nearest-predecessor absolutes
//! over an arbitrary time range.
//!
//! All state lives in the backing store behind
//! [`Datastore`](utapi_redis::Datastore); the engine itself holds no mutable
//! state and relies on the store's atomic single-key primitives for
//! correctness under concurrent writers.

mod client;
mod event;
mod list;
mod operation;
mod schema;

pub use self::client::*;
pub use self::event::*;
pub use self::list::*;
pub use self::operation::*;
pub use self::schema::*;
