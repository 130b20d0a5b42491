//! Abstraction over the key-value store backing the metric engine.
//!
//! The engine only ever talks to the store through [`Datastore::batch`]: an
//! ordered list of [`Command`]s executed as one pipelined unit, answered with
//! one [`Reply`] per command in the same order. Individual command failures
//! are reported in place and do not short-circuit the rest of the batch;
//! only transport-level failures surface as a single top-level error.
//!
//! Two backends satisfy the contract: a pooled Redis client for production
//! and an in-memory store used by the test suites of dependent crates.
#![warn(missing_docs)]

mod command;
mod config;
mod memory;
mod real;

pub use self::command::*;
pub use self::config::*;
pub use self::memory::*;
pub use self::real::*;

use thiserror::Error;

/// Typical `Result` when dealing with the datastore.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// The outcome of a single command within a batch.
pub type CommandResult = Result<Reply>;

/// An error type that represents various failure modes when interacting with
/// the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error that occurs when creating the Redis connection pool.
    #[error("failed to create redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// An error that occurs when checking out a pooled connection.
    #[error("failed to check out a redis connection: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// An error that occurs during communication with Redis.
    #[error("failed to communicate with redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// A command was issued against a key holding the wrong kind of value.
    #[error("operation against a key holding the wrong kind of value")]
    WrongType,

    /// An arithmetic command hit a value that is not an integer.
    #[error("value is not an integer or out of range")]
    NotAnInteger,
}

/// A handle to the backing store.
///
/// The handle is cheap to clone and safe to share across tasks; all methods
/// take `&self`.
#[derive(Clone, Debug)]
pub enum Datastore {
    /// A pooled connection to a Redis instance.
    Redis(RedisDatastore),
    /// An in-memory store satisfying the same contract.
    Memory(MemoryDatastore),
}

impl Datastore {
    /// Connects to the Redis instance described by `config`.
    pub fn redis(config: &RedisConfig) -> Result<Self> {
        Ok(Self::Redis(RedisDatastore::connect(config)?))
    }

    /// Creates a fresh in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryDatastore::default())
    }

    /// Executes the ordered `commands` as one pipelined unit.
    ///
    /// Returns one result per command, in command order.
    pub async fn batch(&self, commands: &[Command]) -> Result<Vec<CommandResult>> {
        match self {
            Self::Redis(store) => store.batch(commands).await,
            Self::Memory(store) => Ok(store.batch(commands)),
        }
    }

    /// Verifies that the store answers requests.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Redis(store) => store.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }

    /// Fetches the string value stored at `key`.
    pub async fn get(&self, key: impl Into<String>) -> Result<Reply> {
        self.single(Command::get(key)).await
    }

    /// Stores an integer value at `key`, replacing any previous value.
    pub async fn set(&self, key: impl Into<String>, value: i64) -> Result<Reply> {
        self.single(Command::set(key, value)).await
    }

    /// Increments the integer at `key` by one.
    pub async fn incr(&self, key: impl Into<String>) -> Result<Reply> {
        self.single(Command::incr(key)).await
    }

    /// Increments the integer at `key` by `amount`.
    pub async fn incrby(&self, key: impl Into<String>, amount: i64) -> Result<Reply> {
        self.single(Command::incrby(key, amount)).await
    }

    /// Decrements the integer at `key` by `amount`.
    pub async fn decrby(&self, key: impl Into<String>, amount: i64) -> Result<Reply> {
        self.single(Command::decrby(key, amount)).await
    }

    /// Adds `member` with `score` to the sorted set at `key`.
    pub async fn zadd(
        &self,
        key: impl Into<String>,
        score: u64,
        member: impl Into<String>,
    ) -> Result<Reply> {
        self.single(Command::zadd(key, score, member)).await
    }

    /// Returns sorted-set members with scores between `min` and `max`, in
    /// ascending score order.
    pub async fn zrangebyscore(
        &self,
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<Reply> {
        self.single(Command::zrangebyscore(key, min, max)).await
    }

    /// Returns sorted-set members with scores between `max` and `min`, in
    /// descending score order, optionally limited to `(offset, count)`.
    pub async fn zrevrangebyscore(
        &self,
        key: impl Into<String>,
        max: ScoreBound,
        min: ScoreBound,
        limit: Option<(u64, u64)>,
    ) -> Result<Reply> {
        self.single(Command::zrevrangebyscore(key, max, min, limit))
            .await
    }

    /// Removes sorted-set members with scores between `min` and `max`.
    pub async fn zremrangebyscore(
        &self,
        key: impl Into<String>,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<Reply> {
        self.single(Command::zremrangebyscore(key, min, max)).await
    }

    async fn single(&self, command: Command) -> Result<Reply> {
        let mut results = self.batch(&[command]).await?;
        match results.pop() {
            Some(result) => result,
            None => Err(StoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "missing reply for pipelined command",
            )))),
        }
    }
}
