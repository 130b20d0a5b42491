use std::fmt;

/// A score bound for sorted-set range commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBound {
    /// Negative infinity (`-inf`).
    NegInf,
    /// Positive infinity (`+inf`).
    PosInf,
    /// An inclusive score value.
    Value(u64),
}

impl ScoreBound {
    fn is_at_most(self, score: u64) -> bool {
        match self {
            Self::NegInf => true,
            Self::PosInf => false,
            Self::Value(value) => value <= score,
        }
    }

    fn is_at_least(self, score: u64) -> bool {
        match self {
            Self::NegInf => false,
            Self::PosInf => true,
            Self::Value(value) => value >= score,
        }
    }

    /// Returns `true` if `score` lies within `[min, max]`, bounds inclusive.
    pub(crate) fn contains(min: Self, max: Self, score: u64) -> bool {
        min.is_at_most(score) && max.is_at_least(score)
    }
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegInf => f.write_str("-inf"),
            Self::PosInf => f.write_str("+inf"),
            Self::Value(value) => value.fmt(f),
        }
    }
}

/// A single store command within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `GET key`
    Get {
        /// Key to read.
        key: String,
    },
    /// `SET key value`
    Set {
        /// Key to write.
        key: String,
        /// Integer value to store.
        value: i64,
    },
    /// `INCR key`
    Incr {
        /// Key holding the counter.
        key: String,
    },
    /// `INCRBY key amount`
    IncrBy {
        /// Key holding the counter.
        key: String,
        /// Amount added to the counter.
        amount: i64,
    },
    /// `DECRBY key amount`
    DecrBy {
        /// Key holding the counter.
        key: String,
        /// Amount subtracted from the counter.
        amount: i64,
    },
    /// `ZADD key score member`
    ZAdd {
        /// Key holding the sorted set.
        key: String,
        /// Score of the member.
        score: u64,
        /// Member value.
        member: String,
    },
    /// `ZRANGEBYSCORE key min max`
    ZRangeByScore {
        /// Key holding the sorted set.
        key: String,
        /// Lower score bound, inclusive.
        min: ScoreBound,
        /// Upper score bound, inclusive.
        max: ScoreBound,
    },
    /// `ZREVRANGEBYSCORE key max min [LIMIT offset count]`
    ZRevRangeByScore {
        /// Key holding the sorted set.
        key: String,
        /// Upper score bound, inclusive.
        max: ScoreBound,
        /// Lower score bound, inclusive.
        min: ScoreBound,
        /// Optional `(offset, count)` limit.
        limit: Option<(u64, u64)>,
    },
    /// `ZREMRANGEBYSCORE key min max`
    ZRemRangeByScore {
        /// Key holding the sorted set.
        key: String,
        /// Lower score bound, inclusive.
        min: ScoreBound,
        /// Upper score bound, inclusive.
        max: ScoreBound,
    },
}

impl Command {
    /// Creates a `GET` command.
    pub fn get(key: impl Into<String>) -> Self {
        Self::Get { key: key.into() }
    }

    /// Creates a `SET` command.
    pub fn set(key: impl Into<String>, value: i64) -> Self {
        Self::Set {
            key: key.into(),
            value,
        }
    }

    /// Creates an `INCR` command.
    pub fn incr(key: impl Into<String>) -> Self {
        Self::Incr { key: key.into() }
    }

    /// Creates an `INCRBY` command.
    pub fn incrby(key: impl Into<String>, amount: i64) -> Self {
        Self::IncrBy {
            key: key.into(),
            amount,
        }
    }

    /// Creates a `DECRBY` command.
    pub fn decrby(key: impl Into<String>, amount: i64) -> Self {
        Self::DecrBy {
            key: key.into(),
            amount,
        }
    }

    /// Creates a `ZADD` command.
    pub fn zadd(key: impl Into<String>, score: u64, member: impl Into<String>) -> Self {
        Self::ZAdd {
            key: key.into(),
            score,
            member: member.into(),
        }
    }

    /// Creates a `ZRANGEBYSCORE` command.
    pub fn zrangebyscore(key: impl Into<String>, min: ScoreBound, max: ScoreBound) -> Self {
        Self::ZRangeByScore {
            key: key.into(),
            min,
            max,
        }
    }

    /// Creates a `ZREVRANGEBYSCORE` command.
    pub fn zrevrangebyscore(
        key: impl Into<String>,
        max: ScoreBound,
        min: ScoreBound,
        limit: Option<(u64, u64)>,
    ) -> Self {
        Self::ZRevRangeByScore {
            key: key.into(),
            max,
            min,
            limit,
        }
    }

    /// Creates a `ZREMRANGEBYSCORE` command.
    pub fn zremrangebyscore(key: impl Into<String>, min: ScoreBound, max: ScoreBound) -> Self {
        Self::ZRemRangeByScore {
            key: key.into(),
            min,
            max,
        }
    }

    /// Returns the key this command operates on.
    pub fn key(&self) -> &str {
        match self {
            Self::Get { key }
            | Self::Set { key, .. }
            | Self::Incr { key }
            | Self::IncrBy { key, .. }
            | Self::DecrBy { key, .. }
            | Self::ZAdd { key, .. }
            | Self::ZRangeByScore { key, .. }
            | Self::ZRevRangeByScore { key, .. }
            | Self::ZRemRangeByScore { key, .. } => key,
        }
    }
}

/// The successful reply to a single store command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// The key does not exist.
    Nil,
    /// A status reply without a value.
    Okay,
    /// An integer reply.
    Int(i64),
    /// A string reply.
    Data(String),
    /// A list of sorted-set members.
    Values(Vec<String>),
}

impl Reply {
    /// Returns the integer reply, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the sorted-set members of a range reply.
    pub fn members(&self) -> &[String] {
        match self {
            Self::Values(members) => members,
            _ => &[],
        }
    }
}
