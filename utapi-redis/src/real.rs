use deadpool_redis::{Pool, PoolConfig, Runtime};

use crate::{Command, CommandResult, RedisConfig, Reply, Result};

/// A pooled client for a single Redis instance.
#[derive(Clone)]
pub struct RedisDatastore {
    pool: Pool,
}

impl RedisDatastore {
    /// Creates a connection pool for the Redis instance in `config`.
    ///
    /// Connections are established lazily, so this succeeds even if the
    /// instance is not reachable yet.
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let mut pool_config = deadpool_redis::Config::from_url(config.url());
        pool_config.pool = Some(PoolConfig::new(config.max_connections as usize));

        let pool = pool_config.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }

    /// Executes `commands` as a single pipelined request.
    pub async fn batch(&self, commands: &[Command]) -> Result<Vec<CommandResult>> {
        let mut connection = self.pool.get().await?;

        let mut pipeline = redis::pipe();
        for command in commands {
            pipeline.add_command(to_redis(command));
        }

        let values: Vec<redis::Value> = pipeline.query_async(&mut connection).await?;

        Ok(commands
            .iter()
            .zip(values)
            .map(|(command, value)| convert_reply(command, value))
            .collect())
    }

    /// Sends a `PING` over a pooled connection.
    pub async fn ping(&self) -> Result<()> {
        let mut connection = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut connection).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDatastore").finish_non_exhaustive()
    }
}

fn to_redis(command: &Command) -> redis::Cmd {
    match command {
        Command::Get { key } => {
            let mut cmd = redis::cmd("GET");
            cmd.arg(key);
            cmd
        }
        Command::Set { key, value } => {
            let mut cmd = redis::cmd("SET");
            cmd.arg(key).arg(*value);
            cmd
        }
        Command::Incr { key } => {
            let mut cmd = redis::cmd("INCR");
            cmd.arg(key);
            cmd
        }
        Command::IncrBy { key, amount } => {
            let mut cmd = redis::cmd("INCRBY");
            cmd.arg(key).arg(*amount);
            cmd
        }
        Command::DecrBy { key, amount } => {
            let mut cmd = redis::cmd("DECRBY");
            cmd.arg(key).arg(*amount);
            cmd
        }
        Command::ZAdd { key, score, member } => {
            let mut cmd = redis::cmd("ZADD");
            cmd.arg(key).arg(*score).arg(member);
            cmd
        }
        Command::ZRangeByScore { key, min, max } => {
            let mut cmd = redis::cmd("ZRANGEBYSCORE");
            cmd.arg(key).arg(min.to_string()).arg(max.to_string());
            cmd
        }
        Command::ZRevRangeByScore {
            key,
            max,
            min,
            limit,
        } => {
            let mut cmd = redis::cmd("ZREVRANGEBYSCORE");
            cmd.arg(key).arg(max.to_string()).arg(min.to_string());
            if let Some((offset, count)) = limit {
                cmd.arg("LIMIT").arg(*offset).arg(*count);
            }
            cmd
        }
        Command::ZRemRangeByScore { key, min, max } => {
            let mut cmd = redis::cmd("ZREMRANGEBYSCORE");
            cmd.arg(key).arg(min.to_string()).arg(max.to_string());
            cmd
        }
    }
}

/// Converts a raw pipeline value into the reply shape the command expects.
fn convert_reply(command: &Command, value: redis::Value) -> CommandResult {
    match command {
        Command::Get { .. } => {
            let data: Option<String> = redis::from_redis_value(&value)?;
            Ok(match data {
                Some(data) => Reply::Data(data),
                None => Reply::Nil,
            })
        }
        Command::Set { .. } => {
            redis::from_redis_value::<()>(&value)?;
            Ok(Reply::Okay)
        }
        Command::Incr { .. }
        | Command::IncrBy { .. }
        | Command::DecrBy { .. }
        | Command::ZAdd { .. }
        | Command::ZRemRangeByScore { .. } => {
            let value: i64 = redis::from_redis_value(&value)?;
            Ok(Reply::Int(value))
        }
        Command::ZRangeByScore { .. } | Command::ZRevRangeByScore { .. } => {
            let members: Vec<String> = redis::from_redis_value(&value)?;
            Ok(Reply::Values(members))
        }
    }
}
