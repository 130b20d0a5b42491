use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Command, CommandResult, Reply, ScoreBound, StoreError};

/// An in-memory store satisfying the [`Datastore`](crate::Datastore)
/// contract.
///
/// Used by the test suites of dependent crates. Handles are cheap clones
/// sharing the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatastore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    strings: HashMap<String, String>,
    /// Sorted sets, member -> score. Range queries sort on demand.
    sets: HashMap<String, HashMap<String, u64>>,
}

impl MemoryDatastore {
    /// Executes `commands` in order, reporting one result per command.
    ///
    /// A failing command does not affect the commands after it, matching the
    /// pipelining semantics of the Redis backend.
    pub fn batch(&self, commands: &[Command]) -> Vec<CommandResult> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        commands.iter().map(|command| inner.apply(command)).collect()
    }
}

impl Inner {
    fn apply(&mut self, command: &Command) -> CommandResult {
        match command {
            Command::Get { key } => {
                if self.sets.contains_key(key) {
                    return Err(StoreError::WrongType);
                }
                Ok(match self.strings.get(key) {
                    Some(value) => Reply::Data(value.clone()),
                    None => Reply::Nil,
                })
            }
            Command::Set { key, value } => {
                // SET replaces the key regardless of its previous type.
                self.sets.remove(key);
                self.strings.insert(key.clone(), value.to_string());
                Ok(Reply::Okay)
            }
            Command::Incr { key } => self.add(key, 1),
            Command::IncrBy { key, amount } => self.add(key, *amount),
            Command::DecrBy { key, amount } => self.add(key, -amount),
            Command::ZAdd { key, score, member } => {
                if self.strings.contains_key(key) {
                    return Err(StoreError::WrongType);
                }
                let set = self.sets.entry(key.clone()).or_default();
                let added = set.insert(member.clone(), *score).is_none();
                Ok(Reply::Int(added as i64))
            }
            Command::ZRangeByScore { key, min, max } => {
                let mut members = self.members_in_range(key, *min, *max)?;
                members.sort();
                Ok(Reply::Values(
                    members.into_iter().map(|(_, member)| member).collect(),
                ))
            }
            Command::ZRevRangeByScore {
                key,
                max,
                min,
                limit,
            } => {
                let mut members = self.members_in_range(key, *min, *max)?;
                members.sort();
                members.reverse();

                let (offset, count) = match limit {
                    Some((offset, count)) => (*offset as usize, *count as usize),
                    None => (0, usize::MAX),
                };

                Ok(Reply::Values(
                    members
                        .into_iter()
                        .skip(offset)
                        .take(count)
                        .map(|(_, member)| member)
                        .collect(),
                ))
            }
            Command::ZRemRangeByScore { key, min, max } => {
                let removed = self.members_in_range(key, *min, *max)?;
                if let Some(set) = self.sets.get_mut(key) {
                    for (_, member) in &removed {
                        set.remove(member);
                    }
                }
                Ok(Reply::Int(removed.len() as i64))
            }
        }
    }

    fn add(&mut self, key: &str, amount: i64) -> CommandResult {
        if self.sets.contains_key(key) {
            return Err(StoreError::WrongType);
        }

        let current = match self.strings.get(key) {
            Some(value) => value.parse::<i64>().or(Err(StoreError::NotAnInteger))?,
            None => 0,
        };
        let updated = current.checked_add(amount).ok_or(StoreError::NotAnInteger)?;

        self.strings.insert(key.to_owned(), updated.to_string());
        Ok(Reply::Int(updated))
    }

    fn members_in_range(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<Vec<(u64, String)>, StoreError> {
        if self.strings.contains_key(key) {
            return Err(StoreError::WrongType);
        }

        let Some(set) = self.sets.get(key) else {
            return Ok(Vec::new());
        };

        Ok(set
            .iter()
            .filter(|(_, score)| ScoreBound::contains(min, max, **score))
            .map(|(member, score)| (*score, member.clone()))
            .collect())
    }
}
