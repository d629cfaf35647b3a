//! context::cache — resolved contexts kept between requests.
//!
//! Purpose
//! -------
//! Hand a previously resolved context back to the pipeline so that loaders
//! whose outputs are still present are skipped on the next request.
//!
//! Key behaviors
//! -------------
//! - Entries are keyed by (attempt, component).
//! - Staleness is driven only by [`CacheEvent`]s; there is no expiry.
//!
//! Invariants & assumptions
//! ------------------------
//! - Callers raise the matching event after every write that changes loader
//!   inputs. [`is_stale`] is the single definition of which entries each
//!   event drops:
//!
//!   | event                    | drops                                 |
//!   |--------------------------|---------------------------------------|
//!   | `response_recorded`      | entries of that attempt               |
//!   | `attempt_discarded`      | entries of that attempt               |
//!   | `ability_updated`        | entries whose `user_id` is the person |
//!   | `item_parameters_updated`| entries whose `context_id` matches    |
//!   | `scale_tree_changed`     | every entry                           |
//!   | `settings_changed`       | every entry                           |
use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;

use crate::context::{
    errors::ContextResult,
    value::{Context, keys},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub attempt_id: u64,
    pub component_id: u64,
}

impl CacheKey {
    pub fn new(attempt_id: u64, component_id: u64) -> Self {
        Self { attempt_id, component_id }
    }

    /// # Errors
    /// Missing or mistyped `attempt_id` / `component_id`.
    pub fn from_context(context: &Context) -> ContextResult<Self> {
        Ok(Self {
            attempt_id: context.id(keys::ATTEMPT_ID)?,
            component_id: context.id(keys::COMPONENT_ID)?,
        })
    }
}

/// Writes that can make a cached context stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    ResponseRecorded { attempt_id: u64 },
    AttemptDiscarded { attempt_id: u64 },
    AbilityUpdated { person_id: u64 },
    ItemParametersUpdated { context_id: u64 },
    ScaleTreeChanged,
    SettingsChanged,
}

impl CacheEvent {
    pub const NAMES: [&'static str; 6] = [
        "response_recorded",
        "attempt_discarded",
        "ability_updated",
        "item_parameters_updated",
        "scale_tree_changed",
        "settings_changed",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CacheEvent::ResponseRecorded { .. } => Self::NAMES[0],
            CacheEvent::AttemptDiscarded { .. } => Self::NAMES[1],
            CacheEvent::AbilityUpdated { .. } => Self::NAMES[2],
            CacheEvent::ItemParametersUpdated { .. } => Self::NAMES[3],
            CacheEvent::ScaleTreeChanged => Self::NAMES[4],
            CacheEvent::SettingsChanged => Self::NAMES[5],
        }
    }
}

/// Whether `event` invalidates the entry stored under `key`.
///
/// Entries lacking the id an event matches on are treated as stale.
pub fn is_stale(event: &CacheEvent, key: &CacheKey, context: &Context) -> bool {
    match *event {
        CacheEvent::ResponseRecorded { attempt_id } | CacheEvent::AttemptDiscarded { attempt_id } => {
            key.attempt_id == attempt_id
        }
        CacheEvent::AbilityUpdated { person_id } => {
            context.id(keys::USER_ID).map_or(true, |user| user == person_id)
        }
        CacheEvent::ItemParametersUpdated { context_id } => {
            context.id(keys::CONTEXT_ID).map_or(true, |ctx| ctx == context_id)
        }
        CacheEvent::ScaleTreeChanged | CacheEvent::SettingsChanged => true,
    }
}

pub trait ContextCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> anyhow::Result<Option<Context>>;

    fn put(&self, key: CacheKey, context: Context) -> anyhow::Result<()>;

    /// Drop every entry [`is_stale`] flags; returns how many were dropped.
    fn invalidate(&self, event: &CacheEvent) -> anyhow::Result<usize>;
}

#[derive(Debug, Default)]
pub struct InMemoryContextCache {
    entries: RwLock<BTreeMap<CacheKey, Context>>,
}

impl InMemoryContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContextCache for InMemoryContextCache {
    fn get(&self, key: &CacheKey) -> anyhow::Result<Option<Context>> {
        let guard = self.entries.read().map_err(|_| anyhow!("context cache lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: CacheKey, context: Context) -> anyhow::Result<()> {
        let mut guard = self.entries.write().map_err(|_| anyhow!("context cache lock poisoned"))?;
        guard.insert(key, context);
        Ok(())
    }

    fn invalidate(&self, event: &CacheEvent) -> anyhow::Result<usize> {
        let mut guard = self.entries.write().map_err(|_| anyhow!("context cache lock poisoned"))?;
        let before = guard.len();
        guard.retain(|key, context| !is_stale(event, key, context));
        Ok(before - guard.len())
    }
}
