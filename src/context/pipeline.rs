//! context::pipeline — dependency-ordered execution of context loaders.
//!
//! Purpose
//! -------
//! Assemble the per-question context from a seed by running each registered
//! [`ContextLoader`] once, after every loader whose keys it requires.
//!
//! Key behaviors
//! -------------
//! - [`Pipeline::new`] builds the provides/requires graph and orders it with
//!   Kahn's algorithm. Duplicate providers, unprovided requirements and
//!   cycles are configuration errors reported here, never at resolution.
//! - [`Pipeline::resolve`] walks the fixed order. A loader whose provided
//!   keys are all present already is skipped, so a context handed back from
//!   a previous request only recomputes what is missing.
//! - Only the declared keys of a loader's output are merged.
//!
//! Invariants & assumptions
//! ------------------------
//! - Resolution invokes each loader at most once: at most `N` invocations.
//! - After a successful resolution the context holds the seed keys and the
//!   union of all `provides()` sets.
//! - Ties among ready loaders are broken by registration order, so the
//!   execution order is deterministic.
//!
//! Testing notes
//! -------------
//! - Unit tests use small synthetic loaders; the full loader set is
//!   exercised in `tests/integration_context_pipeline.rs`.
use std::collections::{BTreeSet, HashMap};

use crate::context::{
    cache::{CacheKey, ContextCache},
    errors::{ContextError, ContextResult},
    loader::ContextLoader,
    value::Context,
};

const SEED_PROVIDER: &str = "seed";

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub context: Context,
    /// Loaders that ran, in execution order.
    pub invoked: Vec<&'static str>,
    /// Loaders skipped because their outputs were present.
    pub skipped: Vec<&'static str>,
}

pub struct Pipeline {
    loaders: Vec<Box<dyn ContextLoader>>,
    order: Vec<usize>,
    seed_keys: Vec<String>,
    #[cfg(feature = "obs_slog")]
    logger: Option<slog::Logger>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("order", &self.order_names())
            .field("seed_keys", &self.seed_keys)
            .finish()
    }
}

impl Pipeline {
    /// Validate and order `loaders`.
    ///
    /// Parameters
    /// ----------
    /// - `loaders`: every loader of the pipeline.
    /// - `seed_keys`: keys the caller supplies in each seed.
    ///
    /// Errors
    /// ------
    /// - [`ContextError::DuplicateProvider`] when a key is provided twice
    ///   (including by the seed).
    /// - [`ContextError::MissingProvider`] when a required key has no source.
    /// - [`ContextError::Cycle`] naming the loaders left unordered.
    pub fn new(loaders: Vec<Box<dyn ContextLoader>>, seed_keys: &[&str]) -> ContextResult<Self> {
        let order = topological_order(&loaders, seed_keys)?;
        let mut seen = BTreeSet::new();
        let seed_keys =
            seed_keys.iter().filter(|key| seen.insert(**key)).map(|key| key.to_string()).collect();
        Ok(Self {
            loaders,
            order,
            seed_keys,
            #[cfg(feature = "obs_slog")]
            logger: None,
        })
    }

    /// Log each loader invocation and skip at debug level.
    #[cfg(feature = "obs_slog")]
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Loader names in execution order.
    pub fn order_names(&self) -> Vec<&'static str> {
        self.order.iter().map(|&index| self.loaders[index].name()).collect()
    }

    /// Union of all provided keys.
    pub fn provided_keys(&self) -> BTreeSet<&'static str> {
        self.loaders.iter().flat_map(|loader| loader.provides().iter().copied()).collect()
    }

    /// Run the pipeline on `seed`.
    ///
    /// Errors
    /// ------
    /// - [`ContextError::MissingSeed`] when a seed key is absent.
    /// - [`ContextError::MissingOutput`] when a loader omits a declared key.
    /// - Any loader failure, unchanged.
    pub fn resolve(&self, seed: Context) -> ContextResult<Resolution> {
        if let Some(key) = self.seed_keys.iter().find(|key| !seed.contains(key)) {
            return Err(ContextError::MissingSeed { key: key.clone() });
        }

        let mut context = seed;
        let mut invoked = Vec::new();
        let mut skipped = Vec::new();
        for &index in &self.order {
            let loader = &self.loaders[index];
            if context.contains_all(loader.provides()) {
                self.log_step(loader.name(), "skipped");
                skipped.push(loader.name());
                continue;
            }

            let mut output = loader.load(&context)?;
            for &key in loader.provides() {
                let value = output.remove(key).ok_or_else(|| ContextError::MissingOutput {
                    loader: loader.name(),
                    key: key.to_string(),
                })?;
                context.insert(key, value);
            }
            self.log_step(loader.name(), "invoked");
            invoked.push(loader.name());
        }
        Ok(Resolution { context, invoked, skipped })
    }

    /// [`Pipeline::resolve`] on top of the cached context of the seed's
    /// (attempt, component); the resolved context is written back.
    ///
    /// Seed entries replace cached ones.
    ///
    /// Errors
    /// ------
    /// Those of [`Pipeline::resolve`], plus cache failures as
    /// [`ContextError::Repository`].
    pub fn resolve_cached(&self, seed: Context, cache: &dyn ContextCache) -> ContextResult<Resolution> {
        let key = CacheKey::from_context(&seed)?;
        let mut context = cache.get(&key)?.unwrap_or_default();
        context.merge(seed);
        let resolution = self.resolve(context)?;
        cache.put(key, resolution.context.clone())?;
        Ok(resolution)
    }

    #[cfg(feature = "obs_slog")]
    fn log_step(&self, loader: &'static str, outcome: &'static str) {
        if let Some(logger) = &self.logger {
            slog::debug!(logger, "context loader"; "loader" => loader, "outcome" => outcome);
        }
    }

    #[cfg(not(feature = "obs_slog"))]
    fn log_step(&self, _loader: &'static str, _outcome: &'static str) {}
}

/// Kahn's algorithm over the provides/requires graph.
///
/// Edges run from the provider of a key to each loader requiring it; seed
/// keys contribute no edges.
fn topological_order(
    loaders: &[Box<dyn ContextLoader>], seed_keys: &[&str],
) -> ContextResult<Vec<usize>> {
    let mut provider: HashMap<&str, Option<usize>> = HashMap::new();
    for key in seed_keys {
        provider.insert(*key, None);
    }
    for (index, loader) in loaders.iter().enumerate() {
        for &key in loader.provides() {
            if let Some(existing) = provider.get(key) {
                let first = existing.map_or(SEED_PROVIDER, |i| loaders[i].name());
                return Err(ContextError::DuplicateProvider {
                    key: key.to_string(),
                    first: first.to_string(),
                    second: loader.name().to_string(),
                });
            }
            provider.insert(key, Some(index));
        }
    }

    let n = loaders.len();
    let mut downstream: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    let mut in_degree = vec![0usize; n];
    for (index, loader) in loaders.iter().enumerate() {
        for &key in loader.requires() {
            match provider.get(key) {
                None => {
                    return Err(ContextError::MissingProvider {
                        loader: loader.name(),
                        key: key.to_string(),
                    });
                }
                Some(None) => {}
                Some(Some(from)) => {
                    if downstream[*from].insert(index) {
                        in_degree[index] += 1;
                    }
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &downstream[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < n {
        let loaders = (0..n).filter(|&i| in_degree[i] > 0).map(|i| loaders[i].name()).collect();
        return Err(ContextError::Cycle { loaders });
    }
    Ok(order)
}
