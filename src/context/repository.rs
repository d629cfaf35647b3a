//! Collaborator interfaces the loaders read from, with in-memory versions.
//!
//! Purpose
//! -------
//! Keep persistence outside the pipeline. Loaders receive these traits as
//! shared handles and only see plain records: the scale tree, questions
//! with their item parameters, stored person parameters, and progress.
//!
//! Conventions
//! -----------
//! - Methods return `anyhow::Result` so implementations can attach their
//!   own context; loaders convert failures into
//!   [`ContextError::Repository`](crate::context::ContextError).
//! - The in-memory implementations use `RwLock` and report a poisoned lock
//!   as an error rather than panicking.
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::RwLock;

use anyhow::anyhow;

use crate::{
    context::errors::{ContextError, ContextResult},
    context::progress::Progress,
    estimation::PersonParameter,
    models::{CalculationStatus, ItemParameter, ItemParams},
    statistics::InformationItem,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleNode {
    pub id: u64,
    pub parent: Option<u64>,
    pub name: String,
}

impl ScaleNode {
    pub fn new(id: u64, parent: Option<u64>, name: impl Into<String>) -> Self {
        Self { id, parent, name: name.into() }
    }
}

/// The tested scale and every scale below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleTree {
    root: u64,
    nodes: BTreeMap<u64, ScaleNode>,
    children: BTreeMap<u64, Vec<u64>>,
}

impl ScaleTree {
    /// Subtree of `nodes` rooted at `root`. Nodes outside it are dropped.
    ///
    /// # Errors
    /// [`ContextError::UnknownScale`] when `root` is not among `nodes`.
    pub fn from_nodes(root: u64, nodes: impl IntoIterator<Item = ScaleNode>) -> ContextResult<Self> {
        let all: BTreeMap<u64, ScaleNode> = nodes.into_iter().map(|n| (n.id, n)).collect();
        if !all.contains_key(&root) {
            return Err(ContextError::UnknownScale { scale_id: root });
        }
        let mut all_children: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
        for node in all.values() {
            if let Some(parent) = node.parent {
                all_children.entry(parent).or_default().push(node.id);
            }
        }

        let mut nodes = BTreeMap::new();
        let mut children = BTreeMap::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            if nodes.contains_key(&id) {
                continue;
            }
            if let Some(node) = all.get(&id) {
                nodes.insert(id, node.clone());
            }
            let kids = all_children.get(&id).cloned().unwrap_or_default();
            queue.extend(kids.iter().copied());
            children.insert(id, kids);
        }
        Ok(Self { root, nodes, children })
    }

    pub fn root(&self) -> u64 {
        self.root
    }

    pub fn contains(&self, scale_id: u64) -> bool {
        self.nodes.contains_key(&scale_id)
    }

    /// Scale ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, scale_id: u64) -> Option<&ScaleNode> {
        self.nodes.get(&scale_id)
    }

    /// Ancestors of `scale_id` inside this tree, nearest first. The root has none.
    pub fn ancestors(&self, scale_id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        if scale_id == self.root {
            return out;
        }
        let mut current = self.nodes.get(&scale_id).and_then(|n| n.parent);
        while let Some(id) = current {
            if !self.contains(id) || out.contains(&id) {
                break;
            }
            out.push(id);
            if id == self.root {
                break;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        out
    }

    /// Whether `question_scale` is `scale_id` or lies below it.
    pub fn is_within(&self, question_scale: u64, scale_id: u64) -> bool {
        question_scale == scale_id || self.ancestors(question_scale).contains(&scale_id)
    }

    /// All scales strictly below `scale_id`, breadth first.
    pub fn descendants(&self, scale_id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::from([scale_id]);
        let mut queue: VecDeque<u64> =
            self.children.get(&scale_id).cloned().unwrap_or_default().into();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = self.children.get(&id) {
                queue.extend(kids.iter().copied());
            }
        }
        out
    }
}

/// A question as seen by the loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u64,
    pub scale_id: u64,
    /// `None` for questions that were never calibrated.
    pub item: Option<ItemParameter>,
    /// Number of recorded attempts across all persons.
    pub attempts: u32,
}

impl Question {
    pub fn new(id: u64, scale_id: u64, item: Option<ItemParameter>, attempts: u32) -> Self {
        Self { id, scale_id, item, attempts }
    }

    /// Typed parameters when the item is calibrated, usable and valid.
    pub fn calibrated_params(&self) -> Option<ItemParams> {
        let item = self.item.as_ref()?;
        if !item.status.is_usable() {
            return None;
        }
        item.item_params().ok()
    }

    pub fn information_item(&self) -> Option<InformationItem> {
        let item = self.item.as_ref()?;
        self.calibrated_params().map(|params| InformationItem::new(self.id, item.model, params))
    }

    pub fn is_excluded(&self) -> bool {
        self.item.as_ref().is_some_and(|item| item.status == CalculationStatus::ManuallyExcluded)
    }
}

/// Scale tree and question catalog.
pub trait CatalogRepository: Send + Sync {
    /// Tree rooted at `root`.
    fn scale_tree(&self, root: u64) -> anyhow::Result<ScaleTree>;

    /// Questions of `context_id` attached directly to one of `scale_ids`.
    fn questions(&self, context_id: u64, scale_ids: &[u64]) -> anyhow::Result<Vec<Question>>;
}

/// Stored person parameters.
pub trait AbilityRepository: Send + Sync {
    fn person_parameter(
        &self, person_id: u64, scale_id: u64, context_id: u64,
    ) -> anyhow::Result<Option<PersonParameter>>;

    fn save(&self, parameter: PersonParameter) -> anyhow::Result<()>;
}

/// Persisted progress records.
pub trait ProgressStore: Send + Sync {
    fn load(&self, attempt_id: u64, component_id: u64) -> anyhow::Result<Option<Progress>>;

    /// Insert or replace; the last write wins.
    fn save(&self, progress: &Progress) -> anyhow::Result<()>;

    fn discard(&self, attempt_id: u64, component_id: u64) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    scales: Vec<ScaleNode>,
    questions: Vec<(u64, Question)>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, node: ScaleNode) -> Self {
        self.scales.push(node);
        self
    }

    pub fn with_question(mut self, context_id: u64, question: Question) -> Self {
        self.questions.push((context_id, question));
        self
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn scale_tree(&self, root: u64) -> anyhow::Result<ScaleTree> {
        Ok(ScaleTree::from_nodes(root, self.scales.iter().cloned())?)
    }

    fn questions(&self, context_id: u64, scale_ids: &[u64]) -> anyhow::Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|(ctx, q)| *ctx == context_id && scale_ids.contains(&q.scale_id))
            .map(|(_, q)| q.clone())
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAbilities {
    parameters: RwLock<HashMap<(u64, u64, u64), PersonParameter>>,
}

impl InMemoryAbilities {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AbilityRepository for InMemoryAbilities {
    fn person_parameter(
        &self, person_id: u64, scale_id: u64, context_id: u64,
    ) -> anyhow::Result<Option<PersonParameter>> {
        let guard = self.parameters.read().map_err(|_| anyhow!("ability store lock poisoned"))?;
        Ok(guard.get(&(person_id, scale_id, context_id)).copied())
    }

    fn save(&self, parameter: PersonParameter) -> anyhow::Result<()> {
        let mut guard =
            self.parameters.write().map_err(|_| anyhow!("ability store lock poisoned"))?;
        guard.insert((parameter.person_id, parameter.scale_id, parameter.context_id), parameter);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<(u64, u64), Progress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self, attempt_id: u64, component_id: u64) -> anyhow::Result<Option<Progress>> {
        let guard = self.records.read().map_err(|_| anyhow!("progress store lock poisoned"))?;
        Ok(guard.get(&(attempt_id, component_id)).cloned())
    }

    fn save(&self, progress: &Progress) -> anyhow::Result<()> {
        let mut guard =
            self.records.write().map_err(|_| anyhow!("progress store lock poisoned"))?;
        guard.insert((progress.attempt_id, progress.component_id), progress.clone());
        Ok(())
    }

    fn discard(&self, attempt_id: u64, component_id: u64) -> anyhow::Result<()> {
        let mut guard =
            self.records.write().map_err(|_| anyhow!("progress store lock poisoned"))?;
        guard.remove(&(attempt_id, component_id));
        Ok(())
    }
}
