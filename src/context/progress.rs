//! Per-attempt progress record.
//!
//! One [`Progress`] exists per (attempt, component). It is created when the
//! first question of an attempt is prepared, updated after every answer via
//! [`Progress::record_response`], and persisted through a
//! [`crate::context::ProgressStore`] between requests. The record is
//! derived state: losing it only costs recomputation.
//!
//! The active scales are written by the active-scales loader on every
//! resolution and carried into the next answer by [`record_answer`], so a
//! scale once deactivated stays out for the rest of the attempt.
use std::collections::{BTreeMap, BTreeSet};

use crate::context::{
    errors::{ContextError, ContextResult},
    repository::{ProgressStore, ScaleTree},
    value::{Context, keys},
};

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer {
    pub scale_id: u64,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub attempt_id: u64,
    pub component_id: u64,
    /// Scales still eligible for questions; `None` until first computed.
    pub active_scales: Option<BTreeSet<u64>>,
    pub excluded_questions: BTreeSet<u64>,
    /// Ability on the tested scale when the attempt started.
    pub ability_before_attempt: f64,
    pub first_question: bool,
    /// Answers by question id.
    pub responses: BTreeMap<u64, Answer>,
}

impl Progress {
    /// Fresh record for the first question of an attempt.
    pub fn start(attempt_id: u64, component_id: u64, ability_before_attempt: f64) -> Self {
        Self {
            attempt_id,
            component_id,
            active_scales: None,
            excluded_questions: BTreeSet::new(),
            ability_before_attempt,
            first_question: true,
            responses: BTreeMap::new(),
        }
    }

    /// Store an answer: keep the fraction, exclude the question from further
    /// selection and clear the first-question flag. Answering the same
    /// question again overwrites its fraction.
    ///
    /// # Errors
    /// [`ContextError::InvalidFraction`] unless `0 ≤ fraction ≤ 1`.
    pub fn record_response(
        &mut self, question_id: u64, scale_id: u64, fraction: f64,
    ) -> ContextResult<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ContextError::InvalidFraction { question_id, value: fraction });
        }
        self.responses.insert(question_id, Answer { scale_id, fraction });
        self.excluded_questions.insert(question_id);
        self.first_question = false;
        Ok(())
    }

    pub fn exclude_question(&mut self, question_id: u64) {
        self.excluded_questions.insert(question_id);
    }

    pub fn set_active_scales(&mut self, scales: impl IntoIterator<Item = u64>) {
        self.active_scales = Some(scales.into_iter().collect());
    }

    pub fn has_answered(&self, question_id: u64) -> bool {
        self.responses.contains_key(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    /// Answers given to questions attached to `scale_id` or one of its
    /// subscales in `tree`.
    pub fn answered_in(&self, tree: &ScaleTree, scale_id: u64) -> usize {
        self.responses.values().filter(|answer| tree.is_within(answer.scale_id, scale_id)).count()
    }
}

/// Record an answer against a resolved context and persist the result.
///
/// The progress of `context` takes over the context's `active_scales`
/// before the answer is stored, so the saved record never loses the
/// current active set.
///
/// # Errors
/// - Missing or mistyped `progress` / `active_scales`.
/// - [`ContextError::InvalidFraction`]; nothing is saved then.
/// - Store failures as [`ContextError::Repository`].
pub fn record_answer(
    context: &Context, store: &dyn ProgressStore, question_id: u64, scale_id: u64, fraction: f64,
) -> ContextResult<Progress> {
    let mut progress = context.progress(keys::PROGRESS)?.clone();
    progress.set_active_scales(context.ids(keys::ACTIVE_SCALES)?.iter().copied());
    progress.record_response(question_id, scale_id, fraction)?;
    store.save(&progress)?;
    Ok(progress)
}
