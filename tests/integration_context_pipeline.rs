//! Integration tests for the context pipeline.
//!
//! Purpose
//! -------
//! - Run the standard loader set against in-memory repositories and check
//!   the contract of a resolution: termination, completeness and caching.
//! - Drive a short adaptive session end to end: resolve, pick a question,
//!   record the answer, re-estimate, invalidate, and resolve again.
//!
//! Coverage
//! --------
//! - `context::loaders`: the seven standard loaders and their ordering.
//! - `context::pipeline`: `resolve` and `resolve_cached`.
//! - `context::cache`: event-driven invalidation of cached contexts.
//! - `context::record_answer`: persistence of answers and of the active
//!   scales between requests.
//! - `estimation` and `statistics` as consumed by an adaptive loop.
//!
//! Exclusions
//! ----------
//! - Error paths of individual loaders; those are covered by unit tests.
//! - Question selection strategies beyond "most informative first".
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use approx::assert_relative_eq;
use rust_irt::{
    codec::ParamTree,
    context::{
        AbilityRepository, CacheEvent, CatSettings, Context, ContextCache, InMemoryAbilities,
        InMemoryCatalog, InMemoryContextCache, InMemoryProgressStore, Pipeline, ProgressStore,
        Question, ScaleNode, ScaleStrategy, keys, record_answer, standard_loaders,
        standard_pipeline,
    },
    estimation::{
        EstimateStatus, EstimatorOptions, PersonParameter, ResponseRecord, estimate_person_ability,
    },
    models::{CalculationStatus, ItemParameter, ModelKind},
    statistics::{InformationItem, rank_by_information, standard_error},
};

const ATTEMPT: u64 = 100;
const USER: u64 = 7;
const COMPONENT: u64 = 9;
const CONTEXT: u64 = 5;
const ROOT: u64 = 1;

// ---- Fixtures ----

fn question(id: u64, scale_id: u64, difficulty: f64, attempts: u32) -> Question {
    sharp_question(id, scale_id, difficulty, 1.2, attempts)
}

fn sharp_question(
    id: u64, scale_id: u64, difficulty: f64, discrimination: f64, attempts: u32,
) -> Question {
    let mut item = ItemParameter::new(
        id,
        "question",
        ModelKind::RaschBirnbaum,
        ParamTree::map([("difficulty", difficulty), ("discrimination", discrimination)]),
        CONTEXT,
    );
    item.status = CalculationStatus::Calculated;
    Question::new(id, scale_id, Some(item), attempts)
}

/// Root scale 1 with subscales 2 and 3; six calibrated questions and one
/// pilot question (13) with too few attempts.
fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_scale(ScaleNode::new(ROOT, None, "mathematics"))
        .with_scale(ScaleNode::new(2, Some(ROOT), "algebra"))
        .with_scale(ScaleNode::new(3, Some(ROOT), "geometry"))
        .with_question(CONTEXT, question(10, 2, -1.5, 120))
        .with_question(CONTEXT, question(11, 2, -0.5, 120))
        .with_question(CONTEXT, question(12, 2, 0.5, 120))
        .with_question(CONTEXT, question(13, 2, 0.0, 2))
        .with_question(CONTEXT, question(20, 3, -1.0, 120))
        .with_question(CONTEXT, question(21, 3, 0.0, 120))
        .with_question(CONTEXT, question(22, 3, 1.0, 120))
}

/// Same scales; scale 2 holds three highly discriminating questions at
/// b = 0, so two answers make it precise near ability 0 only.
fn sharp_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_scale(ScaleNode::new(ROOT, None, "mathematics"))
        .with_scale(ScaleNode::new(2, Some(ROOT), "algebra"))
        .with_scale(ScaleNode::new(3, Some(ROOT), "geometry"))
        .with_question(CONTEXT, sharp_question(10, 2, 0.0, 6.0, 120))
        .with_question(CONTEXT, sharp_question(11, 2, 0.0, 6.0, 120))
        .with_question(CONTEXT, sharp_question(12, 2, 0.0, 6.0, 120))
        .with_question(CONTEXT, question(20, 3, -1.0, 120))
        .with_question(CONTEXT, question(21, 3, 1.0, 120))
}

struct Session {
    pipeline: Pipeline,
    abilities: Arc<InMemoryAbilities>,
    progress: Arc<InMemoryProgressStore>,
    cache: InMemoryContextCache,
}

fn session() -> Session {
    session_over(catalog())
}

fn session_over(catalog: InMemoryCatalog) -> Session {
    let abilities = Arc::new(InMemoryAbilities::new());
    let progress = Arc::new(InMemoryProgressStore::new());
    let pipeline = standard_pipeline(Arc::new(catalog), abilities.clone(), progress.clone())
        .expect("standard loaders form a valid pipeline");
    Session { pipeline, abilities, progress, cache: InMemoryContextCache::new() }
}

fn seed() -> Context {
    seed_with(CatSettings::default())
}

fn seed_with(settings: CatSettings) -> Context {
    Context::seed(ATTEMPT, USER, COMPONENT, CONTEXT, ROOT, settings)
}

// ---- Resolution contract ----

#[test]
// Purpose
// -------
// A fresh resolution runs every loader once and fills every key.
//
// Given
// -----
// - The standard pipeline, an empty ability store and no stored progress.
//
// Expect
// ------
// - Exactly 7 invocations, none skipped.
// - The context holds the seed keys and the union of all provided keys.
// - First question; pilot 13 flagged; default standard errors; only the
//   root scale active.
fn fresh_resolution_fills_every_key() {
    let s = session();

    let resolution = s.pipeline.resolve(seed()).expect("resolution succeeds");
    let context = &resolution.context;

    assert_eq!(resolution.invoked.len(), s.pipeline.len());
    assert_eq!(resolution.invoked.len(), 7);
    assert!(resolution.skipped.is_empty());
    assert!(context.contains_all(&keys::SEED));
    for key in s.pipeline.provided_keys() {
        assert!(context.contains(key), "missing {key}");
    }

    assert!(context.flag(keys::IS_FIRST_QUESTION).expect("flag"));
    assert_eq!(context.ids(keys::PILOT_QUESTIONS).expect("ids"), &BTreeSet::from([13]));
    assert_eq!(context.questions(keys::QUESTIONS).expect("questions")[&ROOT].len(), 7);
    assert_eq!(context.questions(keys::QUESTIONS).expect("questions")[&3].len(), 3);
    for se in context.scalars(keys::STANDARD_ERRORS).expect("scalars").values() {
        assert_eq!(*se, 1.0);
    }
    assert_eq!(context.ids(keys::ACTIVE_SCALES).expect("ids"), &BTreeSet::from([ROOT]));
}

#[test]
// Purpose
// -------
// Loader order respects every dependency regardless of registration order.
//
// Given
// -----
// - The standard loaders registered in reverse.
//
// Expect
// ------
// - Each loader runs after the providers of all its required keys.
fn order_respects_dependencies() {
    let mut loaders = standard_loaders(
        Arc::new(catalog()),
        Arc::new(InMemoryAbilities::new()),
        Arc::new(InMemoryProgressStore::new()),
    );
    loaders.reverse();
    let pipeline = Pipeline::new(loaders, &keys::SEED).expect("valid pipeline");

    let order = pipeline.order_names();
    let position = |name: &str| order.iter().position(|n| *n == name).expect("registered");

    assert!(position("scale_tree") < position("person_ability"));
    assert!(position("person_ability") < position("progress"));
    assert!(position("progress") < position("questions"));
    assert!(position("questions") < position("pilot"));
    assert!(position("pilot") < position("active_scales"));
    assert!(position("standard_error") < position("active_scales"));
}

#[test]
// Purpose
// -------
// A cached context is reused until an event invalidates it.
//
// Given
// -----
// - Two cached resolutions of the same seed, then an ability update for
//   another user, then one for this user.
//
// Expect
// ------
// - The second pass invokes nothing and skips all 7 loaders.
// - The unrelated event keeps the entry; the matching event drops it and
//   the next pass invokes all 7 again.
fn cache_reuses_until_invalidated() {
    let s = session();

    let first = s.pipeline.resolve_cached(seed(), &s.cache).expect("first pass");
    let second = s.pipeline.resolve_cached(seed(), &s.cache).expect("second pass");

    assert_eq!(first.invoked.len(), 7);
    assert!(second.invoked.is_empty());
    assert_eq!(second.skipped.len(), 7);
    assert_eq!(second.context, first.context);
    assert_eq!(s.cache.len(), 1);

    assert_eq!(s.cache.invalidate(&CacheEvent::AbilityUpdated { person_id: USER + 1 }).ok(), Some(0));
    assert_eq!(s.cache.invalidate(&CacheEvent::AbilityUpdated { person_id: USER }).ok(), Some(1));

    let third = s.pipeline.resolve_cached(seed(), &s.cache).expect("third pass");
    assert_eq!(third.invoked.len(), 7);
}

// ---- Adaptive session ----

#[test]
// Purpose
// -------
// Run a complete adaptive session through the pipeline.
//
// Given
// -----
// - Classical CAT on the root scale with the default threshold 0.3; six
//   operational questions with discrimination 1.2 cannot reach it.
// - A deterministic examinee answering correctly iff difficulty ≤ 0.
//
// Expect
// ------
// - Each round re-runs all loaders after the invalidation events.
// - The pilot question is never selected; answered questions disappear.
// - The session ends when the root scale runs out of operational
//   questions, after exactly 6 answers.
// - The final ability is a converged interior estimate near 0.47 and the
//   root standard error matches 1/√I over the answered items.
fn adaptive_session_exhausts_operational_questions() {
    let s = session();
    let opts = EstimatorOptions::default();
    let mut items: HashMap<u64, ItemParameter> = HashMap::new();
    let mut asked = Vec::new();
    let mut last_ability = None;

    for round in 0..10 {
        let resolution = s.pipeline.resolve_cached(seed(), &s.cache).expect("resolution");
        assert_eq!(resolution.invoked.len(), 7, "round {round}");
        let context = resolution.context;

        let active = context.ids(keys::ACTIVE_SCALES).expect("ids");
        if !active.contains(&ROOT) {
            break;
        }
        let pilot = context.ids(keys::PILOT_QUESTIONS).expect("ids");
        let ability = context.scalars(keys::PERSON_ABILITY).expect("scalars")[&ROOT];
        let candidates: Vec<(Question, InformationItem)> = context
            .questions(keys::QUESTIONS)
            .expect("questions")[&ROOT]
            .iter()
            .filter(|q| !pilot.contains(&q.id))
            .filter_map(|q| q.information_item().map(|item| (q.clone(), item)))
            .collect();
        let pool: Vec<InformationItem> = candidates.iter().map(|(_, item)| *item).collect();
        let best = rank_by_information(ability, &pool)[0].0;
        let (chosen, _) =
            candidates.iter().find(|(q, _)| q.id == best).expect("ranked candidate exists");
        assert!(!asked.contains(&chosen.id));

        let difficulty = chosen.calibrated_params().expect("calibrated").difficulty;
        let fraction = if difficulty <= 0.0 { 1.0 } else { 0.0 };
        let progress =
            record_answer(&context, s.progress.as_ref(), chosen.id, chosen.scale_id, fraction)
                .expect("answer recorded");
        asked.push(chosen.id);
        if let Some(item) = &chosen.item {
            items.insert(chosen.id, item.clone());
        }

        let responses: Vec<ResponseRecord> = progress
            .responses
            .iter()
            .map(|(id, answer)| ResponseRecord::new(USER, *id, answer.fraction))
            .collect();
        let estimate = estimate_person_ability(&responses, &items, &opts).expect("estimate");
        s.abilities
            .save(PersonParameter::from_estimate(USER, ROOT, CONTEXT, &estimate))
            .expect("save ability");
        last_ability = Some(estimate);

        s.cache.invalidate(&CacheEvent::ResponseRecorded { attempt_id: ATTEMPT }).expect("invalidate");
        s.cache.invalidate(&CacheEvent::AbilityUpdated { person_id: USER }).expect("invalidate");
    }

    asked.sort_unstable();
    assert_eq!(asked, vec![10, 11, 12, 20, 21, 22]);

    let estimate = last_ability.expect("at least one answer");
    assert_eq!(estimate.status, EstimateStatus::Converged);
    assert!(estimate.ability > 0.25 && estimate.ability < 0.75);

    let stored = s.progress.load(ATTEMPT, COMPONENT).expect("load").expect("stored progress");
    assert!(!stored.first_question);
    assert_eq!(stored.answered_count(), 6);

    let context = s.pipeline.resolve_cached(seed(), &s.cache).expect("final pass").context;
    assert!(context.ids(keys::ACTIVE_SCALES).expect("ids").is_empty());
    let answered: Vec<InformationItem> = items
        .values()
        .map(|item| InformationItem::from_parameter(item).expect("valid item"))
        .collect();
    assert_relative_eq!(
        context.scalars(keys::STANDARD_ERRORS).expect("scalars")[&ROOT],
        standard_error(estimate.ability, &answered),
        epsilon = 1e-9
    );
}

#[test]
// Purpose
// -------
// A scale deactivated in one request stays inactive in later requests,
// even when its standard error climbs back over the threshold.
//
// Given
// -----
// - The all-subscales strategy over the sharp catalog.
// - Two answers on scale 2 at the default ability 0, each followed by a
//   response event and a fresh resolution.
// - Then a stored ability of 3 for scale 2 and an ability event, with no
//   new answer.
//
// Expect
// ------
// - Rounds 1 and 2: every scale active; round 3: only scale 3, and the
//   stored progress holds {3}.
// - After the ability update the standard error of scale 2 is above 0.3
//   again, yet the active set is still {3}.
fn deactivated_scale_stays_inactive_across_requests() {
    let s = session_over(sharp_catalog());
    let settings = CatSettings::default().with_strategy(ScaleStrategy::InferAllSubscales);
    let resolve = || {
        s.pipeline.resolve_cached(seed_with(settings.clone()), &s.cache).expect("resolution").context
    };
    let answer = |context: &Context, question_id: u64| {
        record_answer(context, s.progress.as_ref(), question_id, 2, 1.0).expect("answer recorded");
        s.cache.invalidate(&CacheEvent::ResponseRecorded { attempt_id: ATTEMPT }).expect("invalidate");
    };

    let first = resolve();
    assert_eq!(first.ids(keys::ACTIVE_SCALES).expect("ids"), &BTreeSet::from([ROOT, 2, 3]));
    answer(&first, 10);

    let second = resolve();
    assert_eq!(second.ids(keys::ACTIVE_SCALES).expect("ids"), &BTreeSet::from([ROOT, 2, 3]));
    answer(&second, 11);

    let third = resolve();
    assert!(third.scalars(keys::STANDARD_ERRORS).expect("scalars")[&2] < 0.3);
    assert_eq!(third.ids(keys::ACTIVE_SCALES).expect("ids"), &BTreeSet::from([3]));
    let stored = s.progress.load(ATTEMPT, COMPONENT).expect("load").expect("stored progress");
    assert_eq!(stored.active_scales, Some(BTreeSet::from([3])));
    assert_eq!(stored.answered_count(), 2);

    s.abilities
        .save(PersonParameter {
            person_id: USER,
            scale_id: 2,
            context_id: CONTEXT,
            ability: 3.0,
            standard_error: 0.2,
            status: EstimateStatus::Converged,
        })
        .expect("save ability");
    s.cache.invalidate(&CacheEvent::AbilityUpdated { person_id: USER }).expect("invalidate");

    let fourth = resolve();
    assert!(fourth.scalars(keys::STANDARD_ERRORS).expect("scalars")[&2] > 0.3);
    assert_eq!(fourth.ids(keys::ACTIVE_SCALES).expect("ids"), &BTreeSet::from([3]));
}
