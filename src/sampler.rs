//! Quiz sampling: three concurrent tier retrievals joined before drawing a random subset
//! from each pool.
//!
//! The join is fail-fast: one tier failing aborts the whole quiz, since a quiz missing a
//! tier is incomplete. The fan-out as a whole is bounded by `Tuning::fanout_timeout`.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::Tuning;
use crate::domain::{Difficulty, QuizQuestion, QuizSet};
use crate::error::EngineError;
use crate::sources::QuestionBank;

/// Questions drawn per difficulty tier.
pub const QUESTIONS_PER_TIER: usize = 5;

/// Uniform sample of `count` items without replacement; small pools are returned whole.
pub fn pick_random<T: Clone, R: Rng + ?Sized>(pool: &[T], count: usize, rng: &mut R) -> Vec<T> {
  if pool.len() <= count {
    return pool.to_vec();
  }
  pool.choose_multiple(rng, count).cloned().collect()
}

#[instrument(level = "info", skip(bank, tuning), fields(%taxonomy_label))]
pub async fn sample(bank: &dyn QuestionBank, taxonomy_label: &str, tuning: &Tuning) -> Result<QuizSet, EngineError> {
  let [beginner, intermediate, advanced] = Difficulty::ALL;
  // A pool smaller than the draw would starve every tier.
  let limit = tuning.pool_limit.max(QUESTIONS_PER_TIER);

  let fan_out = async {
    tokio::try_join!(
      bank.question_pool(taxonomy_label, beginner, limit),
      bank.question_pool(taxonomy_label, intermediate, limit),
      bank.question_pool(taxonomy_label, advanced, limit),
    )
  };

  let (pool_b, pool_i, pool_a) = tokio::time::timeout(tuning.fanout_timeout(), fan_out)
    .await
    .map_err(|_| EngineError::UpstreamTimeout)??;

  debug!(target: "quiz", beginner = pool_b.len(), intermediate = pool_i.len(), advanced = pool_a.len(), "Tier pools fetched");

  // ThreadRng is !Send; keep it out of any await.
  let quiz = {
    let mut rng = rand::thread_rng();
    let questions: Vec<QuizQuestion> = [&pool_b, &pool_i, &pool_a]
      .into_iter()
      .flat_map(|pool| pick_random(pool, QUESTIONS_PER_TIER, &mut rng))
      .collect();
    QuizSet { questions }
  };

  if quiz.is_empty() {
    return Err(EngineError::NotFound(format!("no quiz exists for category '{taxonomy_label}'")));
  }

  info!(
    target: "quiz", %taxonomy_label,
    beginner = quiz.count_for(beginner), intermediate = quiz.count_for(intermediate), advanced = quiz.count_for(advanced),
    "Quiz sampled"
  );
  Ok(quiz)
}
