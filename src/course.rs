//! Course recommendation: interest → learning path → course at the tier's level.
//!
//! Recommendation is advisory, so both lookups degrade to fixed defaults instead of
//! failing the request.

use tracing::{info, instrument, warn};

use crate::domain::{Course, ProficiencyTier};
use crate::sources::Catalog;

/// Path used when the interest has no learning path in the catalog.
pub const DEFAULT_LEARNING_PATH_ID: i64 = 1;
/// Shown when no concrete course exists for the path and level.
pub const GENERIC_COURSE_NAME: &str = "Kursus Umum";

pub fn generic_course() -> Course {
  Course { id: None, name: GENERIC_COURSE_NAME.to_string() }
}

#[instrument(level = "info", skip(catalog), fields(%interest, tier = tier.label()))]
pub async fn resolve_course(catalog: &dyn Catalog, interest: &str, tier: ProficiencyTier) -> Course {
  let path_id = match catalog.learning_path_id(interest).await {
    Ok(Some(id)) => id,
    Ok(None) => {
      info!(target: "recommend", %interest, "No learning path for interest; using default path");
      DEFAULT_LEARNING_PATH_ID
    }
    Err(e) => {
      warn!(target: "recommend", %interest, error = %e, "Learning path lookup failed; using default path");
      DEFAULT_LEARNING_PATH_ID
    }
  };

  let level = tier.level_ordinal();
  match catalog.course_at_level(path_id, level).await {
    Ok(Some(course)) => {
      info!(target: "recommend", path_id, level, course = %course.name, "Course resolved");
      course
    }
    Ok(None) => {
      info!(target: "recommend", path_id, level, "No course at level; using generic course");
      generic_course()
    }
    Err(e) => {
      warn!(target: "recommend", path_id, level, error = %e, "Course lookup failed; using generic course");
      generic_course()
    }
  }
}
