//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, InterestCategory, ProficiencyTier, QuestionAnswer, QuizQuestion, Submission};
use crate::logic::{SubmissionOutcome, Tone};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InterestOut {
    pub id: i64,
    pub name: String,
}

impl From<InterestCategory> for InterestOut {
    fn from(i: InterestCategory) -> Self {
        Self { id: i.id, name: i.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    #[serde(alias = "kategori_minat")]
    pub interest: String,
}

/// A served question. The answer key never appears here.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizQuestionOut {
    pub question_id: i64,
    pub question_desc: String,
    pub option_1: String,
    pub option_2: String,
    pub option_3: String,
    pub option_4: String,
    pub difficulty: Difficulty,
}

pub fn to_out(q: QuizQuestion) -> QuizQuestionOut {
    let [option_1, option_2, option_3, option_4] = q.options;
    QuizQuestionOut {
        question_id: q.id,
        question_desc: q.prompt,
        option_1,
        option_2,
        option_3,
        option_4,
        difficulty: q.difficulty,
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub question_id: i64,
    /// Text of the chosen option.
    pub selected_answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    #[serde(alias = "kategori_minat")]
    pub interest: String,
    pub level: Difficulty,
    pub answers: Vec<AnswerIn>,
}

impl From<SubmitIn> for Submission {
    fn from(s: SubmitIn) -> Self {
        Submission {
            interest: s.interest,
            declared_level: s.level,
            answers: s
                .answers
                .into_iter()
                .map(|a| QuestionAnswer { question_id: a.question_id, selected_option: a.selected_answer })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOut {
    pub bot_response: String,
    pub suggested_course_name: String,
    pub suggested_course_id: Option<i64>,
    pub score: u32,
    pub total: u32,
    pub tier: ProficiencyTier,
    pub level_ordinal: u8,
    pub narration_degraded: bool,
}

impl From<SubmissionOutcome> for SubmitOut {
    fn from(o: SubmissionOutcome) -> Self {
        Self {
            bot_response: o.narration,
            suggested_course_name: o.course.name,
            suggested_course_id: o.course.id,
            score: o.grade.score,
            total: o.grade.total,
            tier: o.tier,
            level_ordinal: o.tier.level_ordinal(),
            narration_degraded: o.narration_degraded,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskIn {
    pub question: String,
    #[serde(default)]
    pub preset: Tone,
}

#[derive(Debug, Deserialize)]
pub struct ProgressIn {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BotOut {
    pub bot_response: String,
}
