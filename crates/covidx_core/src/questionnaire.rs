//! Paginated yes/no questionnaire: answers, page navigation and submission state.

use crate::error::SubmitError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of questions shown per page.
pub const PAGE_SIZE: usize = 5;

/// One yes/no question and the key its answer is sent under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDefinition {
    pub text: String,
    pub key: String,
}

impl QuestionDefinition {
    pub fn new(text: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            key: key.into(),
        }
    }
}

/// The fixed COVID risk questionnaire.
pub fn covid_questions() -> Vec<QuestionDefinition> {
    [
        ("Do you have difficulty breathing?", "breathing"),
        ("Do you have a fever?", "fever"),
        ("Do you have dry cough?", "cough"),
        ("Do you have a sore throat?", "soreThroat"),
        ("Do you have hyper tension?", "hyperTension"),
        ("Did you travel abroad recently?", "abroad"),
        (
            "Have you been in contact with a COVID patient recently?",
            "contact",
        ),
        ("Did you attend a large gathering recently?", "gathering"),
        ("Did you visit public exposed places recently?", "exposed"),
        (
            "Do you have any family members that works in public exposed places?",
            "family",
        ),
    ]
    .into_iter()
    .map(|(text, key)| QuestionDefinition::new(text, key))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question key: {0}")]
pub struct UnknownQuestion(pub String);

/// Answers keyed by question, in question order. Unanswered questions are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    keys: Vec<String>,
    values: Vec<Option<Answer>>,
}

impl AnswerSet {
    pub fn new(questions: &[QuestionDefinition]) -> Self {
        Self {
            keys: questions.iter().map(|q| q.key.clone()).collect(),
            values: vec![None; questions.len()],
        }
    }

    pub fn get(&self, key: &str) -> Option<Answer> {
        self.position(key).and_then(|i| self.values[i])
    }

    /// Records or overwrites the answer for `key`.
    pub fn set(&mut self, key: &str, answer: Answer) -> Result<(), UnknownQuestion> {
        let idx = self
            .position(key)
            .ok_or_else(|| UnknownQuestion(key.to_string()))?;
        self.values[idx] = Some(answer);
        Ok(())
    }

    pub fn answered(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Answer)> {
        self.keys
            .iter()
            .zip(&self.values)
            .filter_map(|(k, v)| v.map(|a| (k.as_str(), a)))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

impl Serialize for AnswerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.answered()))?;
        for (key, answer) in self.iter() {
            map.serialize_entry(key, &answer)?;
        }
        map.end()
    }
}

/// Body sent to the questionnaire classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub answer: AnswerSet,
}

/// Classifier verdict. `prediction` is 1 for a positive result; any other value is negative.
///
/// `prediction` is kept as `f64` so both `1` and `1.0` are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: f64,
    pub confidence: f64,
}

impl PredictionResult {
    pub fn is_positive(&self) -> bool {
        self.prediction == 1.0
    }

    pub fn message(&self) -> String {
        if self.is_positive() {
            format!(
                "There is a {:.2}% chance that you have COVID.",
                self.confidence
            )
        } else {
            format!(
                "There is a {:.2}% chance that you don't have COVID.",
                self.confidence
            )
        }
    }
}

/// Page-based position in the question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_count: usize,
    total: usize,
}

impl Pagination {
    pub fn new(total: usize) -> Self {
        Self {
            page: 0,
            page_count: total.div_ceil(PAGE_SIZE).max(1),
            total,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Index of the first question on the current page.
    pub fn current_index(&self) -> usize {
        self.page * PAGE_SIZE
    }

    pub fn has_next(&self) -> bool {
        self.current_index() + PAGE_SIZE < self.total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn is_final_page(&self) -> bool {
        !self.has_next()
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Question index range shown on the current page.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.current_index().min(self.total);
        start..(start + PAGE_SIZE).min(self.total)
    }
}

/// Identifies one rendered question; unique across the whole questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioId {
    pub page: usize,
    pub slot: usize,
}

impl fmt::Display for RadioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}-{}", self.page, self.slot)
    }
}

/// Questionnaire container: owns the questions, answers, page and submission outcome.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<QuestionDefinition>,
    answers: AnswerSet,
    pagination: Pagination,
    in_flight: bool,
    /// Outcome of the last completed submission; replaced only when the next one completes.
    last_outcome: Option<Result<PredictionResult, SubmitError>>,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new(covid_questions())
    }
}

impl Questionnaire {
    pub fn new(questions: Vec<QuestionDefinition>) -> Self {
        let answers = AnswerSet::new(&questions);
        let pagination = Pagination::new(questions.len());
        Self {
            questions,
            answers,
            pagination,
            in_flight: false,
            last_outcome: None,
        }
    }

    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn last_outcome(&self) -> Option<&Result<PredictionResult, SubmitError>> {
        self.last_outcome.as_ref()
    }

    /// Verdict of the last successful submission, if the last one succeeded.
    pub fn result(&self) -> Option<&PredictionResult> {
        self.last_outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn current_index(&self) -> usize {
        self.pagination.current_index()
    }

    pub fn select_answer(&mut self, key: &str, answer: Answer) -> Result<(), UnknownQuestion> {
        self.answers.set(key, answer)?;
        tracing::debug!("answer {key} = {}", answer.label());
        Ok(())
    }

    pub fn can_go_next(&self) -> bool {
        self.pagination.has_next()
    }

    pub fn can_go_previous(&self) -> bool {
        self.pagination.has_previous()
    }

    pub fn can_submit(&self) -> bool {
        self.pagination.is_final_page()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous()
    }

    /// Questions on the current page with their radio ids and current answers.
    pub fn visible_questions(
        &self,
    ) -> impl Iterator<Item = (RadioId, &QuestionDefinition, Option<Answer>)> {
        let page = self.pagination.page();
        self.questions[self.pagination.visible_range()]
            .iter()
            .enumerate()
            .map(move |(slot, q)| (RadioId { page, slot }, q, self.answers.get(&q.key)))
    }

    /// Marks a submission as in flight and returns the request body to send.
    pub fn begin_submit(&mut self) -> Result<PredictionRequest, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }
        if !self.can_submit() {
            return Err(SubmitError::NotOnFinalPage);
        }
        self.in_flight = true;
        tracing::debug!(
            "submitting {}/{} answers",
            self.answers.answered(),
            self.questions.len()
        );
        Ok(PredictionRequest {
            answer: self.answers.clone(),
        })
    }

    pub fn finish_submit(&mut self, outcome: Result<PredictionResult, SubmitError>) {
        if let Err(err) = &outcome {
            tracing::warn!("questionnaire submission failed: {err}");
        }
        self.in_flight = false;
        self.last_outcome = Some(outcome);
    }

    /// Runs a whole submission against `service` on the current thread.
    pub fn submit<S>(&mut self, service: &S) -> Result<PredictionResult, SubmitError>
    where
        S: crate::PredictionService + ?Sized,
    {
        let request = self.begin_submit()?;
        let outcome = service.predict(&request);
        self.finish_submit(outcome.clone());
        outcome
    }
}
