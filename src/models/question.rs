use serde::{Deserialize, Serialize};
use tracing::warn;

/// A multiple-choice question in the shape the quiz flow consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    /// Index into `options`. `None` means the source named no valid answer,
    /// so the question can never be scored correct.
    pub correct_index: Option<usize>,
}

impl Question {
    /// Whether `answer` matches the correct option. Unanswered never matches.
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        matches!((answer, self.correct_index), (Some(a), Some(c)) if a == c)
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.correct_index
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// Correct answer as emitted by the generator: either an index or the text
/// of the matching option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Index(i64),
    Text(String),
}

/// Question as it arrives from the generation process, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(
        rename = "correctAnswer",
        alias = "correct_answer",
        alias = "correctIndex",
        default
    )]
    pub correct_answer: Option<CorrectAnswer>,
}

impl RawQuestion {
    /// Resolve the correct answer to an option index.
    ///
    /// Text answers resolve to the first option that matches exactly. Text
    /// with no match, and indices outside the option list, resolve to `None`.
    pub fn normalize(self) -> Question {
        let correct_index = match &self.correct_answer {
            Some(CorrectAnswer::Index(index)) => usize::try_from(*index)
                .ok()
                .filter(|index| *index < self.options.len()),
            Some(CorrectAnswer::Text(text)) => self.options.iter().position(|o| o == text),
            None => None,
        };

        Question {
            text: self.text,
            options: self.options,
            correct_index,
        }
    }
}

/// Normalize a generated batch, dropping questions with fewer than two options.
pub fn normalize_questions(raw: Vec<RawQuestion>) -> Vec<Question> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, question)| {
            if question.options.len() < 2 {
                warn!(
                    index,
                    options = question.options.len(),
                    "dropping question with too few options"
                );
                return None;
            }
            Some(question.normalize())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(options: &[&str], answer: Option<CorrectAnswer>) -> RawQuestion {
        RawQuestion {
            text: "Capital of France?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: answer,
        }
    }

    #[test]
    fn test_text_answer_resolves_to_first_match() {
        let question = raw(
            &["London", "Paris", "Paris"],
            Some(CorrectAnswer::Text("Paris".to_string())),
        )
        .normalize();
        assert_eq!(question.correct_index, Some(1));
    }

    #[test]
    fn test_unmatched_text_answer_is_never_correct() {
        let question = raw(
            &["London", "Berlin", "Madrid"],
            Some(CorrectAnswer::Text("Paris".to_string())),
        )
        .normalize();

        assert_eq!(question.correct_index, None);
        assert!((0..3).all(|i| !question.is_correct(Some(i))));
        assert!(!question.is_correct(None));
    }

    #[test]
    fn test_index_out_of_range_resolves_to_none() {
        assert_eq!(
            raw(&["A", "B"], Some(CorrectAnswer::Index(2))).normalize().correct_index,
            None
        );
        assert_eq!(
            raw(&["A", "B"], Some(CorrectAnswer::Index(-1))).normalize().correct_index,
            None
        );
        assert_eq!(
            raw(&["A", "B"], Some(CorrectAnswer::Index(1))).normalize().correct_index,
            Some(1)
        );
    }

    #[test]
    fn test_generator_field_names_deserialize() {
        let json = r#"[
            {"question": "Q1", "options": ["a", "b"], "correctAnswer": 0},
            {"text": "Q2", "options": ["a", "b"], "correct_answer": "b"},
            {"question": "Q3", "options": ["a", "b"], "correctIndex": 1}
        ]"#;
        let raw: Vec<RawQuestion> = serde_json::from_str(json).unwrap();
        let questions: Vec<_> = raw.into_iter().map(RawQuestion::normalize).collect();

        assert_eq!(questions[0].text, "Q1");
        assert_eq!(questions[0].correct_index, Some(0));
        assert_eq!(questions[1].correct_index, Some(1));
        assert_eq!(questions[2].correct_index, Some(1));
    }

    #[test]
    fn test_normalize_questions_drops_single_option() {
        let batch = vec![
            raw(&["only"], Some(CorrectAnswer::Index(0))),
            raw(&["A", "B"], Some(CorrectAnswer::Index(0))),
        ];
        let questions = normalize_questions(batch);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_option(), Some("A"));
    }

    #[test]
    fn test_canonical_wire_shape() {
        let question = raw(&["A", "B"], None).normalize();
        let json = serde_json::to_string(&question).unwrap();
        assert!(json.contains("\"correctIndex\":null"));
    }
}
