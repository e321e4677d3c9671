//! Scoring and review derived from a finished session.

use crate::models::Question;

use super::session::{FinishReason, TIME_BUDGET_SECS};

/// Score summary for one quiz attempt. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    /// `round(100 * score / total)`, 0 for an empty quiz.
    pub percentage: u32,
    pub answered: usize,
    pub time_used_secs: u32,
    pub reason: FinishReason,
}

impl QuizResult {
    pub fn compute(
        questions: &[Question],
        answers: &[Option<usize>],
        remaining_secs: u32,
        reason: FinishReason,
    ) -> Self {
        let score = questions
            .iter()
            .zip(answers)
            .filter(|(question, answer)| question.is_correct(**answer))
            .count();
        let total = questions.len();

        Self {
            score,
            total,
            percentage: percentage(score, total),
            answered: answers.iter().filter(|a| a.is_some()).count(),
            time_used_secs: TIME_BUDGET_SECS.saturating_sub(remaining_secs),
            reason,
        }
    }

    pub fn performance(&self) -> Performance {
        Performance::from_percentage(self.percentage)
    }
}

fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f64 * 100.0 / total as f64).round() as u32
}

/// Performance tier shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Exceptional,
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Performance {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Performance::Exceptional,
            80..=89 => Performance::Excellent,
            70..=79 => Performance::Good,
            60..=69 => Performance::Fair,
            _ => Performance::NeedsImprovement,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Performance::Exceptional => "Exceptional",
            Performance::Excellent => "Excellent",
            Performance::Good => "Good",
            Performance::Fair => "Fair",
            Performance::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Performance::Exceptional => {
                "Outstanding performance! You have mastered this material."
            }
            Performance::Excellent => {
                "Great job! You have a strong understanding of the content."
            }
            Performance::Good => "Well done! You have a good grasp of the material.",
            Performance::Fair => {
                "Not bad! Consider reviewing some topics for better understanding."
            }
            Performance::NeedsImprovement => "Keep learning! Review the material and try again.",
        }
    }
}

/// Outcome of a single question in the detailed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { chosen: usize },
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry<'a> {
    pub number: usize,
    pub question: &'a Question,
    pub verdict: Verdict,
}

impl ReviewEntry<'_> {
    pub fn chosen_text(&self) -> Option<&str> {
        match self.verdict {
            Verdict::Correct => self.question.correct_option(),
            Verdict::Incorrect { chosen } => self.question.option(chosen),
            Verdict::Unanswered => None,
        }
    }
}

pub fn review<'a>(questions: &'a [Question], answers: &[Option<usize>]) -> Vec<ReviewEntry<'a>> {
    questions
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(index, (question, answer))| {
            let verdict = match answer {
                None => Verdict::Unanswered,
                Some(_) if question.is_correct(*answer) => Verdict::Correct,
                Some(chosen) => Verdict::Incorrect { chosen: *chosen },
            };
            ReviewEntry {
                number: index + 1,
                question,
                verdict,
            }
        })
        .collect()
}

/// Format seconds as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: Option<usize>) -> Question {
        Question {
            text: "Q".to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_index: correct,
        }
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_unanswered_never_scores() {
        let questions = vec![question(Some(0)), question(None)];
        let result = QuizResult::compute(
            &questions,
            &[None, Some(0)],
            TIME_BUDGET_SECS,
            FinishReason::Submitted,
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.answered, 1);
        assert_eq!(result.time_used_secs, 0);
    }

    #[test]
    fn test_performance_tiers() {
        assert_eq!(Performance::from_percentage(100), Performance::Exceptional);
        assert_eq!(Performance::from_percentage(90), Performance::Exceptional);
        assert_eq!(Performance::from_percentage(85), Performance::Excellent);
        assert_eq!(Performance::from_percentage(70), Performance::Good);
        assert_eq!(Performance::from_percentage(60), Performance::Fair);
        assert_eq!(Performance::from_percentage(59), Performance::NeedsImprovement);
    }

    #[test]
    fn test_review_verdicts() {
        let questions = vec![question(Some(1)), question(Some(1)), question(Some(1))];
        let entries = review(&questions, &[Some(1), Some(2), None]);

        assert_eq!(entries[0].verdict, Verdict::Correct);
        assert_eq!(entries[1].verdict, Verdict::Incorrect { chosen: 2 });
        assert_eq!(entries[1].chosen_text(), Some("C"));
        assert_eq!(entries[2].verdict, Verdict::Unanswered);
        assert_eq!(entries[2].number, 3);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(61), "1:01");
    }
}
