// src/utils/scoring.rs

use std::collections::HashMap;

use crate::models::question::Question;

/// Counts correct answers against the authoritative question set.
///
/// Returns `(correct, total)` where `total` is always the full question count:
/// an unanswered question counts as wrong, never as excluded. Client-reported
/// scores are never consulted.
pub fn score_answers(
    questions: &[Question],
    answers: &HashMap<String, serde_json::Value>,
) -> (i64, i64) {
    let total = questions.len() as i64;
    let mut correct = 0;

    for question in questions {
        let key = question.id.to_string();
        if let Some(value) = answers.get(&key) {
            if coerce_answer(value) == Some(question.correct) {
                correct += 1;
            }
        }
    }

    (correct, total)
}

/// Coerces a submitted answer value to an option index.
/// Accepts JSON numbers and numeric strings; anything else scores as wrong.
fn coerce_answer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Maps a score percentage to `(scholarship_percent, message)`.
pub fn scholarship_for(percentage: f64) -> (u32, &'static str) {
    if percentage >= 100.0 {
        (95, "Great scholarship opportunity for a brilliant mind - Congratulations!")
    } else if percentage >= 90.0 {
        (70, "What a score - Well Done!")
    } else if percentage >= 75.0 {
        (50, "Good effort!")
    } else if percentage >= 50.0 {
        (25, "Quarter Scholarship - Keep Trying!")
    } else {
        (10, "A scholarship for participation - Don't give up, keep learning!")
    }
}

/// Per-class test length; unknown classes get an hour.
pub fn test_duration_minutes(class_level: &str) -> u32 {
    match class_level {
        "class9" | "class10" => 30,
        "class11" => 40,
        "class12" | "dropper" => 45,
        _ => 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: i64, correct: i64) -> Question {
        Question {
            id,
            prompt: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct,
        }
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        // Correct indices [1, 0, 2, 3, 1]; ids 0, 1, 3 answered, 2 and 4 not.
        let questions: Vec<Question> = [1, 0, 2, 3, 1]
            .iter()
            .enumerate()
            .map(|(id, &correct)| question(id as i64, correct))
            .collect();

        let mut answers = HashMap::new();
        answers.insert("0".to_string(), json!(1));
        answers.insert("1".to_string(), json!(1));
        answers.insert("3".to_string(), json!(3));

        assert_eq!(score_answers(&questions, &answers), (2, 5));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let questions = vec![question(7, 2)];
        let mut answers = HashMap::new();
        answers.insert("7".to_string(), json!("2"));

        assert_eq!(score_answers(&questions, &answers), (1, 1));
    }

    #[test]
    fn garbage_answer_values_score_as_wrong() {
        let questions = vec![question(1, 0), question(2, 1)];
        let mut answers = HashMap::new();
        answers.insert("1".to_string(), json!([0]));
        answers.insert("2".to_string(), json!("not a number"));

        assert_eq!(score_answers(&questions, &answers), (0, 2));
    }

    #[test]
    fn empty_set_scores_zero_of_zero() {
        assert_eq!(score_answers(&[], &HashMap::new()), (0, 0));
    }

    #[test]
    fn answers_for_unknown_ids_are_ignored() {
        let questions = vec![question(1, 3)];
        let mut answers = HashMap::new();
        answers.insert("99".to_string(), json!(3));

        assert_eq!(score_answers(&questions, &answers), (0, 1));
    }

    #[test]
    fn scholarship_bands() {
        assert_eq!(scholarship_for(100.0).0, 95);
        assert_eq!(scholarship_for(92.5).0, 70);
        assert_eq!(scholarship_for(75.0).0, 50);
        assert_eq!(scholarship_for(60.0).0, 25);
        assert_eq!(scholarship_for(10.0).0, 10);
    }

    #[test]
    fn durations_per_class() {
        assert_eq!(test_duration_minutes("class9"), 30);
        assert_eq!(test_duration_minutes("class11"), 40);
        assert_eq!(test_duration_minutes("dropper"), 45);
        assert_eq!(test_duration_minutes("unknown"), 60);
    }
}
