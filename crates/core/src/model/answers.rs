use std::collections::BTreeMap;

use crate::model::exam::Test;
use crate::model::ids::{ChoiceId, QuestionId};

/// One submitted answer, as sent to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerPair {
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

/// The learner's selections during one attempt.
///
/// Keys are unique; a later selection for the same question replaces the
/// earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    selected: BTreeMap<QuestionId, ChoiceId>,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, returning the previously selected choice if any.
    pub fn select(&mut self, question_id: QuestionId, choice_id: ChoiceId) -> Option<ChoiceId> {
        self.selected.insert(question_id, choice_id)
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<ChoiceId> {
        self.selected.get(&question_id).copied()
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.selected.contains_key(&question_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, ChoiceId)> + '_ {
        self.selected.iter().map(|(q, c)| (*q, *c))
    }

    /// Questions of `test` without a selection.
    #[must_use]
    pub fn unanswered_in(&self, test: &Test) -> usize {
        test.questions().filter(|q| !self.is_answered(q.id())).count()
    }

    /// Submission payload, ordered by question id.
    #[must_use]
    pub fn to_submission(&self) -> Vec<AnswerPair> {
        self.iter()
            .map(|(question_id, choice_id)| AnswerPair {
                question_id,
                choice_id,
            })
            .collect()
    }
}

impl FromIterator<(QuestionId, ChoiceId)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (QuestionId, ChoiceId)>>(iter: T) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_selection_overwrites() {
        let mut answers = AnswerMap::new();
        assert_eq!(answers.select(QuestionId::new(1), ChoiceId::new(10)), None);
        assert_eq!(
            answers.select(QuestionId::new(1), ChoiceId::new(11)),
            Some(ChoiceId::new(10))
        );
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(QuestionId::new(1)), Some(ChoiceId::new(11)));
    }

    #[test]
    fn submission_is_ordered_by_question() {
        let mut answers = AnswerMap::new();
        answers.select(QuestionId::new(9), ChoiceId::new(90));
        answers.select(QuestionId::new(2), ChoiceId::new(20));
        answers.select(QuestionId::new(5), ChoiceId::new(50));

        let ids: Vec<u64> = answers
            .to_submission()
            .iter()
            .map(|pair| pair.question_id.value())
            .collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
