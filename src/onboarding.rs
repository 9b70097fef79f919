use crate::catalog::{TrackCatalog, DEFAULT_TRACK_ID};

/// A yes/no question; answering "no" points the learner at `track_if_no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub track_if_no: &'static str,
}

pub const QUESTIONS: [Question; 3] = [
    Question {
        prompt: "Can you write your own name?",
        track_if_no: "meu-nome",
    },
    Question {
        prompt: "Can you read short words, like CASA or LIVRO?",
        track_if_no: "palavras-simples",
    },
    Question {
        prompt: "Do you use a mobile phone day to day?",
        track_if_no: "mundo-digital",
    },
];

/// Learners who answer yes to everything start with the digital skills track.
const CONFIDENT_TRACK: &str = "mundo-digital";

/// First "no" wins; missing answers count as not asked.
pub fn recommend(answers: &[bool]) -> &'static str {
    QUESTIONS
        .iter()
        .zip(answers)
        .find(|&(_, &yes)| !yes)
        .map(|(q, _)| q.track_if_no)
        .unwrap_or(CONFIDENT_TRACK)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Onboarding {
    answers: Vec<bool>,
}

impl Onboarding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        if self.is_finished() {
            None
        } else {
            QUESTIONS.get(self.answers.len())
        }
    }

    pub fn question_number(&self) -> usize {
        (self.answers.len() + 1).min(QUESTIONS.len())
    }

    pub fn answer(&mut self, yes: bool) {
        if !self.is_finished() {
            self.answers.push(yes);
        }
    }

    /// Stops at the first "no" since later answers cannot change the outcome.
    pub fn is_finished(&self) -> bool {
        self.answers.len() >= QUESTIONS.len() || self.answers.iter().any(|yes| !yes)
    }

    pub fn recommendation(&self) -> Option<&'static str> {
        self.is_finished().then(|| recommend(&self.answers))
    }

    /// The recommendation, if the catalog can actually open it.
    pub fn recommended_in<'a>(&self, catalog: &'a TrackCatalog) -> Option<&'a str> {
        let id = self.recommendation()?;
        catalog
            .get(id)
            .filter(|t| !t.locked)
            .or_else(|| catalog.get(DEFAULT_TRACK_ID).filter(|t| !t.locked))
            .or_else(|| catalog.first_unlocked())
            .map(|t| t.id.as_str())
    }

    pub fn reset(&mut self) {
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_picks_first_gap() {
        assert_eq!(recommend(&[false, false, false]), "meu-nome");
        assert_eq!(recommend(&[true, false, true]), "palavras-simples");
        assert_eq!(recommend(&[true, true, false]), "mundo-digital");
        assert_eq!(recommend(&[true, true, true]), "mundo-digital");
    }

    #[test]
    fn flow_stops_on_first_no() {
        let mut flow = Onboarding::new();
        assert_eq!(flow.current_question(), Some(&QUESTIONS[0]));
        flow.answer(true);
        assert_eq!(flow.question_number(), 2);
        flow.answer(false);
        assert!(flow.is_finished());
        assert_eq!(flow.current_question(), None);
        assert_eq!(flow.recommendation(), Some("palavras-simples"));

        // ignored once finished
        flow.answer(true);
        assert_eq!(flow.recommendation(), Some("palavras-simples"));
    }

    #[test]
    fn unfinished_flow_has_no_recommendation() {
        let mut flow = Onboarding::new();
        flow.answer(true);
        assert_eq!(flow.recommendation(), None);
    }

    #[test]
    fn all_yes_finishes_after_last_question() {
        let mut flow = Onboarding::new();
        for _ in 0..QUESTIONS.len() {
            flow.answer(true);
        }
        assert!(flow.is_finished());
        assert_eq!(flow.recommendation(), Some(CONFIDENT_TRACK));
    }

    #[test]
    fn recommendation_falls_back_when_catalog_lacks_track() {
        let catalog = TrackCatalog::from_json(
            r#"{"tracks": [{"id": "outra", "title": "Outra", "steps": [
                {"kind": "text_entry", "question": "Q", "instruction": "I"}
            ]}]}"#,
        )
        .unwrap();
        let mut flow = Onboarding::new();
        flow.answer(false);
        assert_eq!(flow.recommended_in(&catalog), Some("outra"));
    }

    #[test]
    fn reset_starts_over() {
        let mut flow = Onboarding::new();
        flow.answer(false);
        flow.reset();
        assert!(!flow.is_finished());
        assert_eq!(flow.question_number(), 1);
    }
}
