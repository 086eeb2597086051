use cueing_core::ResultRecord;
use cueing_report::{ReportError, Submission};

/// Where the end-screen submission stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Sending,
    Failed(String),
    Sent,
}

/// Participant name and wake-status entry shown once the trials are over.
/// Nothing is validated until the subject presses Enter.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    participant: String,
    conditions: Vec<String>,
    selected: Option<usize>,
    status: FormStatus,
}

impl SubmissionForm {
    pub fn new(conditions: Vec<String>) -> Self {
        Self {
            participant: String::new(),
            conditions,
            selected: None,
            status: FormStatus::Editing,
        }
    }

    /// Prefills from the command line; an unknown condition is ignored.
    pub fn prefill(&mut self, participant: Option<&str>, condition: Option<&str>) {
        if let Some(p) = participant {
            self.participant = p.to_string();
        }
        if let Some(c) = condition {
            self.selected = self.conditions.iter().position(|known| known == c);
        }
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    pub fn condition(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.conditions.get(i))
            .map(String::as_str)
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.status, FormStatus::Editing | FormStatus::Failed(_))
    }

    pub fn push_str(&mut self, text: &str) {
        if !self.is_editable() {
            return;
        }
        self.participant
            .extend(text.chars().filter(|c| !c.is_control()));
    }

    pub fn backspace(&mut self) {
        if self.is_editable() {
            self.participant.pop();
        }
    }

    /// Steps through the configured conditions, wrapping at either end.
    pub fn cycle_condition(&mut self, forward: bool) {
        if !self.is_editable() || self.conditions.is_empty() {
            return;
        }
        let n = self.conditions.len();
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        });
    }

    /// Validates the form and, on success, moves it to `Sending`.
    pub fn begin_submit(&mut self, records: &[ResultRecord]) -> Result<Submission, ReportError> {
        match Submission::from_form(&self.participant, self.condition(), records) {
            Ok(submission) => {
                self.status = FormStatus::Sending;
                Ok(submission)
            }
            Err(e) => {
                self.status = FormStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn finish(&mut self, outcome: Result<(), String>) {
        self.status = match outcome {
            Ok(()) => FormStatus::Sent,
            Err(msg) => FormStatus::Failed(msg),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SubmissionForm {
        SubmissionForm::new(vec!["awake".into(), "sleepy".into()])
    }

    #[test]
    fn conditions_cycle_both_ways() {
        let mut f = form();
        assert_eq!(f.condition(), None);
        f.cycle_condition(true);
        assert_eq!(f.condition(), Some("awake"));
        f.cycle_condition(true);
        assert_eq!(f.condition(), Some("sleepy"));
        f.cycle_condition(true);
        assert_eq!(f.condition(), Some("awake"));
        f.cycle_condition(false);
        assert_eq!(f.condition(), Some("sleepy"));
    }

    #[test]
    fn typing_edits_the_name() {
        let mut f = form();
        f.push_str("Adaa");
        f.backspace();
        f.push_str("\r");
        assert_eq!(f.participant(), "Ada");
    }

    #[test]
    fn invalid_form_stays_editable_with_error() {
        let mut f = form();
        f.push_str("Ada");
        assert!(f.begin_submit(&[]).is_err());
        assert!(matches!(f.status(), FormStatus::Failed(_)));
        assert!(f.is_editable());

        f.cycle_condition(true);
        assert!(f.begin_submit(&[]).is_ok());
        assert_eq!(f.status(), &FormStatus::Sending);

        // Locked while the request is in flight.
        f.push_str("x");
        assert_eq!(f.participant(), "Ada");
    }

    #[test]
    fn failed_delivery_allows_retry() {
        let mut f = form();
        f.prefill(Some("Ada"), Some("sleepy"));
        assert_eq!(f.condition(), Some("sleepy"));
        f.begin_submit(&[]).unwrap();
        f.finish(Err("connection refused".into()));
        assert!(f.is_editable());
        f.begin_submit(&[]).unwrap();
        f.finish(Ok(()));
        assert_eq!(f.status(), &FormStatus::Sent);
        assert!(!f.is_editable());
    }

    #[test]
    fn unknown_prefilled_condition_is_ignored() {
        let mut f = form();
        f.prefill(None, Some("drowsy"));
        assert_eq!(f.condition(), None);
    }
}
