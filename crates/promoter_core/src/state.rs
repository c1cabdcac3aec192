use crate::outcome::Outcome;

/// Lifecycle of a single URL within one export batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlState {
    #[default]
    Pending,
    Dispatched,
    Succeeded,
    Rejected,
    Failed,
}

impl UrlState {
    /// State reached once a dispatched URL resolves to `outcome`.
    pub fn resolved(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success(_) => UrlState::Succeeded,
            Outcome::Rejected(_) => UrlState::Rejected,
            Outcome::Failed(_) => UrlState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UrlState::Succeeded | UrlState::Rejected | UrlState::Failed
        )
    }

    /// Only promoted URLs leave a row behind; everything else is forgotten on restart.
    pub fn survives_restart(self) -> bool {
        self == UrlState::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::UrlState;
    use crate::Outcome;

    #[test]
    fn outcomes_map_to_terminal_states() {
        let cases = [
            (Outcome::Success("p".into()), UrlState::Succeeded),
            (Outcome::Rejected("r".into()), UrlState::Rejected),
            (Outcome::Failed("f".into()), UrlState::Failed),
        ];
        for (outcome, expected) in cases {
            let state = UrlState::resolved(&outcome);
            assert_eq!(state, expected);
            assert!(state.is_terminal());
        }
        assert!(!UrlState::Pending.is_terminal());
        assert!(!UrlState::Dispatched.is_terminal());
    }

    #[test]
    fn only_success_survives_restart() {
        assert!(UrlState::Succeeded.survives_restart());
        assert!(!UrlState::Rejected.survives_restart());
        assert!(!UrlState::Failed.survives_restart());
    }
}
