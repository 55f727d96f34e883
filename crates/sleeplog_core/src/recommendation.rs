#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationResponse {
    pub rec: Option<String>,
    pub sleep_efficiency: Option<f64>,
}

impl RecommendationResponse {
    /// An empty or missing recommendation means the server is still working.
    pub fn is_ready(&self) -> bool {
        self.rec.as_deref().is_some_and(|rec| !rec.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationBlock {
    pub lines: Vec<String>,
    /// Absent when the service sent no efficiency metric.
    pub efficiency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecommendationState {
    /// Bootstrap carried a finished recommendation or none at all.
    #[default]
    Inactive,
    Pending,
    Ready(RecommendationBlock),
}

impl RecommendationState {
    /// Returns true when polling should start.
    pub fn activate(&mut self, pending: bool) -> bool {
        if pending {
            *self = RecommendationState::Pending;
        } else {
            *self = RecommendationState::Inactive;
        }
        pending
    }

    /// Renders a ready response once. Later responses are ignored.
    pub fn accept(&mut self, response: &RecommendationResponse) -> bool {
        if !matches!(self, RecommendationState::Pending) || !response.is_ready() {
            return false;
        }
        let text = response.rec.as_deref().unwrap_or_default();
        *self = RecommendationState::Ready(RecommendationBlock {
            lines: text.lines().map(ToOwned::to_owned).collect(),
            efficiency: response
                .sleep_efficiency
                .map(|efficiency| format!("Your sleep efficiency is {efficiency}%")),
        });
        true
    }

    pub fn block(&self) -> Option<&RecommendationBlock> {
        match self {
            RecommendationState::Ready(block) => Some(block),
            RecommendationState::Inactive | RecommendationState::Pending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_once_with_line_breaks() {
        let mut state = RecommendationState::default();
        assert!(state.activate(true));
        assert!(!state.accept(&RecommendationResponse {
            rec: Some(String::new()),
            sleep_efficiency: None,
        }));

        let ready = RecommendationResponse {
            rec: Some("Go to bed earlier.\nAvoid caffeine.".into()),
            sleep_efficiency: Some(87.5),
        };
        assert!(state.accept(&ready));
        let block = state.block().unwrap();
        assert_eq!(block.lines, vec!["Go to bed earlier.", "Avoid caffeine."]);
        assert_eq!(
            block.efficiency.as_deref(),
            Some("Your sleep efficiency is 87.5%")
        );

        assert!(!state.accept(&ready));
    }

    #[test]
    fn missing_metric_leaves_efficiency_out() {
        let mut state = RecommendationState::default();
        state.activate(true);
        assert!(state.accept(&RecommendationResponse {
            rec: Some("Keep a regular schedule.".into()),
            sleep_efficiency: None,
        }));
        let block = state.block().unwrap();
        assert_eq!(block.lines, vec!["Keep a regular schedule."]);
        assert_eq!(block.efficiency, None);
    }

    #[test]
    fn inactive_state_ignores_responses() {
        let mut state = RecommendationState::default();
        assert!(!state.activate(false));
        assert!(!state.accept(&RecommendationResponse {
            rec: Some("late".into()),
            sleep_efficiency: Some(90.0),
        }));
        assert!(state.block().is_none());
    }
}
