use crate::alpha_beta_searcher::{Evaluator, Score, SearchError};

/// Weighted sum of sub-evaluators.
///
/// Evaluators with a weight of exactly zero are skipped, so an infinite sub-score never
/// turns into NaN.
pub struct Blend<S> {
    evaluators: Vec<(Box<dyn Evaluator<S>>, Score)>,
}

impl<S> Default for Blend<S> {
    fn default() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }
}

impl<S> Blend<S> {
    /// Blends `evaluators` with a weight of 1.0 each.
    pub fn new(evaluators: Vec<Box<dyn Evaluator<S>>>) -> Self {
        Self {
            evaluators: evaluators.into_iter().map(|e| (e, 1.0)).collect(),
        }
    }

    pub fn with_weights(
        evaluators: Vec<Box<dyn Evaluator<S>>>,
        weights: Vec<Score>,
    ) -> Result<Self, SearchError> {
        if evaluators.len() != weights.len() {
            return Err(SearchError::WeightCountMismatch {
                evaluators: evaluators.len(),
                weights: weights.len(),
            });
        }

        Ok(Self {
            evaluators: evaluators.into_iter().zip(weights).collect(),
        })
    }

    pub fn push<E: Evaluator<S> + 'static>(mut self, evaluator: E, weight: Score) -> Self {
        self.evaluators.push((Box::new(evaluator), weight));
        self
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl<S> Evaluator<S> for Blend<S> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        let mut score = 0.0;
        for (evaluator, weight) in self.evaluators.iter_mut() {
            if *weight == 0.0 {
                continue;
            }
            score += *weight * evaluator.evaluate(state)?;
        }
        Ok(score)
    }
}
