//! Scorer composto: primário com baseline.

use std::collections::BTreeSet;

use super::{ItemScorer, ScoreMap};
use crate::{ItemId, RecoResult, UserId};

/// Usa o scorer primário e completa os itens que ele não pontuou com o
/// baseline. Erros de qualquer um dos dois são propagados.
#[derive(Debug, Clone)]
pub struct FallbackItemScorer<P, B> {
    primary: P,
    baseline: B,
}

impl<P: ItemScorer, B: ItemScorer> FallbackItemScorer<P, B> {
    /// Cria o scorer composto.
    pub fn new(primary: P, baseline: B) -> Self {
        Self { primary, baseline }
    }

    /// Scorer primário.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Scorer de baseline.
    pub fn baseline(&self) -> &B {
        &self.baseline
    }
}

impl<P: ItemScorer, B: ItemScorer> ItemScorer for FallbackItemScorer<P, B> {
    fn name(&self) -> &str {
        "fallback"
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        let mut scores = self.primary.score_items(user, items)?;

        let missing: BTreeSet<ItemId> = items
            .iter()
            .filter(|item| !scores.contains_key(*item))
            .copied()
            .collect();

        if !missing.is_empty() {
            scores.extend(self.baseline.score_items(user, &missing)?);
        }
        Ok(scores)
    }

    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        match self.primary.score(user, item)? {
            Some(score) => Ok(Some(score)),
            None => self.baseline.score(user, item),
        }
    }
}
