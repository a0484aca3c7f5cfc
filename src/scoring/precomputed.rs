//! Scorer sobre uma tabela de scores pré-calculados.

use std::collections::{BTreeSet, HashMap};

use super::{ItemScorer, ScoreMap};
use crate::cursors::Cursor;
use crate::{ItemId, Rating, RecoResult, UserId};

/// Scorer que apenas consulta uma tabela `(user, item) -> score`.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedItemScorer {
    scores: HashMap<UserId, ScoreMap>,
}

impl PrecomputedItemScorer {
    /// Inicia um builder.
    pub fn builder() -> PrecomputedItemScorerBuilder {
        PrecomputedItemScorerBuilder::default()
    }

    /// Carrega a tabela a partir de um cursor de avaliações.
    ///
    /// Se um par aparecer mais de uma vez, vale a última avaliação. O
    /// cursor é fechado ao final.
    pub fn from_ratings(ratings: Cursor<Rating>) -> RecoResult<Self> {
        let mut builder = Self::builder();
        ratings.for_each(|rating| {
            builder.insert(rating.user, rating.item, rating.value);
            Ok(())
        })?;

        let scorer = builder.build();
        tracing::debug!(
            users = scorer.user_count(),
            scores = scorer.len(),
            "Precomputed scorer loaded"
        );
        Ok(scorer)
    }

    /// Número de usuários com algum score.
    pub fn user_count(&self) -> usize {
        self.scores.len()
    }

    /// Número total de scores.
    pub fn len(&self) -> usize {
        self.scores.values().map(HashMap::len).sum()
    }

    /// `true` se a tabela está vazia.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl ItemScorer for PrecomputedItemScorer {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        let Some(user_scores) = self.scores.get(&user) else {
            return Ok(ScoreMap::new());
        };

        Ok(items
            .iter()
            .filter_map(|item| user_scores.get(item).map(|score| (*item, *score)))
            .collect())
    }

    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        Ok(self
            .scores
            .get(&user)
            .and_then(|user_scores| user_scores.get(&item))
            .copied())
    }
}

/// Builder de [`PrecomputedItemScorer`].
#[derive(Debug, Default)]
pub struct PrecomputedItemScorerBuilder {
    scores: HashMap<UserId, ScoreMap>,
}

impl PrecomputedItemScorerBuilder {
    /// Adiciona (ou substitui) um score.
    pub fn add_score(mut self, user: UserId, item: ItemId, score: f64) -> Self {
        self.insert(user, item, score);
        self
    }

    fn insert(&mut self, user: UserId, item: ItemId, score: f64) {
        self.scores.entry(user).or_default().insert(item, score);
    }

    /// Finaliza o scorer.
    pub fn build(self) -> PrecomputedItemScorer {
        PrecomputedItemScorer {
            scores: self.scores,
        }
    }
}
