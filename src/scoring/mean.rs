//! Baseline de média por usuário.

use std::collections::{BTreeSet, HashMap};

use super::{ItemScorer, ScoreMap};
use crate::cursors::Cursor;
use crate::{ItemId, Rating, RecoResult, UserId};

/// Pontua todo item com a média das avaliações do usuário.
///
/// Usuários sem avaliações recebem a média global. Com `damping > 0` a
/// média do usuário é puxada para a global:
/// `(soma + damping * global) / (n + damping)`.
/// Treinado sem nenhuma avaliação, o scorer não produz scores.
#[derive(Debug, Clone, Default)]
pub struct UserMeanScorer {
    users: HashMap<UserId, (f64, usize)>,
    global_mean: Option<f64>,
    damping: f64,
}

impl UserMeanScorer {
    /// Treina o scorer consumindo (e fechando) um cursor de avaliações.
    pub fn from_ratings(ratings: Cursor<Rating>) -> RecoResult<Self> {
        let mut users: HashMap<UserId, (f64, usize)> = HashMap::new();
        let mut total = 0.0;
        let mut count = 0usize;

        ratings.for_each(|rating| {
            let entry = users.entry(rating.user).or_insert((0.0, 0));
            entry.0 += rating.value;
            entry.1 += 1;
            total += rating.value;
            count += 1;
            Ok(())
        })?;

        let global_mean = (count > 0).then(|| total / count as f64);
        tracing::debug!(users = users.len(), ratings = count, "User mean scorer trained");

        Ok(Self {
            users,
            global_mean,
            damping: 0.0,
        })
    }

    /// Define o fator de amortecimento (negativos viram zero).
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.max(0.0);
        self
    }

    /// Média global das avaliações de treino.
    pub fn global_mean(&self) -> Option<f64> {
        self.global_mean
    }

    fn user_mean(&self, user: UserId) -> Option<f64> {
        let global = self.global_mean?;
        match self.users.get(&user) {
            Some(&(sum, n)) => Some((sum + self.damping * global) / (n as f64 + self.damping)),
            None => Some(global),
        }
    }
}

impl ItemScorer for UserMeanScorer {
    fn name(&self) -> &str {
        "user-mean"
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        let Some(mean) = self.user_mean(user) else {
            return Ok(ScoreMap::new());
        };
        Ok(items.iter().map(|item| (*item, mean)).collect())
    }

    fn score(&self, user: UserId, _item: ItemId) -> RecoResult<Option<f64>> {
        Ok(self.user_mean(user))
    }
}
