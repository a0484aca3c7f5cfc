//! Scorers: dado um usuário e itens, produzem scores numéricos.
//!
//! O trait [`ItemScorer`] é a capacidade polimórfica; as variantes
//! concretas o implementam de forma independente:
//!
//! - [`PrecomputedItemScorer`] - tabela de scores pré-calculados
//! - [`UserMeanScorer`] - média do usuário (ou global) como score
//! - [`FallbackItemScorer`] - scorer primário com baseline para lacunas
//! - [`CachingItemScorer`] - decorador que memoriza scores do último usuário

mod caching;
mod fallback;
mod mean;
mod precomputed;

pub use caching::{CacheSnapshot, CacheStats, CachingItemScorer};
pub use fallback::FallbackItemScorer;
pub use mean::UserMeanScorer;
pub use precomputed::{PrecomputedItemScorer, PrecomputedItemScorerBuilder};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{ItemId, RecoError, RecoResult, UserId};

/// Scores de um usuário, por item.
pub type ScoreMap = HashMap<ItemId, f64>;

/// Capacidade de pontuar itens para um usuário.
///
/// `Ok(None)` (ou ausência no [`ScoreMap`]) significa "sem score"; não é
/// erro. `Err` fica reservado para falhas reais, que devem ser propagadas.
pub trait ItemScorer: Send + Sync {
    /// Nome do scorer, usado em logs.
    fn name(&self) -> &str;

    /// Pontua vários itens para um usuário.
    ///
    /// Itens sem score ficam fora do mapa. A ordem do mapa não é definida.
    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap>;

    /// Pontua um único item.
    ///
    /// A implementação padrão passa por [`score_items`](Self::score_items),
    /// o que mantém os dois caminhos consistentes.
    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        let items = BTreeSet::from([item]);
        Ok(self.score_items(user, &items)?.get(&item).copied())
    }

    /// Como [`score`](Self::score), mas "sem score" vira
    /// [`RecoError::NotScorable`].
    fn require_score(&self, user: UserId, item: ItemId) -> RecoResult<f64> {
        self.score(user, item)?
            .ok_or(RecoError::NotScorable { user, item })
    }
}

impl<S: ItemScorer + ?Sized> ItemScorer for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        (**self).score_items(user, items)
    }

    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        (**self).score(user, item)
    }
}

impl<S: ItemScorer + ?Sized> ItemScorer for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        (**self).score_items(user, items)
    }

    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        (**self).score(user, item)
    }
}
