//! Decorador que memoriza os scores do usuário consultado por último.
//!
//! O cache guarda um único usuário. Consultas para o mesmo usuário só vão
//! ao scorer delegado para itens ainda desconhecidos; consultas para outro
//! usuário descartam tudo e recomeçam.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{ItemScorer, ScoreMap};
use crate::types::config::CacheConfig;
use crate::{ItemId, RecoResult, UserId};

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Itens respondidos pelo cache.
    pub hits: u64,

    /// Itens que precisaram do delegado.
    pub misses: u64,

    /// Trocas de usuário que descartaram um cache populado.
    pub invalidations: u64,

    /// Chamadas feitas ao delegado.
    pub delegate_calls: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cópia consistente do estado do cache, tirada sob o lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    /// Usuário em cache.
    pub user: Option<UserId>,

    /// Itens com score em cache.
    pub items: BTreeSet<ItemId>,

    /// Itens sabidamente sem score.
    pub missing: BTreeSet<ItemId>,
}

#[derive(Debug, Default)]
struct UserScoreCache {
    user: Option<UserId>,
    scores: ScoreMap,
    missing: HashSet<ItemId>,
}

impl UserScoreCache {
    fn holds(&self, user: UserId) -> bool {
        self.user == Some(user)
    }

    /// `Some(score)` se o item já é conhecido (com ou sem score).
    fn lookup(&self, item: ItemId) -> Option<Option<f64>> {
        if let Some(score) = self.scores.get(&item) {
            Some(Some(*score))
        } else if self.missing.contains(&item) {
            Some(None)
        } else {
            None
        }
    }

    fn record(&mut self, item: ItemId, score: Option<f64>, remember_missing: bool) {
        match score {
            Some(score) => {
                self.scores.insert(item, score);
            }
            None if remember_missing => {
                self.missing.insert(item);
            }
            None => {}
        }
    }

    fn reset(&mut self, user: Option<UserId>) {
        self.user = user;
        self.scores.clear();
        self.missing.clear();
    }

    fn scores_for(&self, items: &BTreeSet<ItemId>) -> ScoreMap {
        items
            .iter()
            .filter_map(|item| self.scores.get(item).map(|score| (*item, *score)))
            .collect()
    }
}

/// [`ItemScorer`] que memoriza os scores do último usuário consultado.
///
/// Toda a sequência "verifica usuário, verifica itens, chama delegado,
/// mescla" roda sob um único [`Mutex`], então o decorador pode ser
/// compartilhado entre threads (via `Arc`) sem que alguém veja um cache
/// misturando dois usuários.
///
/// O cache só é alterado depois que o delegado responde com sucesso; um
/// erro do delegado é devolvido sem modificações e o cache fica como
/// estava.
///
/// Itens para os quais o delegado não tem score são lembrados como
/// "sem score" enquanto o usuário não mudar (desligável com
/// [`with_remember_missing`](Self::with_remember_missing)).
pub struct CachingItemScorer<S> {
    delegate: S,
    cache: Mutex<UserScoreCache>,
    remember_missing: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    delegate_calls: AtomicU64,
}

impl<S: ItemScorer> CachingItemScorer<S> {
    /// Envolve `delegate` com um cache vazio.
    pub fn new(delegate: S) -> Self {
        Self {
            delegate,
            cache: Mutex::new(UserScoreCache::default()),
            remember_missing: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            delegate_calls: AtomicU64::new(0),
        }
    }

    /// Cria o decorador a partir da configuração.
    pub fn from_config(delegate: S, config: &CacheConfig) -> Self {
        Self::new(delegate).with_remember_missing(config.remember_missing)
    }

    /// Define se itens sem score são lembrados.
    pub fn with_remember_missing(mut self, remember: bool) -> Self {
        self.remember_missing = remember;
        self
    }

    /// Scorer delegado.
    pub fn delegate(&self) -> &S {
        &self.delegate
    }

    /// Usuário atualmente em cache, se houver.
    pub fn cached_user(&self) -> Option<UserId> {
        self.cache.lock().user
    }

    /// Itens com score em cache para o usuário atual.
    pub fn key_domain(&self) -> BTreeSet<ItemId> {
        self.cache.lock().scores.keys().copied().collect()
    }

    /// Estado completo do cache, lido de uma vez.
    pub fn snapshot(&self) -> CacheSnapshot {
        let cache = self.cache.lock();
        CacheSnapshot {
            user: cache.user,
            items: cache.scores.keys().copied().collect(),
            missing: cache.missing.iter().copied().collect(),
        }
    }

    /// Descarta o cache, voltando ao estado vazio.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock();
        if cache.user.is_some() {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
        }
        cache.reset(None);
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            delegate_calls: self.delegate_calls.load(Ordering::Relaxed),
        }
    }

    fn switch_user(&self, cache: &mut UserScoreCache, user: UserId) {
        if let Some(previous) = cache.user {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                from = previous,
                to = user,
                dropped = cache.scores.len() + cache.missing.len(),
                "Score cache invalidated"
            );
        }
        cache.reset(Some(user));
    }

    // Só chamado depois que o delegado respondeu
    fn record_delegate_call(&self, misses: usize) {
        self.misses.fetch_add(misses as u64, Ordering::Relaxed);
        self.delegate_calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl<S: ItemScorer> ItemScorer for CachingItemScorer<S> {
    fn name(&self) -> &str {
        "caching"
    }

    fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
        let mut cache = self.cache.lock();

        if cache.holds(user) {
            if let Some(hit) = cache.lookup(item) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit);
            }
        }

        let score = self.delegate.score(user, item)?;
        self.record_delegate_call(1);

        if !cache.holds(user) {
            self.switch_user(&mut cache, user);
        }
        cache.record(item, score, self.remember_missing);
        Ok(score)
    }

    fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
        if items.is_empty() {
            return Ok(ScoreMap::new());
        }

        let mut cache = self.cache.lock();

        if cache.holds(user) {
            let unknown: BTreeSet<ItemId> = items
                .iter()
                .copied()
                .filter(|item| cache.lookup(*item).is_none())
                .collect();

            if !unknown.is_empty() {
                let fetched = self.delegate.score_items(user, &unknown)?;
                self.record_delegate_call(unknown.len());
                for item in &unknown {
                    cache.record(*item, fetched.get(item).copied(), self.remember_missing);
                }
            }
            self.hits
                .fetch_add((items.len() - unknown.len()) as u64, Ordering::Relaxed);
            return Ok(cache.scores_for(items));
        }

        let fetched = self.delegate.score_items(user, items)?;
        self.record_delegate_call(items.len());

        self.switch_user(&mut cache, user);
        for item in items {
            cache.record(*item, fetched.get(item).copied(), self.remember_missing);
        }
        Ok(cache.scores_for(items))
    }
}

impl<S> std::fmt::Debug for CachingItemScorer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("CachingItemScorer")
            .field("user", &cache.user)
            .field("cached", &cache.scores.len())
            .field("missing", &cache.missing.len())
            .field("remember_missing", &self.remember_missing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::PrecomputedItemScorer;
    use crate::RecoError;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Arc;

    // Delegado que conta chamadas e pode falhar sob demanda
    struct CountingScorer {
        inner: PrecomputedItemScorer,
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
        batch_items: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingScorer {
        fn new(inner: PrecomputedItemScorer) -> Self {
            Self {
                inner,
                single_calls: AtomicUsize::new(0),
                batch_calls: AtomicUsize::new(0),
                batch_items: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> usize {
            self.single_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
        }
    }

    impl ItemScorer for CountingScorer {
        fn name(&self) -> &str {
            "counting"
        }

        fn score_items(&self, user: UserId, items: &BTreeSet<ItemId>) -> RecoResult<ScoreMap> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            self.batch_items.fetch_add(items.len(), Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(RecoError::scorer("backend down"));
            }
            self.inner.score_items(user, items)
        }

        fn score(&self, user: UserId, item: ItemId) -> RecoResult<Option<f64>> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(RecoError::scorer("backend down"));
            }
            self.inner.score(user, item)
        }
    }

    fn delegate() -> CountingScorer {
        CountingScorer::new(
            PrecomputedItemScorer::builder()
                .add_score(1, 3, 3.5)
                .add_score(2, 4, 5.0)
                .add_score(2, 6, 3.0)
                .add_score(3, 1, 5.0)
                .add_score(3, 2, 4.5)
                .add_score(3, 3, 2.5)
                .add_score(3, 4, 1.0)
                .build(),
        )
    }

    fn items(ids: &[ItemId]) -> BTreeSet<ItemId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_score() {
        let cached = CachingItemScorer::new(delegate());
        assert_eq!(cached.score(1, 3).unwrap(), Some(3.5));
    }

    #[test]
    fn test_starts_empty() {
        let cached = CachingItemScorer::new(delegate());
        assert_eq!(cached.cached_user(), None);
        assert!(cached.key_domain().is_empty());
    }

    #[test]
    fn test_cache_user_transition() {
        let cached = CachingItemScorer::new(delegate());

        assert_eq!(cached.score(1, 3).unwrap(), Some(3.5));
        assert_eq!(cached.cached_user(), Some(1));

        assert_eq!(cached.score(2, 6).unwrap(), Some(3.0));
        assert_eq!(cached.cached_user(), Some(2));
        assert_eq!(cached.key_domain(), items(&[6]));
        assert_eq!(cached.stats().invalidations, 1);
    }

    #[test]
    fn test_single_scores_accumulate() {
        let cached = CachingItemScorer::new(delegate());

        cached.score(3, 1).unwrap();
        cached.score(3, 2).unwrap();

        assert_eq!(cached.key_domain(), items(&[1, 2]));
    }

    #[test]
    fn test_repeated_query_hits_cache() {
        let cached = CachingItemScorer::new(delegate());

        let first = cached.score(3, 2).unwrap();
        let second = cached.score(3, 2).unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.delegate().calls(), 1);
        assert_eq!(cached.stats().hits, 1);
        assert_eq!(cached.stats().misses, 1);
    }

    #[test]
    fn test_batch_then_single_extends() {
        let cached = CachingItemScorer::new(delegate());

        cached.score_items(3, &items(&[1, 2])).unwrap();
        assert_eq!(cached.key_domain(), items(&[1, 2]));

        cached.score(3, 4).unwrap();
        assert_eq!(cached.key_domain(), items(&[1, 2, 4]));
    }

    #[test]
    fn test_batch_only_requests_unknown_items() {
        let cached = CachingItemScorer::new(delegate());

        cached.score_items(3, &items(&[1, 2])).unwrap();
        let scores = cached.score_items(3, &items(&[1, 2, 4])).unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[&4], 1.0);
        assert_eq!(cached.key_domain(), items(&[1, 2, 4]));

        let delegate = cached.delegate();
        assert_eq!(delegate.batch_calls.load(Ordering::SeqCst), 2);
        // 2 itens na primeira chamada, só o item 4 na segunda
        assert_eq!(delegate.batch_items.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_fully_cached_batch_skips_delegate() {
        let cached = CachingItemScorer::new(delegate());

        cached.score_items(3, &items(&[1, 2, 3])).unwrap();
        let scores = cached.score_items(3, &items(&[2, 3])).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(cached.delegate().calls(), 1);
    }

    #[test]
    fn test_batch_for_new_user_resets() {
        let cached = CachingItemScorer::new(delegate());

        cached.score_items(3, &items(&[1, 2, 3])).unwrap();
        let scores = cached.score_items(2, &items(&[4, 6, 9])).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(cached.cached_user(), Some(2));
        assert_eq!(cached.key_domain(), items(&[4, 6]));
    }

    #[test]
    fn test_batch_single_consistency() {
        let cached = CachingItemScorer::new(delegate());
        let single = cached.score(3, 3).unwrap();

        let other = CachingItemScorer::new(delegate());
        let batch = other.score_items(3, &items(&[3])).unwrap();

        assert_eq!(batch.get(&3).copied(), single);
    }

    #[test]
    fn test_missing_item_remembered() {
        let cached = CachingItemScorer::new(delegate());

        assert_eq!(cached.score(1, 99).unwrap(), None);
        assert_eq!(cached.score(1, 99).unwrap(), None);

        assert_eq!(cached.delegate().calls(), 1);
        assert!(cached.key_domain().is_empty());
        assert_eq!(cached.snapshot().missing, items(&[99]));
    }

    #[test]
    fn test_missing_item_in_batch_remembered() {
        let cached = CachingItemScorer::new(delegate());

        cached.score_items(2, &items(&[4, 5])).unwrap();
        cached.score_items(2, &items(&[4, 5])).unwrap();

        assert_eq!(cached.delegate().calls(), 1);
    }

    #[test]
    fn test_missing_item_retried_when_not_remembered() {
        let cached = CachingItemScorer::new(delegate()).with_remember_missing(false);

        cached.score(1, 99).unwrap();
        cached.score(1, 99).unwrap();

        assert_eq!(cached.delegate().calls(), 2);
        assert!(cached.snapshot().missing.is_empty());
    }

    #[test]
    fn test_missing_does_not_poison_other_items() {
        let cached = CachingItemScorer::new(delegate());

        assert_eq!(cached.score(3, 99).unwrap(), None);
        assert_eq!(cached.score(3, 1).unwrap(), Some(5.0));
        assert_eq!(cached.key_domain(), items(&[1]));
    }

    #[test]
    fn test_delegate_error_propagates_and_keeps_cache() {
        let cached = CachingItemScorer::new(delegate());
        cached.score(3, 1).unwrap();

        cached.delegate().fail.store(true, Ordering::SeqCst);
        assert!(matches!(cached.score(3, 2), Err(RecoError::Scorer(_))));
        assert!(matches!(
            cached.score_items(2, &items(&[4])),
            Err(RecoError::Scorer(_))
        ));

        // Cache intacto: mesmo usuário, mesmos itens
        assert_eq!(cached.cached_user(), Some(3));
        assert_eq!(cached.key_domain(), items(&[1]));

        // Falhas não entram nas estatísticas
        let stats = cached.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.delegate_calls, 1);

        // Hits continuam funcionando com o delegado fora do ar
        assert_eq!(cached.score(3, 1).unwrap(), Some(5.0));
        assert_eq!(cached.stats().hits, 1);

        cached.delegate().fail.store(false, Ordering::SeqCst);
        assert_eq!(cached.score(3, 2).unwrap(), Some(4.5));
        assert_eq!(cached.key_domain(), items(&[1, 2]));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let cached = CachingItemScorer::new(delegate());
        cached.score(1, 3).unwrap();

        let scores = cached.score_items(2, &BTreeSet::new()).unwrap();

        assert!(scores.is_empty());
        assert_eq!(cached.cached_user(), Some(1));
        assert_eq!(cached.delegate().calls(), 1);
    }

    #[test]
    fn test_invalidate() {
        let cached = CachingItemScorer::new(delegate());
        cached.score(1, 3).unwrap();

        cached.invalidate();

        assert_eq!(cached.snapshot(), CacheSnapshot::default());
        assert_eq!(cached.stats().invalidations, 1);

        cached.score(1, 3).unwrap();
        assert_eq!(cached.delegate().calls(), 2);
    }

    #[test]
    fn test_stats_hit_rate() {
        let cached = CachingItemScorer::new(delegate());
        cached.score(3, 1).unwrap(); // Miss
        cached.score(3, 1).unwrap(); // Hit
        cached.score(3, 1).unwrap(); // Hit

        let stats = cached.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.delegate_calls, 1);
        assert!((stats.hit_rate() - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_from_config() {
        let config = CacheConfig {
            enabled: true,
            remember_missing: false,
        };
        let cached = CachingItemScorer::from_config(delegate(), &config);
        cached.score(1, 42).unwrap();
        cached.score(1, 42).unwrap();
        assert_eq!(cached.delegate().calls(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let cached = Arc::new(CachingItemScorer::new(delegate()));
        let expected = [(2, 4, 5.0), (2, 6, 3.0), (3, 1, 5.0), (3, 2, 4.5)];

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cached = Arc::clone(&cached);
                std::thread::spawn(move || {
                    for round in 0..200 {
                        let (user, item, score) = expected[(t + round) % expected.len()];
                        assert_eq!(cached.score(user, item).unwrap(), Some(score));

                        let snapshot = cached.snapshot();
                        let owner = snapshot.user.expect("cache populated");
                        for item in &snapshot.items {
                            assert!(
                                expected.iter().any(|(u, i, _)| *u == owner && i == item),
                                "item {item} não pertence ao usuário {owner}"
                            );
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }
    }
}
