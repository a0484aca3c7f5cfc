//! O tipo [`Cursor`] e seu ciclo de vida.

use std::fmt;

use super::iter::CursorIter;
use super::memory::IterProducer;
use super::transform::{ConcatProducer, FilterProducer, LimitProducer, MapProducer};
use super::SequenceProducer;
use crate::{RecoError, RecoResult};

/// Estado do ciclo de vida de um cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// Ainda pode produzir elementos.
    Open,
    /// A fonte se esgotou e foi liberada automaticamente.
    Exhausted,
    /// `close()` foi chamado.
    Closed,
}

/// Sequência de passagem única sobre um [`SequenceProducer`].
///
/// O cursor é dono exclusivo da fonte. Todas as operações recebem
/// `&mut self`, então o compilador garante um único consumidor por vez;
/// para compartilhar entre threads é preciso sincronização externa.
///
/// No máximo um elemento é lido antecipadamente, e apenas para responder
/// a [`has_next`](Cursor::has_next).
pub struct Cursor<T> {
    producer: Box<dyn SequenceProducer<Item = T>>,
    lookahead: Option<T>,
    state: CursorState,
    released: bool,
}

impl<T> Cursor<T> {
    /// Cria um cursor que passa a ser dono de `producer`.
    pub fn new<P>(producer: P) -> Self
    where
        P: SequenceProducer<Item = T> + 'static,
    {
        Self {
            producer: Box::new(producer),
            lookahead: None,
            state: CursorState::Open,
            released: false,
        }
    }

    /// Indica se há outro elemento disponível, sem consumi-lo.
    ///
    /// Pode ser chamado repetidamente. Retorna `false` para sempre depois
    /// de `close()` ou do esgotamento da fonte; no esgotamento a fonte é
    /// liberada na hora.
    pub fn has_next(&mut self) -> RecoResult<bool> {
        if self.state != CursorState::Open {
            return Ok(false);
        }
        if self.lookahead.is_some() {
            return Ok(true);
        }
        self.fill()
    }

    /// Retorna o próximo elemento e avança o cursor.
    ///
    /// Falha com [`RecoError::CursorClosed`] depois de `close()` e com
    /// [`RecoError::CursorExhausted`] quando não há mais elementos.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> RecoResult<T> {
        match self.state {
            CursorState::Closed => return Err(RecoError::CursorClosed),
            CursorState::Exhausted => return Err(RecoError::CursorExhausted),
            CursorState::Open => {}
        }

        if let Some(item) = self.lookahead.take() {
            return Ok(item);
        }

        if self.fill()? {
            self.lookahead.take().ok_or(RecoError::CursorExhausted)
        } else {
            Err(RecoError::CursorExhausted)
        }
    }

    /// Libera a fonte. Idempotente: fechar de novo, ou fechar um cursor já
    /// esgotado, não é erro.
    ///
    /// Um elemento lido antecipadamente e não consumido é descartado.
    pub fn close(&mut self) -> RecoResult<()> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.state = CursorState::Closed;
        self.lookahead = None;
        self.release()
    }

    /// Quantidade de elementos restantes, se conhecida.
    pub fn size_hint(&self) -> Option<usize> {
        match self.state {
            CursorState::Open => self
                .producer
                .remaining_hint()
                .map(|n| n + usize::from(self.lookahead.is_some())),
            CursorState::Exhausted | CursorState::Closed => Some(0),
        }
    }

    /// `true` depois de `close()`.
    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    /// `true` quando a fonte já não tem recursos abertos.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Adaptador [`Iterator`] que empresta o cursor.
    ///
    /// O adaptador não fecha o cursor; quem obteve o cursor continua
    /// responsável por ele.
    pub fn iter(&mut self) -> CursorIter<'_, T> {
        CursorIter::new(self)
    }

    fn fill(&mut self) -> RecoResult<bool> {
        match self.producer.produce()? {
            Some(item) => {
                self.lookahead = Some(item);
                Ok(true)
            }
            None => {
                self.state = CursorState::Exhausted;
                tracing::trace!("Cursor exhausted");
                self.release()?;
                Ok(false)
            }
        }
    }

    fn release(&mut self) -> RecoResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        tracing::debug!("Releasing cursor source");
        self.producer.release()
    }
}

impl<T: Send + 'static> Cursor<T> {
    /// Cursor sobre um iterador em memória.
    pub fn wrap<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::new(IterProducer::new(iter.into_iter()))
    }

    /// Cursor sobre um `Vec`, com tamanho conhecido.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::wrap(items)
    }

    /// Cursor sem elementos.
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Aplica `f` a cada elemento, sob demanda.
    pub fn map<U, F>(self, f: F) -> Cursor<U>
    where
        U: 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Cursor::new(MapProducer::new(self, f))
    }

    /// Mantém só os elementos para os quais `predicate` é verdadeiro.
    pub fn filter<F>(self, predicate: F) -> Cursor<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        Cursor::new(FilterProducer::new(self, predicate))
    }

    /// Produz no máximo `limit` elementos; a fonte é liberada assim que o
    /// limite é atingido.
    pub fn limit(self, limit: usize) -> Cursor<T> {
        Cursor::new(LimitProducer::new(self, limit))
    }

    /// Encadeia cursores, consumindo um de cada vez.
    pub fn concat(cursors: Vec<Cursor<T>>) -> Cursor<T> {
        Cursor::new(ConcatProducer::new(cursors))
    }

    /// Consome o cursor inteiro em um `Vec` e o fecha.
    pub fn collect_vec(mut self) -> RecoResult<Vec<T>> {
        let mut items = Vec::with_capacity(self.size_hint().unwrap_or(0));
        while self.has_next()? {
            items.push(self.next()?);
        }
        self.close()?;
        Ok(items)
    }

    /// Aplica `f` a cada elemento e fecha o cursor.
    ///
    /// Se `f` falhar o erro é propagado e o cursor é liberado ao sair de
    /// escopo.
    pub fn for_each<F>(mut self, mut f: F) -> RecoResult<()>
    where
        F: FnMut(T) -> RecoResult<()>,
    {
        while self.has_next()? {
            f(self.next()?)?;
        }
        self.close()
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.producer.release() {
            tracing::warn!(error = %e, "Failed to release cursor source on drop");
        }
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("buffered", &self.lookahead.is_some())
            .field("released", &self.released)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a mut Cursor<T> {
    type Item = RecoResult<T>;
    type IntoIter = CursorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        CursorIter::new(self)
    }
}
