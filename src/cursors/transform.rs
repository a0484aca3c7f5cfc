//! Fontes que transformam outros cursores (map, filter, limit, concat).
//!
//! Cada uma é dona do cursor de origem: liberar a transformação fecha a
//! origem. Nenhuma lê mais do que o necessário para o próximo elemento.

use std::collections::VecDeque;

use super::{Cursor, SequenceProducer};
use crate::RecoResult;

pub(crate) struct MapProducer<T, F> {
    source: Cursor<T>,
    f: F,
}

impl<T, F> MapProducer<T, F> {
    pub(crate) fn new(source: Cursor<T>, f: F) -> Self {
        Self { source, f }
    }
}

impl<T, U, F> SequenceProducer for MapProducer<T, F>
where
    T: Send,
    F: FnMut(T) -> U + Send,
{
    type Item = U;

    fn produce(&mut self) -> RecoResult<Option<U>> {
        if !self.source.has_next()? {
            return Ok(None);
        }
        let item = self.source.next()?;
        Ok(Some((self.f)(item)))
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.source.size_hint()
    }

    fn release(&mut self) -> RecoResult<()> {
        self.source.close()
    }
}

pub(crate) struct FilterProducer<T, F> {
    source: Cursor<T>,
    predicate: F,
}

impl<T, F> FilterProducer<T, F> {
    pub(crate) fn new(source: Cursor<T>, predicate: F) -> Self {
        Self { source, predicate }
    }
}

impl<T, F> SequenceProducer for FilterProducer<T, F>
where
    T: Send,
    F: FnMut(&T) -> bool + Send,
{
    type Item = T;

    fn produce(&mut self) -> RecoResult<Option<T>> {
        while self.source.has_next()? {
            let item = self.source.next()?;
            if (self.predicate)(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> RecoResult<()> {
        self.source.close()
    }
}

pub(crate) struct LimitProducer<T> {
    source: Cursor<T>,
    remaining: usize,
}

impl<T> LimitProducer<T> {
    pub(crate) fn new(source: Cursor<T>, limit: usize) -> Self {
        Self {
            source,
            remaining: limit,
        }
    }
}

impl<T: Send> SequenceProducer for LimitProducer<T> {
    type Item = T;

    fn produce(&mut self) -> RecoResult<Option<T>> {
        if self.remaining == 0 || !self.source.has_next()? {
            return Ok(None);
        }
        self.remaining -= 1;
        self.source.next().map(Some)
    }

    fn remaining_hint(&self) -> Option<usize> {
        match self.source.size_hint() {
            Some(n) => Some(n.min(self.remaining)),
            None if self.remaining == 0 => Some(0),
            None => None,
        }
    }

    fn release(&mut self) -> RecoResult<()> {
        self.source.close()
    }
}

pub(crate) struct ConcatProducer<T> {
    sources: VecDeque<Cursor<T>>,
}

impl<T> ConcatProducer<T> {
    pub(crate) fn new(sources: Vec<Cursor<T>>) -> Self {
        Self {
            sources: sources.into(),
        }
    }
}

impl<T: Send> SequenceProducer for ConcatProducer<T> {
    type Item = T;

    fn produce(&mut self) -> RecoResult<Option<T>> {
        while let Some(front) = self.sources.front_mut() {
            if front.has_next()? {
                return front.next().map(Some);
            }
            // Esgotado: já liberou a própria fonte
            self.sources.pop_front();
        }
        Ok(None)
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.sources
            .iter()
            .map(Cursor::size_hint)
            .try_fold(0usize, |acc, hint| hint.map(|n| acc + n))
    }

    fn release(&mut self) -> RecoResult<()> {
        // Fecha todas antes de reportar o primeiro erro
        let mut first_err = None;
        for mut source in self.sources.drain(..) {
            if let Err(e) = source.close() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
