//! Fonte sobre um iterador em memória.

use super::SequenceProducer;
use crate::RecoResult;

/// Fonte que puxa de um iterador qualquer.
///
/// Liberar descarta o iterador (e o que ele segura).
pub struct IterProducer<I> {
    iter: Option<I>,
}

impl<I: Iterator> IterProducer<I> {
    /// Cria a fonte.
    pub fn new(iter: I) -> Self {
        Self { iter: Some(iter) }
    }
}

impl<I> SequenceProducer for IterProducer<I>
where
    I: Iterator + Send,
{
    type Item = I::Item;

    fn produce(&mut self) -> RecoResult<Option<I::Item>> {
        Ok(self.iter.as_mut().and_then(Iterator::next))
    }

    fn remaining_hint(&self) -> Option<usize> {
        let iter = self.iter.as_ref()?;
        match iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        }
    }

    fn release(&mut self) -> RecoResult<()> {
        self.iter = None;
        Ok(())
    }
}
