//! Adaptador de [`Cursor`] para [`Iterator`].

use super::Cursor;
use crate::{RecoError, RecoResult};

/// Visão [`Iterator`] de um cursor emprestado.
///
/// Cada chamada a `next` corresponde a um par `has_next()`/`next()` no
/// cursor. Um erro da fonte é entregue uma única vez como `Some(Err(_))`;
/// depois disso o adaptador termina.
///
/// O adaptador não é dono do cursor e não o fecha. Quando a iteração chega
/// ao fim naturalmente o próprio cursor libera a fonte.
#[derive(Debug)]
pub struct CursorIter<'a, T> {
    cursor: &'a mut Cursor<T>,
    failed: bool,
}

impl<'a, T> CursorIter<'a, T> {
    pub(crate) fn new(cursor: &'a mut Cursor<T>) -> Self {
        Self {
            cursor,
            failed: false,
        }
    }

    /// Indica se há outro elemento, delegando ao cursor.
    pub fn has_next(&mut self) -> RecoResult<bool> {
        if self.failed {
            return Ok(false);
        }
        self.cursor.has_next()
    }

    /// Remoção não é suportada: cursores não alteram a fonte.
    pub fn remove(&mut self) -> RecoResult<()> {
        Err(RecoError::UnsupportedOperation("remove"))
    }
}

impl<T> Iterator for CursorIter<'_, T> {
    type Item = RecoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let step = match self.cursor.has_next() {
            Ok(true) => self.cursor.next(),
            Ok(false) => return None,
            Err(e) => Err(e),
        };

        if step.is_err() {
            self.failed = true;
        }
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        match self.cursor.size_hint() {
            Some(n) => (n, Some(n)),
            None => (0, None),
        }
    }
}

impl<T> std::iter::FusedIterator for CursorIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::test_support::TrackedProducer;

    #[test]
    fn test_iter_yields_all() {
        let mut cursor = Cursor::from_vec(vec![1, 2, 3]);
        let items: RecoResult<Vec<_>> = cursor.iter().collect();

        assert_eq!(items.unwrap(), vec![1, 2, 3]);
        assert!(cursor.is_released());
    }

    #[test]
    fn test_for_loop_over_mut_ref() {
        let mut cursor = Cursor::from_vec(vec!["x", "y"]);
        let mut seen = Vec::new();

        for item in &mut cursor {
            seen.push(item.unwrap());
        }

        assert_eq!(seen, vec!["x", "y"]);
    }

    #[test]
    fn test_remove_unsupported() {
        let mut cursor = Cursor::from_vec(vec![1]);
        let mut iter = cursor.iter();

        assert!(iter.next().is_some());
        assert!(matches!(
            iter.remove(),
            Err(RecoError::UnsupportedOperation("remove"))
        ));
    }

    #[test]
    fn test_has_next_delegates() {
        let mut cursor = Cursor::from_vec(vec![7]);
        let mut iter = cursor.iter();

        assert!(iter.has_next().unwrap());
        assert_eq!(iter.next().unwrap().unwrap(), 7);
        assert!(!iter.has_next().unwrap());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_adapter_does_not_close_early_abandon() {
        let (producer, probe) = TrackedProducer::new(vec![1, 2, 3]);
        let mut cursor = Cursor::new(producer);

        {
            let mut iter = cursor.iter();
            iter.next();
        }

        // Abandonar o adaptador não libera a fonte
        assert_eq!(probe.releases(), 0);
        assert!(cursor.has_next().unwrap());
        assert_eq!(cursor.next().unwrap(), 2);

        cursor.close().unwrap();
        assert_eq!(probe.releases(), 1);
    }

    #[test]
    fn test_error_is_yielded_once() {
        let (producer, _probe) = TrackedProducer::new(vec![1, 2, 3]);
        let mut cursor = Cursor::new(producer.failing_after(1));
        let mut iter = cursor.iter();

        assert_eq!(iter.next().unwrap().unwrap(), 1);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_closed_cursor_iterates_nothing() {
        let mut cursor = Cursor::from_vec(vec![1, 2]);
        cursor.close().unwrap();
        assert_eq!(cursor.iter().count(), 0);
    }

    #[test]
    fn test_iter_size_hint() {
        let mut cursor = Cursor::from_vec(vec![1, 2, 3, 4]);
        let iter = cursor.iter();
        assert_eq!(iter.size_hint(), (4, Some(4)));
    }
}
