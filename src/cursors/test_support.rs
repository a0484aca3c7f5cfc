//! Fonte instrumentada usada pelos testes de cursor.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::SequenceProducer;
use crate::RecoResult;

/// Contadores compartilhados com o teste.
#[derive(Debug, Clone, Default)]
pub(crate) struct Probe {
    produced: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl Probe {
    pub(crate) fn produced(&self) -> usize {
        self.produced.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Fonte que conta pulls e liberações, e pode falhar depois de N itens.
pub(crate) struct TrackedProducer<T> {
    items: VecDeque<T>,
    probe: Probe,
    fail_after: Option<usize>,
    hint: bool,
}

impl<T> TrackedProducer<T> {
    pub(crate) fn new(items: Vec<T>) -> (Self, Probe) {
        let probe = Probe::default();
        let producer = Self {
            items: items.into(),
            probe: probe.clone(),
            fail_after: None,
            hint: true,
        };
        (producer, probe)
    }

    pub(crate) fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub(crate) fn without_hint(mut self) -> Self {
        self.hint = false;
        self
    }
}

impl<T: Send> SequenceProducer for TrackedProducer<T> {
    type Item = T;

    fn produce(&mut self) -> RecoResult<Option<T>> {
        assert_eq!(self.probe.releases(), 0, "produce called after release");

        if let Some(limit) = self.fail_after {
            if self.probe.produced() >= limit {
                return Err(std::io::Error::other("source failure").into());
            }
        }

        let item = self.items.pop_front();
        if item.is_some() {
            self.probe.produced.fetch_add(1, Ordering::SeqCst);
        }
        Ok(item)
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.hint.then_some(self.items.len())
    }

    fn release(&mut self) -> RecoResult<()> {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        self.items.clear();
        Ok(())
    }
}
