//! Cursores: sequências de passagem única, produzidas sob demanda e
//! com liberação determinística de recursos.
//!
//! Um [`Cursor`] é dono exclusivo de um [`SequenceProducer`] (arquivo aberto,
//! conexão SQLite, iterador em memória) e garante que o recurso seja
//! liberado exatamente uma vez:
//!
//! - explicitamente, via [`Cursor::close`];
//! - automaticamente, quando a fonte se esgota;
//! - ao sair de escopo (`Drop`), se nenhum dos anteriores ocorreu.
//!
//! Cursores podem ser compostos (`map`, `filter`, `limit`, `concat`) sem
//! consumir a fonte antecipadamente, e expostos como [`Iterator`] através de
//! [`CursorIter`].

mod cursor;
mod iter;
mod memory;
mod text;
mod transform;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(test)]
pub(crate) mod test_support;

pub use cursor::Cursor;
pub use iter::CursorIter;
pub use memory::IterProducer;
pub use text::DelimitedTextProducer;

#[cfg(feature = "sqlite")]
pub use sqlite::{RatingStore, SqliteRatingProducer};

use crate::RecoResult;

/// Fonte de registros puxada um a um por um [`Cursor`].
///
/// Implementações não precisam se preocupar com estado de ciclo de vida:
/// o cursor garante que `produce` não é chamado depois de `release`, e que
/// `release` é chamado no máximo uma vez.
pub trait SequenceProducer: Send {
    /// Tipo dos registros produzidos.
    type Item;

    /// Produz o próximo registro, ou `None` quando a fonte se esgotou.
    fn produce(&mut self) -> RecoResult<Option<Self::Item>>;

    /// Quantidade de registros ainda não produzidos, se conhecida.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }

    /// Libera os recursos da fonte (fecha arquivos, conexões, etc).
    fn release(&mut self) -> RecoResult<()> {
        Ok(())
    }
}
