//! # recokit
//!
//! Peças de infraestrutura para pipelines de recomendação.
//!
//! - Cursores de passagem única sobre fontes de dados (arquivos, SQLite,
//!   iteradores em memória), com liberação determinística de recursos.
//! - Scorers de itens e um decorador que memoriza os scores do último
//!   usuário consultado.
//!
//! ## Módulos
//!
//! - [`cursors`] - Cursores, fontes e transformações
//! - [`scoring`] - Trait de scorer, variantes e cache por usuário
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados (avaliações, erros, configuração)

#[cfg(feature = "cli")]
pub mod cli;
pub mod cursors;
pub mod scoring;
pub mod types;

pub use cursors::{Cursor, CursorIter, SequenceProducer};
pub use scoring::{CachingItemScorer, ItemScorer, ScoreMap};
pub use types::config::Config;
pub use types::errors::{RecoError, RecoResult};
pub use types::ratings::{ItemId, Rating, UserId};
