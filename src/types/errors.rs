//! Tipos de erro do recokit.

use thiserror::Error;

use super::ratings::{ItemId, UserId};

/// Tipo de resultado padrão do recokit.
pub type RecoResult<T> = Result<T, RecoError>;

/// Erros possíveis no recokit.
#[derive(Error, Debug)]
pub enum RecoError {
    #[error("Cursor esgotado: não há mais elementos")]
    CursorExhausted,

    #[error("Cursor fechado")]
    CursorClosed,

    #[error("Operação não suportada: {0}")]
    UnsupportedOperation(&'static str),

    #[error("Sem score para usuário {user}, item {item}")]
    NotScorable { user: UserId, item: ItemId },

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("Erro de SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Linha {line} inválida: {message}")]
    Parse { line: usize, message: String },

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Scorer falhou: {0}")]
    Scorer(String),

    #[error("{0}")]
    Other(String),
}

impl RecoError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro vindo de um scorer delegado.
    pub fn scorer<S: Into<String>>(msg: S) -> Self {
        Self::Scorer(msg.into())
    }
}
