//! Interface de linha de comando do recokit.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recokit - cursores de avaliações e scorers com cache.
#[derive(Parser, Debug)]
#[command(name = "recokit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "recokit.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cria recokit.toml com a configuração padrão.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Percorre um arquivo (ou banco SQLite) de avaliações.
    Scan {
        /// Arquivo delimitado ou banco (.db, .sqlite).
        source: PathBuf,

        /// Só avaliações deste usuário.
        #[arg(short, long)]
        user: Option<i64>,

        /// Número máximo de avaliações.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Imprime cada avaliação como uma linha JSON.
        #[arg(long)]
        json: bool,
    },

    /// Pontua itens para usuários a partir das avaliações.
    Score {
        /// Arquivo delimitado ou banco (.db, .sqlite).
        source: PathBuf,

        /// Usuários, na ordem de consulta (repita ou separe por vírgula).
        #[arg(short = 'u', long = "user", value_delimiter = ',', required = true)]
        users: Vec<i64>,

        /// Itens a pontuar (separados por vírgula).
        #[arg(short, long, value_delimiter = ',', required = true)]
        items: Vec<i64>,

        /// Completa itens sem avaliação com a média do usuário.
        #[arg(long)]
        baseline: bool,
    },

    /// Importa um arquivo delimitado para um banco SQLite.
    #[cfg(feature = "sqlite")]
    Import {
        /// Arquivo delimitado de avaliações.
        input: PathBuf,

        /// Banco de destino.
        #[arg(short, long)]
        db: PathBuf,
    },

    /// Mostra versão.
    Version,
}
