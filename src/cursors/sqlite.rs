//! Avaliações em SQLite: armazenamento e fonte paginada.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};

use super::{Cursor, SequenceProducer};
use crate::{Rating, RecoError, RecoResult};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS ratings (
        user_id INTEGER NOT NULL,
        item_id INTEGER NOT NULL,
        rating REAL NOT NULL,
        timestamp INTEGER
    );

    CREATE INDEX IF NOT EXISTS idx_ratings_user ON ratings(user_id);
"#;

/// Banco de avaliações.
///
/// Cada cursor aberto pelo store recebe sua própria conexão, da qual é
/// dono exclusivo.
pub struct RatingStore {
    conn: Connection,
    path: PathBuf,
}

impl RatingStore {
    /// Cria ou abre o banco, garantindo o schema.
    pub fn open(path: &Path) -> RecoResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Insere todas as avaliações do cursor em uma única transação.
    ///
    /// O cursor é fechado ao final. Se algo falhar a transação é desfeita.
    pub fn import(&mut self, mut ratings: Cursor<Rating>) -> RecoResult<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ratings (user_id, item_id, rating, timestamp) VALUES (?, ?, ?, ?)",
            )?;
            while ratings.has_next()? {
                let rating = ratings.next()?;
                stmt.execute(params![rating.user, rating.item, rating.value, rating.timestamp])?;
                count += 1;
            }
        }
        tx.commit()?;
        ratings.close()?;

        tracing::info!(path = %self.path.display(), count, "Ratings imported");
        Ok(count)
    }

    /// Número de avaliações armazenadas.
    pub fn count(&self) -> RecoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| RecoError::other("contagem negativa"))
    }

    /// Abre um cursor sobre todas as avaliações, em ordem de inserção.
    pub fn cursor(&self, page_size: usize) -> RecoResult<Cursor<Rating>> {
        Ok(Cursor::new(SqliteRatingProducer::open(&self.path, page_size)?))
    }
}

/// Fonte paginada sobre a tabela `ratings`.
///
/// Lê em páginas de `page_size` linhas por `rowid`, sem manter statements
/// abertos entre chamadas. A conexão é fechada ao liberar.
pub struct SqliteRatingProducer {
    conn: Option<Connection>,
    page: VecDeque<Rating>,
    page_size: usize,
    last_rowid: i64,
    remaining: usize,
    drained: bool,
}

impl SqliteRatingProducer {
    /// Abre uma conexão dedicada ao cursor, somente leitura.
    ///
    /// Um banco inexistente é erro; o arquivo não é criado.
    pub fn open(path: &Path, page_size: usize) -> RecoResult<Self> {
        if page_size == 0 {
            return Err(RecoError::config("page_size must be at least 1"));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))?;
        tracing::debug!(path = %path.display(), total, "Opened rating table");

        Ok(Self {
            conn: Some(conn),
            page: VecDeque::with_capacity(page_size),
            page_size,
            last_rowid: 0,
            remaining: usize::try_from(total).unwrap_or(0),
            drained: false,
        })
    }

    fn fetch_page(&mut self) -> RecoResult<()> {
        let Some(conn) = self.conn.as_ref() else {
            self.drained = true;
            return Ok(());
        };

        let mut stmt = conn.prepare_cached(
            "SELECT rowid, user_id, item_id, rating, timestamp
             FROM ratings WHERE rowid > ? ORDER BY rowid LIMIT ?",
        )?;

        let limit = i64::try_from(self.page_size).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![self.last_rowid, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                Rating {
                    user: row.get(1)?,
                    item: row.get(2)?,
                    value: row.get(3)?,
                    timestamp: row.get(4)?,
                },
            ))
        })?;

        for row in rows {
            let (rowid, rating) = row?;
            self.last_rowid = rowid;
            self.page.push_back(rating);
        }

        if self.page.len() < self.page_size {
            self.drained = true;
        }
        Ok(())
    }
}

impl SequenceProducer for SqliteRatingProducer {
    type Item = Rating;

    fn produce(&mut self) -> RecoResult<Option<Rating>> {
        if self.page.is_empty() && !self.drained {
            self.fetch_page()?;
        }

        let rating = self.page.pop_front();
        if rating.is_some() {
            self.remaining = self.remaining.saturating_sub(1);
        }
        Ok(rating)
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.conn.as_ref().map(|_| self.remaining)
    }

    fn release(&mut self) -> RecoResult<()> {
        self.page.clear();
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| RecoError::from(e))?;
            tracing::debug!("Closed rating table connection");
        }
        Ok(())
    }
}
