//! Fonte de avaliações em arquivo de texto delimitado.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Cursor, SequenceProducer};
use crate::types::config::CursorConfig;
use crate::{Rating, RecoError, RecoResult};

/// Lê uma avaliação por linha: `user<d>item<d>rating[<d>timestamp]`.
///
/// Linhas vazias e linhas iniciadas por `#` são ignoradas. Liberar a fonte
/// fecha o arquivo.
pub struct DelimitedTextProducer {
    reader: Option<Box<dyn BufRead + Send>>,
    delimiter: String,
    skip_header: bool,
    line_no: usize,
    buffer: Vec<u8>,
}

impl DelimitedTextProducer {
    /// Cria a fonte sobre um leitor qualquer.
    pub fn from_reader<R>(reader: R, delimiter: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self {
            reader: Some(Box::new(reader)),
            delimiter: delimiter.into(),
            skip_header: false,
            line_no: 0,
            buffer: Vec::new(),
        }
    }

    /// Abre um arquivo de avaliações.
    pub fn open<P: AsRef<Path>>(path: P, config: &CursorConfig) -> RecoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Opened rating file");

        let mut producer = Self::from_reader(BufReader::new(file), config.delimiter.clone());
        producer.skip_header = config.skip_header;
        Ok(producer)
    }

    /// Abre um arquivo e já o embrulha em um [`Cursor`].
    pub fn open_cursor<P: AsRef<Path>>(path: P, config: &CursorConfig) -> RecoResult<Cursor<Rating>> {
        Ok(Cursor::new(Self::open(path, config)?))
    }

    /// Ignora a primeira linha (cabeçalho).
    pub fn with_header(mut self) -> Self {
        self.skip_header = true;
        self
    }
}

impl SequenceProducer for DelimitedTextProducer {
    type Item = Rating;

    fn produce(&mut self) -> RecoResult<Option<Rating>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            self.buffer.clear();
            if reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            // A linha conta mesmo quando não é UTF-8 válido
            self.line_no += 1;

            if self.skip_header && self.line_no == 1 {
                continue;
            }

            let line = std::str::from_utf8(&self.buffer)
                .map_err(|e| RecoError::Parse {
                    line: self.line_no,
                    message: format!("UTF-8 inválido: {}", e),
                })?
                .trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Rating::parse_line(line, &self.delimiter, self.line_no).map(Some);
        }
    }

    fn release(&mut self) -> RecoResult<()> {
        if self.reader.take().is_some() {
            tracing::debug!(lines = self.line_no, "Closed rating file");
        }
        Ok(())
    }
}
