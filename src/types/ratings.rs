//! Registros de avaliação (user, item, rating).

use serde::{Deserialize, Serialize};

use super::errors::{RecoError, RecoResult};

/// Identificador de usuário.
pub type UserId = i64;

/// Identificador de item.
pub type ItemId = i64;

/// Uma avaliação de um usuário para um item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Usuário que avaliou.
    pub user: UserId,

    /// Item avaliado.
    pub item: ItemId,

    /// Valor da avaliação.
    pub value: f64,

    /// Momento da avaliação (epoch em segundos), se conhecido.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Rating {
    /// Cria uma nova avaliação sem timestamp.
    pub fn new(user: UserId, item: ItemId, value: f64) -> Self {
        Self {
            user,
            item,
            value,
            timestamp: None,
        }
    }

    /// Define o timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Parseia uma linha delimitada `user<d>item<d>rating[<d>timestamp]`.
    ///
    /// `line_no` só é usado para compor a mensagem de erro.
    pub fn parse_line(line: &str, delimiter: &str, line_no: usize) -> RecoResult<Self> {
        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if fields.len() < 3 || fields.len() > 4 {
            return Err(RecoError::Parse {
                line: line_no,
                message: format!("esperados 3 ou 4 campos, encontrados {}", fields.len()),
            });
        }

        let parse_err = |field: &str, value: &str| RecoError::Parse {
            line: line_no,
            message: format!("{} inválido: '{}'", field, value),
        };

        let user = fields[0]
            .parse::<UserId>()
            .map_err(|_| parse_err("user", fields[0]))?;
        let item = fields[1]
            .parse::<ItemId>()
            .map_err(|_| parse_err("item", fields[1]))?;
        let value = fields[2]
            .parse::<f64>()
            .map_err(|_| parse_err("rating", fields[2]))?;

        let timestamp = match fields.get(3) {
            Some(raw) if !raw.is_empty() => {
                Some(raw.parse::<i64>().map_err(|_| parse_err("timestamp", raw))?)
            }
            _ => None,
        };

        Ok(Self {
            user,
            item,
            value,
            timestamp,
        })
    }

    /// Formata a avaliação como linha delimitada.
    pub fn to_line(&self, delimiter: &str) -> String {
        match self.timestamp {
            Some(ts) => format!(
                "{}{d}{}{d}{}{d}{}",
                self.user,
                self.item,
                self.value,
                ts,
                d = delimiter
            ),
            None => format!("{}{d}{}{d}{}", self.user, self.item, self.value, d = delimiter),
        }
    }
}
