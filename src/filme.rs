//! The `Filme` record, its form draft, and the create payload.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub const NOTA_MIN: f64 = 0.0;
pub const NOTA_MAX: f64 = 5.0;

/// Server-assigned identifier. The backend may emit numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilmeId {
    Num(i64),
    Text(String),
}

impl fmt::Display for FilmeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilmeId {
    fn from(value: &str) -> Self {
        // CLI input arrives as text; keep numeric ids numeric so equality with
        // list entries holds.
        value
            .parse::<i64>()
            .map_or_else(|_| Self::Text(value.to_string()), Self::Num)
    }
}

/// A movie record as returned by the backend.
///
/// Blank fields are submitted as `null`, so the echoed record may carry
/// `null` (or omit the key) for any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filme {
    pub id: FilmeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descricao: String,
    #[serde(default)]
    pub nota: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub diretor: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Form state exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmeDraft {
    pub nome: String,
    pub descricao: String,
    pub nota: String,
    pub diretor: String,
}

impl FilmeDraft {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate the draft and build the POST payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `nota` is not a number in `[0, 5]`.
    pub fn to_new_filme(&self) -> Result<NewFilme, ValidationError> {
        Ok(NewFilme {
            nome: blank_to_none(&self.nome),
            descricao: blank_to_none(&self.descricao),
            nota: parse_nota(&self.nota)?,
            diretor: blank_to_none(&self.diretor),
        })
    }
}

/// Create payload. Empty text fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFilme {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub nota: f64,
    pub diretor: Option<String>,
}

/// Parse a rating, check it lies in `[0, 5]`, and round to one decimal.
///
/// # Errors
///
/// Returns [`ValidationError::NotaNotNumeric`] for unparsable or non-finite
/// input and [`ValidationError::NotaOutOfRange`] outside the interval.
pub fn parse_nota(raw: &str) -> Result<f64, ValidationError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::NotaNotNumeric(raw.to_string()))?;
    if !(NOTA_MIN..=NOTA_MAX).contains(&value) {
        return Err(ValidationError::NotaOutOfRange(value));
    }
    Ok(round_one_decimal(value))
}

/// Round to one decimal place. Negative zero collapses to `0.0` so the
/// payload never carries `-0.0`.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

fn blank_to_none(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

#[cfg(test)]
#[path = "filme_test.rs"]
mod tests;
