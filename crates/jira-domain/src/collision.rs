//! Resolución de colisiones de `field_id`.
//!
//! Dos hojas pueden producir el mismo path key (p.ej. un campo `a_b` junto a
//! `a: {b: ..}`). El contador vive durante un recorrido completo y se pasa
//! explícitamente por la recursión, de modo que cada colisión sobre el mismo
//! path base recibe un sufijo nuevo (`p_0`, `p_1`, ...).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Qué hacer cuando un insert choca con la PK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Sufijos crecientes hasta encontrar un id libre.
    #[default]
    Suffix,
    /// Un único reintento con `_0`; una segunda colisión es fatal.
    SingleRetry,
}

impl CollisionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionPolicy::Suffix => "suffix",
            CollisionPolicy::SingleRetry => "single-retry",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suffix" => Ok(Self::Suffix),
            "single-retry" | "single_retry" => Ok(Self::SingleRetry),
            other => Err(DomainError::ValidationError(format!("unknown collision policy '{other}'"))),
        }
    }
}

/// Próximo sufijo libre por path base.
#[derive(Debug, Default, Clone)]
pub struct CollisionCounter {
    next: HashMap<String, u32>,
}

impl CollisionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devuelve `base_n` con el `n` pendiente para `base` y lo avanza.
    pub fn next_candidate(&mut self, base: &str) -> String {
        let n = self.next.entry(base.to_string()).or_insert(0);
        let candidate = format!("{base}_{n}");
        *n += 1;
        candidate
    }

    /// Cuántos sufijos se han emitido para `base`.
    pub fn issued(&self, base: &str) -> u32 {
        self.next.get(base).copied().unwrap_or(0)
    }
}
