// compound.rs
use crate::identity::{compound_identity, normalize_code};
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Una entrada del catálogo: identidad estable, nombre libre, código
/// StilBAR (puede estar vacío) y estructura SMILES (nunca vacía).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundRecord {
  identity: String,
  name: String,
  code: String,
  structure: String,
}

impl CompoundRecord {
  fn new(identity: &str, name: &str, code: &str, structure: &str) -> Result<Self, DomainError> {
    if identity.trim().is_empty() {
      return Err(DomainError::ValidationError("La identidad no puede estar vacía".to_string()));
    }
    if structure.trim().is_empty() {
      return Err(DomainError::ValidationError("SMILES no puede estar vacío".to_string()));
    }
    if code.trim().is_empty() && name.trim().is_empty() {
      return Err(DomainError::ValidationError("Se requiere código o nombre".to_string()));
    }
    // El código se guarda siempre normalizado (guion largo, sin
    // espacios); toda comparación posterior parte de esa forma.
    Ok(Self { identity: identity.trim().to_string(),
              name: name.trim().to_string(),
              code: normalize_code(code),
              structure: structure.trim().to_string() })
  }

  /// Reconstruye un registro con una identidad ya conocida (por ejemplo
  /// leída de la tabla persistida).
  pub fn from_parts(identity: &str, name: &str, code: &str, structure: &str) -> Result<Self, DomainError> {
    Self::new(identity, name, code, structure)
  }

  /// Crea un registro nuevo derivando la identidad del contenido
  /// (`compound_identity` sobre código+nombre).
  pub fn from_fields(name: &str, code: &str, structure: &str) -> Result<Self, DomainError> {
    let identity = compound_identity(code, name);
    Self::new(&identity, name, code, structure)
  }

  pub fn identity(&self) -> &str {
    &self.identity
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn structure(&self) -> &str {
    &self.structure
  }

  pub fn has_code(&self) -> bool {
    !self.code.is_empty()
  }

  pub fn is_same(&self, other: &CompoundRecord) -> bool {
    self.identity == other.identity
  }
}

impl fmt::Display for CompoundRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "CompoundRecord(identity: {}, code: {}, name: {})",
           self.identity,
           if self.code.is_empty() { "-" } else { &self.code },
           self.name)
  }
}

/// Resumen de un compuesto eliminado, devuelto dentro de `DeleteOutcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedCompound {
  pub identity: String,
  pub name: String,
  pub code: String,
}

/// Resultado de una eliminación por lotes. Las identidades no resueltas se
/// reportan en `errors` sin abortar el borrado del resto; `success` es
/// false sólo cuando ninguna identidad pedida existía.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteOutcome {
  pub success: bool,
  pub deleted_count: usize,
  pub deleted: Vec<DeletedCompound>,
  pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_fields_derives_identity() -> Result<(), DomainError> {
    let rec = CompoundRecord::from_fields("Wolfender2024_PhenoxyRadicalCoupling_cpd10",
                                          "H",
                                          "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1")?;
    assert_eq!(rec.identity(), "763631d4");
    assert!(rec.has_code());
    Ok(())
  }

  #[test]
  fn empty_structure_is_rejected() {
    let res = CompoundRecord::from_fields("algo", "H–77–H", "   ");
    assert!(res.is_err());
  }

  #[test]
  fn record_without_code_or_name_is_rejected() {
    let res = CompoundRecord::from_parts("abcd1234", "", "", "CCO");
    assert!(res.is_err());
  }

  #[test]
  fn is_same_compares_identity_only() -> Result<(), DomainError> {
    let a = CompoundRecord::from_parts("aaaa1111", "uno", "H", "CCO")?;
    let b = CompoundRecord::from_parts("aaaa1111", "otro nombre", "T", "CCN")?;
    assert!(a.is_same(&b));
    Ok(())
  }
}
