//! Crate `stilbar-providers` — validación de estructuras y descriptores.
//!
//! Expone un motor ligero que parsea cadenas SMILES lo suficiente como
//! para validar su sintaxis y calcular descriptores de presentación
//! (fórmula, peso molecular medio, átomos pesados, anillos). Es un
//! colaborador opcional: el catálogo y el resolutor nunca dependen de él
//! para la corrección de las búsquedas, sólo las capas de presentación lo
//! consultan y degradan con elegancia si una estructura no parsea.
mod smiles;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EngineError {
  #[error("Estructura inválida: {0}")]
  InvalidStructure(String),
  #[error("Elemento no soportado: {0}")]
  UnsupportedElement(String),
}

/// Descriptores de una estructura aceptada por el motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStructure {
  pub smiles: String,
  pub formula: String,
  pub molecular_weight: f64,
  pub heavy_atoms: usize,
  pub rings: usize,
}

/// Motor de estructuras. Sin estado; `init` se mantiene por simetría con
/// motores externos que sí necesitan arranque.
pub struct StructureEngine;

impl StructureEngine {
  pub fn init() -> Result<Self, EngineError> {
    Ok(Self)
  }

  /// Parsea un SMILES y devuelve sus descriptores, o un error si la
  /// cadena no es una estructura bien formada.
  pub fn parse(&self, smiles: &str) -> Result<ParsedStructure, EngineError> {
    let scan = smiles::scan(smiles.trim())?;
    Ok(ParsedStructure { smiles: smiles.trim().to_string(),
                         formula: scan.formula,
                         molecular_weight: scan.molecular_weight,
                         heavy_atoms: scan.heavy_atoms,
                         rings: scan.rings })
  }

  /// Comprobación rápida de validez sin descriptores.
  pub fn is_valid(&self, smiles: &str) -> bool {
    self.parse(smiles).is_ok()
  }
}
