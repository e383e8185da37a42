// Archivo: repository.rs
// Propósito: definir el trait `CompoundRepository`, el contrato que deben
// implementar los catálogos concretos (CSV persistente, in-memory, etc.).
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use stilbar_domain::{CompoundRecord, DeleteOutcome};

/// Estadísticas ligeras del catálogo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_compounds: usize,
    pub with_code: usize,
    pub without_code: usize,
}

/// Contrato mínimo del catálogo de compuestos.
///
/// El catálogo mantiene la tabla autoritativa de registros y un índice
/// código→registro. Cada recarga reconstruye el índice completo desde la
/// tabla persistida; no hay deriva incremental.
pub trait CompoundRepository: Send + Sync {
    /// Busca un registro por su clave de código exacta tal y como está
    /// indexada (incluye las claves sufijadas de códigos duplicados).
    fn record_by_code(&self, code: &str) -> Result<Option<CompoundRecord>>;

    /// Busca un registro por identidad.
    fn record_by_identity(&self, identity: &str) -> Result<Option<CompoundRecord>>;

    /// Devuelve todos los registros en un orden estable dentro de una
    /// misma carga (orden de inserción).
    fn records(&self) -> Result<Vec<CompoundRecord>>;

    /// Devuelve las claves de código indexadas, en orden estable.
    fn codes(&self) -> Result<Vec<String>>;

    /// Número de registros cargados.
    fn record_count(&self) -> Result<usize>;

    /// Alta de un compuesto. Deriva la identidad del contenido y devuelve
    /// esa identidad; falla con `DuplicateIdentity` si ya existe.
    fn add_record(&self, name: &str, code: &str, structure: &str) -> Result<String>;

    /// Borrado por lotes de identidades. Las identidades no resueltas se
    /// reportan por elemento en el resultado sin abortar el resto.
    fn delete_records(&self, identities: &[String]) -> Result<DeleteOutcome>;

    /// Reconstruye el índice en memoria desde la tabla persistida.
    /// Devuelve el número de registros cargados.
    fn reload(&self) -> Result<usize>;

    /// Estadísticas del catálogo.
    fn stats(&self) -> Result<CatalogStats>;
}
