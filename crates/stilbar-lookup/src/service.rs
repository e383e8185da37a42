// Archivo: service.rs
// Propósito: implementar `CatalogService`, la fachada de alto nivel que
// consumen las capas de presentación (CLI, UI web). Orquesta el catálogo
// y el resolutor; nunca mantiene estado ambiental propio.
use crate::errors::Result;
use crate::repository::{CatalogStats, CompoundRepository};
use crate::resolver::{CodeResolver, Resolution};
use std::sync::Arc;
use stilbar_domain::{CompoundRecord, DeleteOutcome};

/// Servicio de alto nivel sobre el catálogo de compuestos.
///
/// Se construye inyectando el `CompoundRepository`; el `CodeResolver` se
/// construye internamente y se reusa. Cada operación recibe el estado del
/// catálogo a través del handle inyectado.
pub struct CatalogService<R>
    where R: CompoundRepository
{
    repo: Arc<R>,
    resolver: CodeResolver<R>,
}

impl<R> CatalogService<R> where R: CompoundRepository + 'static
{
    /// Crea el servicio inyectando el catálogo.
    pub fn new(repo: Arc<R>) -> Self {
        let resolver = CodeResolver::new(repo.clone());
        Self { repo, resolver }
    }

    /// Resuelve una entrada libre a estructura + metadatos de
    /// procedencia. "No encontrado" llega como `Resolution` sin
    /// estructura, no como error.
    pub fn lookup(&self, input: &str) -> Result<Resolution> {
        self.resolver.resolve(input)
    }

    /// Lista todos los registros en el orden estable de la tabla.
    pub fn list_all(&self) -> Result<Vec<CompoundRecord>> {
        self.repo.records()
    }

    /// Alta de un compuesto; devuelve la identidad derivada o
    /// `DuplicateIdentity` si colisiona.
    pub fn add(&self, name: &str, code: &str, structure: &str) -> Result<String> {
        self.repo.add_record(name, code, structure)
    }

    /// Borrado por lotes; las identidades no encontradas se reportan por
    /// elemento sin abortar el resto.
    pub fn delete(&self, identities: &[String]) -> Result<DeleteOutcome> {
        self.repo.delete_records(identities)
    }

    /// Estadísticas ligeras del catálogo.
    pub fn stats(&self) -> Result<CatalogStats> {
        self.repo.stats()
    }

    /// Reconstruye el índice desde la tabla persistida.
    pub fn reload(&self) -> Result<usize> {
        self.repo.reload()
    }
}
