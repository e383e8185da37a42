// Archivo: stubs.rs
// Propósito: implementación en memoria del catálogo para pruebas y wiring
// rápido. No es durable; se usa en demos y tests locales.
use crate::errors::{LookupError, Result};
use crate::repository::{CatalogStats, CompoundRepository};
use crate::resolver::DUP_SEPARATOR;
use std::sync::{Mutex, MutexGuard};
use stilbar_domain::{CompoundRecord, DeleteOutcome, DeletedCompound};

struct Inner {
    /// Registros en orden de inserción (orden estable de la tabla).
    records: Vec<CompoundRecord>,
    /// Índice clave-de-código → identidad, en orden de inserción. Las
    /// claves de códigos repetidos llevan sufijo `#N`.
    code_index: Vec<(String, String)>,
}

/// Catálogo en memoria con la misma disciplina de indexado que el store
/// CSV (claves sufijadas para duplicados, identidades derivadas del
/// contenido).
pub struct InMemoryCompoundRepository {
    inner: Mutex<Inner>,
}

impl InMemoryCompoundRepository {
    /// Crea un catálogo vacío.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { records: Vec::new(), code_index: Vec::new() }) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `LookupError::Storage`.
    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|e| LookupError::Storage(format!("mutex poisoned: {:?}", e)))
    }
}

impl Default for InMemoryCompoundRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Elige la clave de índice para un código: la desnuda si está libre, o la
/// primera sufijada `código#N` disponible (N = 2, 3, ...).
fn index_key(code_index: &[(String, String)], code: &str) -> String {
    if !code_index.iter().any(|(k, _)| k == code) {
        return code.to_string();
    }
    let mut n = 2usize;
    loop {
        let key = format!("{}{}{}", code, DUP_SEPARATOR, n);
        if !code_index.iter().any(|(k, _)| k == &key) {
            return key;
        }
        n += 1;
    }
}

impl CompoundRepository for InMemoryCompoundRepository {
    fn record_by_code(&self, code: &str) -> Result<Option<CompoundRecord>> {
        let inner = self.lock()?;
        let identity = match inner.code_index.iter().find(|(k, _)| k == code) {
            Some((_, id)) => id.clone(),
            None => return Ok(None),
        };
        Ok(inner.records.iter().find(|r| r.identity() == identity).cloned())
    }

    fn record_by_identity(&self, identity: &str) -> Result<Option<CompoundRecord>> {
        let inner = self.lock()?;
        Ok(inner.records.iter().find(|r| r.identity() == identity).cloned())
    }

    fn records(&self) -> Result<Vec<CompoundRecord>> {
        Ok(self.lock()?.records.clone())
    }

    fn codes(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.code_index.iter().map(|(k, _)| k.clone()).collect())
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    fn add_record(&self, name: &str, code: &str, structure: &str) -> Result<String> {
        let record = CompoundRecord::from_fields(name, code, structure)?;
        let mut inner = self.lock()?;
        if inner.records.iter().any(|r| r.is_same(&record)) {
            return Err(LookupError::DuplicateIdentity(record.identity().to_string()));
        }
        let identity = record.identity().to_string();
        if record.has_code() {
            let key = index_key(&inner.code_index, record.code());
            inner.code_index.push((key, identity.clone()));
        }
        inner.records.push(record);
        Ok(identity)
    }

    fn delete_records(&self, identities: &[String]) -> Result<DeleteOutcome> {
        let mut inner = self.lock()?;
        let mut outcome = DeleteOutcome::default();
        let mut to_delete: Vec<String> = Vec::new();
        for identity in identities {
            match inner.records.iter().find(|r| r.identity() == identity.as_str()) {
                Some(rec) => {
                    outcome.deleted.push(DeletedCompound { identity: rec.identity().to_string(),
                                                           name: rec.name().to_string(),
                                                           code: rec.code().to_string() });
                    to_delete.push(identity.clone());
                }
                None => outcome.errors.push(format!("Identidad no encontrada: {}", identity)),
            }
        }
        if to_delete.is_empty() {
            outcome.errors.push("No se encontraron compuestos válidos para eliminar".to_string());
            return Ok(outcome);
        }
        inner.records.retain(|r| !to_delete.iter().any(|id| id == r.identity()));
        inner.code_index.retain(|(_, id)| !to_delete.iter().any(|d| d == id));
        outcome.deleted_count = to_delete.len();
        outcome.success = true;
        Ok(outcome)
    }

    fn reload(&self) -> Result<usize> {
        // Sin tabla persistida detrás: recargar es un no-op.
        self.record_count()
    }

    fn stats(&self) -> Result<CatalogStats> {
        let inner = self.lock()?;
        let with_code = inner.records.iter().filter(|r| r.has_code()).count();
        Ok(CatalogStats { total_compounds: inner.records.len(),
                          with_code,
                          without_code: inner.records.len() - with_code })
    }
}
