// compound_store.rs
use crate::csv_table::{encode_table, parse_table, strip_bom, TABLE_HEADER};
use indexmap::IndexMap;
use log::{info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use stilbar_domain::{compound_identity, normalize_code, CompoundRecord, DeleteOutcome, DeletedCompound, DomainError};
use stilbar_lookup::{CatalogStats, CompoundRepository, DUP_SEPARATOR};

struct Inner {
  /// identidad → registro, en orden de inserción (orden estable de la
  /// tabla dentro de una misma carga).
  records: IndexMap<String, CompoundRecord>,
  /// clave de código → identidad. Los códigos repetidos se indexan bajo
  /// claves sufijadas `código#N`.
  code_index: IndexMap<String, String>,
  /// La tabla llegó con BOM; se conserva al reescribir.
  had_bom: bool,
  skipped_rows: usize,
}

impl Inner {
  fn empty() -> Self {
    Self { records: IndexMap::new(), code_index: IndexMap::new(), had_bom: false, skipped_rows: 0 }
  }
}

/// Store de compuestos respaldado por un fichero CSV.
///
/// La tabla persistida y el índice en memoria se mantienen consistentes:
/// cada carga reconstruye el índice completo, y las mutaciones sólo
/// actualizan la memoria después de que la escritura del fichero haya
/// terminado. Una escritura fallida deja el índice en el estado previo;
/// el llamador debe recargar para resincronizar ante cualquier resultado
/// incierto.
///
/// No hay locking entre procesos: un único escritor por tabla.
pub struct CompoundStore {
  path: PathBuf,
  inner: Mutex<Inner>,
}

impl CompoundStore {
  /// Abre el store sobre la tabla indicada y carga el índice. Un fichero
  /// ausente o ilegible no es error: el store arranca vacío y lo deja
  /// registrado en el log.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let inner = load_from_disk(&path);
    Self { path, inner: Mutex::new(inner) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Ruta del fichero de copia de seguridad que deja `delete`.
  pub fn backup_path(&self) -> PathBuf {
    let mut name = self.path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
  }

  fn lock(&self) -> Result<MutexGuard<'_, Inner>, DomainError> {
    self.inner.lock().map_err(|e| DomainError::PersistenceError(format!("mutex poisoned: {:?}", e)))
  }

  /// Reconstruye el índice en memoria desde la tabla persistida.
  pub fn reload(&self) -> Result<usize, DomainError> {
    let fresh = load_from_disk(&self.path);
    let count = fresh.records.len();
    let mut inner = self.lock()?;
    *inner = fresh;
    Ok(count)
  }

  /// Filas saltadas (malformadas) en la última carga.
  pub fn skipped_rows(&self) -> Result<usize, DomainError> {
    Ok(self.lock()?.skipped_rows)
  }

  pub fn all(&self) -> Result<Vec<CompoundRecord>, DomainError> {
    Ok(self.lock()?.records.values().cloned().collect())
  }

  pub fn by_code(&self, code: &str) -> Result<Option<CompoundRecord>, DomainError> {
    let inner = self.lock()?;
    Ok(inner.code_index.get(code).and_then(|id| inner.records.get(id)).cloned())
  }

  pub fn by_identity(&self, identity: &str) -> Result<Option<CompoundRecord>, DomainError> {
    Ok(self.lock()?.records.get(identity).cloned())
  }

  pub fn code_keys(&self) -> Result<Vec<String>, DomainError> {
    Ok(self.lock()?.code_index.keys().cloned().collect())
  }

  pub fn len(&self) -> Result<usize, DomainError> {
    Ok(self.lock()?.records.len())
  }

  pub fn is_empty(&self) -> Result<bool, DomainError> {
    Ok(self.lock()?.records.is_empty())
  }

  pub fn table_stats(&self) -> Result<CatalogStats, DomainError> {
    let inner = self.lock()?;
    let with_code = inner.records.values().filter(|r| r.has_code()).count();
    Ok(CatalogStats { total_compounds: inner.records.len(),
                      with_code,
                      without_code: inner.records.len() - with_code })
  }

  /// Alta de un compuesto: deriva la identidad del contenido, persiste la
  /// fila nueva y actualiza el índice. Falla con `DuplicateIdentity` si el
  /// par código+nombre normalizado ya existe.
  pub fn add(&self, name: &str, code: &str, structure: &str) -> Result<String, DomainError> {
    let record = CompoundRecord::from_fields(name, code, structure)?;
    let mut inner = self.lock()?;
    if inner.records.contains_key(record.identity()) {
      return Err(DomainError::DuplicateIdentity(format!("el compuesto con código '{}' ya existe (identidad: {})",
                                                        record.code(),
                                                        record.identity())));
    }

    // Releer las filas crudas y añadir la nueva al final, conservando las
    // filas existentes tal cual (una tabla legacy mantiene sus números).
    let mut rows = self.read_raw_rows()?;
    if rows.is_empty() {
      rows.push(TABLE_HEADER.iter().map(|s| s.to_string()).collect());
    }
    rows.push(vec![record.identity().to_string(),
                   record.name().to_string(),
                   record.code().to_string(),
                   record.structure().to_string()]);
    self.write_rows(&rows, inner.had_bom)?;

    // Índice sólo tras la escritura correcta
    let identity = record.identity().to_string();
    if record.has_code() {
      let key = next_code_key(&inner.code_index, record.code());
      inner.code_index.insert(key, identity.clone());
    }
    inner.records.insert(identity.clone(), record);
    Ok(identity)
  }

  /// Borrado por lotes de identidades. Las identidades no encontradas se
  /// reportan como errores no fatales; si ninguna existe, la operación
  /// entera falla y la tabla queda intacta. Antes de sobrescribir se deja
  /// una copia `.backup` byte a byte de la tabla previa.
  pub fn delete(&self, identities: &[String]) -> Result<DeleteOutcome, DomainError> {
    let mut inner = self.lock()?;
    let mut outcome = DeleteOutcome::default();
    let mut victims: Vec<CompoundRecord> = Vec::new();
    for identity in identities {
      match inner.records.get(identity.as_str()) {
        Some(rec) => victims.push(rec.clone()),
        None => outcome.errors.push(format!("Identidad no encontrada: {}", identity)),
      }
    }
    if victims.is_empty() {
      outcome.errors.push("No se encontraron compuestos válidos para eliminar".to_string());
      return Ok(outcome);
    }

    let backup = self.backup_path();
    fs::copy(&self.path, &backup)?;
    info!("copia de seguridad creada: {}", backup.display());

    // Filtrar filas crudas casando nombre+código+estructura: funciona
    // igual sobre la tabla hash y sobre una tabla legacy numérica.
    let rows = self.read_raw_rows()?;
    let mut filtered: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
      if i == 0 {
        filtered.push(row.clone());
        continue;
      }
      let name = row.get(1).map(|s| s.trim()).unwrap_or("");
      let code = row.get(2).map(|s| normalize_code(s)).unwrap_or_default();
      let smiles = row.get(3).map(|s| s.trim()).unwrap_or("");
      let hit = victims.iter().any(|v| v.name() == name && v.code() == code && v.structure() == smiles);
      if !hit {
        filtered.push(row.clone());
      }
    }
    self.write_rows(&filtered, inner.had_bom)?;

    for victim in &victims {
      let identity = victim.identity().to_string();
      inner.records.shift_remove(&identity);
      inner.code_index.retain(|_, id| *id != identity);
      outcome.deleted.push(DeletedCompound { identity,
                                             name: victim.name().to_string(),
                                             code: victim.code().to_string() });
    }
    outcome.deleted_count = victims.len();
    outcome.success = true;
    info!("eliminados {} compuestos de {}", outcome.deleted_count, self.path.display());
    Ok(outcome)
  }

  fn read_raw_rows(&self) -> Result<Vec<Vec<String>>, DomainError> {
    match fs::read_to_string(&self.path) {
      Ok(content) => Ok(parse_table(strip_bom(&content))),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
      Err(e) => Err(DomainError::PersistenceError(format!("no se pudo leer {}: {}", self.path.display(), e))),
    }
  }

  fn write_rows(&self, rows: &[Vec<String>], with_bom: bool) -> Result<(), DomainError> {
    let mut content = encode_table(rows);
    if with_bom {
      content.insert(0, '\u{feff}');
    }
    fs::write(&self.path, content)
      .map_err(|e| DomainError::PersistenceError(format!("no se pudo escribir {}: {}", self.path.display(), e)))
  }
}

/// Carga la tabla desde disco reconstruyendo el índice completo. Las filas
/// sin estructura, o sin código y sin nombre, se saltan y se cuentan; la
/// carga nunca aborta por una fila malformada.
fn load_from_disk(path: &Path) -> Inner {
  let content = match fs::read_to_string(path) {
    Ok(c) => c,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      warn!("tabla no encontrada: {} (store vacío)", path.display());
      return Inner::empty();
    }
    Err(e) => {
      warn!("no se pudo leer {}: {} (store vacío)", path.display(), e);
      return Inner::empty();
    }
  };

  let mut inner = Inner::empty();
  inner.had_bom = content.starts_with('\u{feff}');
  let rows = parse_table(strip_bom(&content));
  for row in rows.iter().skip(1) {
    let name = row.get(1).map(|s| s.trim()).unwrap_or("");
    let code = row.get(2).map(|s| s.trim()).unwrap_or("");
    let smiles = row.get(3).map(|s| s.trim()).unwrap_or("");
    if smiles.is_empty() || (code.is_empty() && name.is_empty()) {
      inner.skipped_rows += 1;
      continue;
    }
    // La identidad se deriva siempre del contenido; en una tabla legacy la
    // primera columna es un número de secuencia y no sirve como identidad
    // estable ante borrados.
    let identity = compound_identity(code, name);
    if inner.records.contains_key(&identity) {
      warn!("identidad duplicada {} en {} (fila saltada)", identity, path.display());
      inner.skipped_rows += 1;
      continue;
    }
    let record = match CompoundRecord::from_parts(&identity, name, code, smiles) {
      Ok(r) => r,
      Err(e) => {
        warn!("fila malformada en {}: {} (saltada)", path.display(), e);
        inner.skipped_rows += 1;
        continue;
      }
    };
    if record.has_code() {
      let key = next_code_key(&inner.code_index, record.code());
      inner.code_index.insert(key, identity.clone());
    }
    inner.records.insert(identity, record);
  }
  info!("cargados {} compuestos de {} ({} filas saltadas)",
        inner.records.len(),
        path.display(),
        inner.skipped_rows);
  inner
}

/// Clave de índice para un código: la desnuda si está libre, o la primera
/// sufijada `código#N` disponible (N = 2, 3, ...).
fn next_code_key(code_index: &IndexMap<String, String>, code: &str) -> String {
  if !code_index.contains_key(code) {
    return code.to_string();
  }
  let mut n = 2usize;
  loop {
    let key = format!("{}{}{}", code, DUP_SEPARATOR, n);
    if !code_index.contains_key(&key) {
      return key;
    }
    n += 1;
  }
}

impl CompoundRepository for CompoundStore {
  fn record_by_code(&self, code: &str) -> stilbar_lookup::Result<Option<CompoundRecord>> {
    Ok(self.by_code(code)?)
  }

  fn record_by_identity(&self, identity: &str) -> stilbar_lookup::Result<Option<CompoundRecord>> {
    Ok(self.by_identity(identity)?)
  }

  fn records(&self) -> stilbar_lookup::Result<Vec<CompoundRecord>> {
    Ok(self.all()?)
  }

  fn codes(&self) -> stilbar_lookup::Result<Vec<String>> {
    Ok(self.code_keys()?)
  }

  fn record_count(&self) -> stilbar_lookup::Result<usize> {
    Ok(self.len()?)
  }

  fn add_record(&self, name: &str, code: &str, structure: &str) -> stilbar_lookup::Result<String> {
    Ok(self.add(name, code, structure)?)
  }

  fn delete_records(&self, identities: &[String]) -> stilbar_lookup::Result<DeleteOutcome> {
    Ok(self.delete(identities)?)
  }

  fn reload(&self) -> stilbar_lookup::Result<usize> {
    Ok(CompoundStore::reload(self)?)
  }

  fn stats(&self) -> stilbar_lookup::Result<CatalogStats> {
    Ok(self.table_stats()?)
  }
}
