//! Crate `stilbar-store` — persistencia CSV del catálogo de compuestos.
//!
//! `CompoundStore` implementa el contrato `CompoundRepository` de
//! `stilbar-lookup` sobre un fichero CSV de cuatro columnas
//! (`num,compound_name,barcode,smiles`). Cada carga reconstruye el índice
//! completo en memoria; las mutaciones reescriben la tabla entera en una
//! pasada y, en el caso del borrado, dejan antes una copia `.backup`
//! byte a byte de la tabla previa.
mod compound_store;
mod csv_table;

pub use compound_store::CompoundStore;
pub use csv_table::{encode_table, parse_table, strip_bom, TABLE_HEADER};

/// Fichero por defecto cuando `STILBAR_CSV` no está definida.
pub const DEFAULT_TABLE: &str = "Stilabar_Smiles_Perfect.csv";

/// Crea el store desde las variables de entorno: `STILBAR_CSV` apunta a la
/// tabla; si no está definida se usa `DEFAULT_TABLE` en el directorio de
/// trabajo. Un fichero ausente no es error: el store arranca vacío y lo
/// deja registrado.
pub fn new_from_env() -> CompoundStore {
  dotenvy::dotenv().ok();
  let path = std::env::var("STILBAR_CSV").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
  CompoundStore::open(path)
}
