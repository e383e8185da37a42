// Archivo: errors.rs
// Propósito: definir los errores del dominio de búsqueda y el alias
// Result<T> usado por las APIs del crate.
use stilbar_domain::DomainError;
use thiserror::Error;
/// Errores comunes del catálogo de compuestos.
///
/// - `NotFound`: entidad no encontrada.
/// - `DuplicateIdentity`: un alta colisionaría con una identidad existente.
/// - `Storage`: error al acceder al almacenamiento externo.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Entidad no encontrada (por ejemplo, una identidad al eliminar).
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// El alta colisionaría con una identidad ya registrada.
    #[error("Identidad duplicada: {0}")]
    DuplicateIdentity(String),
    /// Error genérico de almacenamiento (fichero CSV, E/S, etc.).
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Otro tipo de error.
    #[error("Otro: {0}")]
    Other(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, LookupError>;

impl From<DomainError> for LookupError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(m) => Self::NotFound(m),
            DomainError::DuplicateIdentity(m) => Self::DuplicateIdentity(m),
            DomainError::PersistenceError(m) => Self::Storage(m),
            other => Self::Other(other.to_string()),
        }
    }
}
