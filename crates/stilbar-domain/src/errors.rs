// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Identidad duplicada: {0}")]
  DuplicateIdentity(String),
  #[error("No encontrado: {0}")]
  NotFound(String),
  #[error("Error de persistencia: {0}")]
  PersistenceError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<std::io::Error> for DomainError {
  fn from(e: std::io::Error) -> Self {
    Self::PersistenceError(e.to_string())
  }
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}
