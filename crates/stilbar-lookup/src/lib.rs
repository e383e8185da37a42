//! Crate `stilbar-lookup` — resolución de códigos StilBAR a estructuras
//!
//! Este crate define el contrato de catálogo `CompoundRepository`, el
//! resolutor `CodeResolver` (las estrategias de búsqueda en orden fijo),
//! la fachada `CatalogService` que consumen las capas de presentación y
//! una implementación en memoria útil para pruebas
//! (`InMemoryCompoundRepository`).
//!
//! Diseño resumido:
//! - El resolutor recibe una entrada libre (código StilBAR o índice
//!   secuencial) y prueba estrategias en orden de prioridad, parando en la
//!   primera que acierta. Cada acierto devuelve la estructura SMILES junto
//!   con metadatos de procedencia (estrategia, confianza, identidad).
//! - El catálogo se inyecta explícitamente (`Arc<R>`); no hay estado
//!   ambiental.
//!
//! Ejemplo rápido:
//! ```rust
//! use stilbar_lookup::stubs::InMemoryCompoundRepository;
//! use stilbar_lookup::CatalogService;
//! use std::sync::Arc;
//! let repo = Arc::new(InMemoryCompoundRepository::new());
//! let service = CatalogService::new(repo);
//! ```
pub mod errors;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod stubs;

pub use errors::*;
pub use repository::*;
pub use resolver::*;
pub use service::*;
pub use stubs::*;
