// Archivo: resolver.rs
// Propósito: implementar `CodeResolver`, el resolutor de entradas libres
// (código StilBAR o índice secuencial) a estructuras SMILES con metadatos
// de procedencia. Las estrategias se prueban en orden fijo y la primera
// que acierta gana.
use crate::errors::Result;
use crate::repository::CompoundRepository;
use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use stilbar_domain::{normalize_code, CompoundRecord};

/// Carácter de corchete de la notación: un fragmento de enlace parcial
/// llega delimitado por `|` a ambos lados.
pub const FRAGMENT_BRACKET: char = '|';

/// Separador sintético usado para indexar códigos duplicados
/// (`código#2`, `código#3`, ...).
pub const DUP_SEPARATOR: char = '#';

/// Tabla fija de monómeros: símbolo de una letra → (nombre genérico,
/// estructura genérica). Se consulta en último lugar, sólo cuando ninguna
/// otra estrategia acertó y la entrada es exactamente uno de los símbolos.
static FALLBACK_MONOMERS: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    HashMap::from([("T", ("trans-Resveratrol", "OC1=CC(O)=CC(/C=C/C2=CC=C(O)C=C2)=C1")),
                   ("H", ("diH-Resveratrol", "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1")),
                   ("C", ("cis-Resveratrol", "OC1=CC(O)=CC(/C=C\\C2=CC=C(O)C=C2)=C1")),
                   ("P", ("diH-Pterostilbene", "COC1=CC(OC)=CC(CCC2=CC=C(O)C=C2)=C1")),
                   ("M", ("o-Methoxy-diH-Resveratrol", "OC1=CC(O)=CC(CCC2=CC=C(O)C(OC)=C2)=C1")),
                   ("X", ("8-Methoxy-diH-Resveratrol", "OC1=CC(OC)=CC(CCC2=CC=C(O)C=C2)=C1"))])
});

/// Resultado de una resolución: la estructura (ausente cuando nada acertó)
/// y un mapa de metadatos que siempre incluye `strategy` y `confidence`.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub smiles: Option<String>,
    pub metadata: JsonValue,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        self.smiles.is_some()
    }

    pub fn strategy(&self) -> &str {
        self.metadata["strategy"].as_str().unwrap_or("unknown")
    }

    pub fn confidence(&self) -> f64 {
        self.metadata["confidence"].as_f64().unwrap_or(0.0)
    }
}

/// Resolutor de códigos sobre un catálogo inyectado.
///
/// Estrategias, en orden de prioridad:
/// 1. coincidencia exacta del código (tras recortar y quitar espacios)
/// 2. coincidencia tras normalizar guiones al guion largo
/// 3. fragmento entre corchetes `|...|` contenido en algún código
/// 4. índice secuencial 1-based sobre el orden estable de la tabla
/// 5. entrada duplicada re-indexada bajo clave sufijada
/// 6. tabla fija de monómeros de una letra
/// 7. no encontrado (marcador de fallo con diagnóstico)
///
/// La confianza es informativa: 1.0 para aciertos exactos/índice/tabla
/// fija, menor para coincidencias parciales o ambiguas. Nunca condiciona
/// si se devuelve resultado.
pub struct CodeResolver<R>
    where R: CompoundRepository
{
    repo: Arc<R>,
}

impl<R> CodeResolver<R> where R: CompoundRepository
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Resuelve una entrada libre. Los fallos de catálogo (E/S) se
    /// propagan como error; "no encontrado" NO es un error sino una
    /// `Resolution` sin estructura.
    pub fn resolve(&self, input: &str) -> Result<Resolution> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ' ').collect();
        let normalized = normalize_code(input);

        // 1. Coincidencia exacta con la entrada limpia (sensible a
        // mayúsculas: el código se compara tal cual se almacenó).
        if let Some(rec) = self.repo.record_by_code(&cleaned)? {
            return Ok(self.found("exact", 1.0, &rec, &cleaned, None));
        }

        // 2. Reintento con guiones normalizados.
        if normalized != cleaned {
            if let Some(rec) = self.repo.record_by_code(&normalized)? {
                let note = json!({"normalized": true, "normalized_code": normalized});
                return Ok(self.found("normalized", 1.0, &rec, &normalized, Some(note)));
            }
        }

        // 3. Fragmento entre corchetes: substring sobre los códigos
        // almacenados, probando la forma cruda y la normalizada.
        if is_bracket_fragment(&cleaned) {
            if let Some(res) = self.resolve_fragment(&cleaned, &normalized)? {
                return Ok(res);
            }
        }

        // 4. Índice secuencial 1-based.
        if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
            if let Some(res) = self.resolve_index(&cleaned)? {
                return Ok(res);
            }
        }

        // 5. Último recurso para códigos duplicados: la primera entrada
        // re-indexada bajo clave sufijada.
        if let Some(res) = self.resolve_duplicate(&normalized)? {
            return Ok(res);
        }

        // 6. Tabla fija de monómeros.
        if let Some((name, smiles)) = FALLBACK_MONOMERS.get(cleaned.as_str()) {
            let metadata = json!({
                "strategy": "fallback",
                "confidence": 1.0,
                "compound_name": name,
                "matched_code": cleaned,
                "note": "estructura genérica de la tabla de monómeros",
            });
            return Ok(Resolution { smiles: Some((*smiles).to_string()), metadata });
        }

        // 7. No encontrado: diagnóstico con las normalizaciones
        // intentadas y los tamaños disponibles.
        let metadata = json!({
            "strategy": "not_found",
            "confidence": 0.0,
            "input": input,
            "cleaned": cleaned,
            "normalized": normalized,
            "code_count": self.repo.codes()?.len(),
            "record_count": self.repo.record_count()?,
        });
        Ok(Resolution { smiles: None, metadata })
    }

    fn resolve_fragment(&self, cleaned: &str, normalized: &str) -> Result<Option<Resolution>> {
        for code in self.repo.codes()? {
            if code.contains(cleaned) || code.contains(normalized) {
                if let Some(rec) = self.repo.record_by_code(&code)? {
                    let note = json!({"fragment": cleaned});
                    return Ok(Some(self.found("partial", 0.8, &rec, &code, Some(note))));
                }
            }
        }
        Ok(None)
    }

    fn resolve_index(&self, cleaned: &str) -> Result<Option<Resolution>> {
        let n: usize = match cleaned.parse() {
            Ok(n) => n,
            Err(_) => return Ok(None),
        };
        let records = self.repo.records()?;
        if n >= 1 && n <= records.len() {
            let rec = &records[n - 1];
            let note = json!({"compound_number": n});
            return Ok(Some(self.found("index", 1.0, rec, rec.code(), Some(note))));
        }
        Ok(None)
    }

    fn resolve_duplicate(&self, normalized: &str) -> Result<Option<Resolution>> {
        if normalized.is_empty() {
            return Ok(None);
        }
        let prefix = format!("{}{}", normalized, DUP_SEPARATOR);
        // Recolectar las claves sufijadas y elegir explícitamente el
        // discriminador más bajo (no el orden de iteración del índice).
        let mut candidates: Vec<(usize, String)> = Vec::new();
        for code in self.repo.codes()? {
            if let Some(suffix) = code.strip_prefix(&prefix) {
                if let Ok(seq) = suffix.parse::<usize>() {
                    candidates.push((seq, code));
                }
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }
        candidates.sort();
        let shared = candidates.len();
        let (_, key) = &candidates[0];
        if let Some(rec) = self.repo.record_by_code(key)? {
            let note = json!({
                "duplicate_of": normalized,
                "entries_sharing_code": shared,
                "note": format!("una de {} entradas que comparten el código {}", shared, normalized),
            });
            return Ok(Some(self.found("duplicate", 0.9, &rec, key, Some(note))));
        }
        Ok(None)
    }

    fn found(&self, strategy: &str, confidence: f64, rec: &CompoundRecord, matched_code: &str, extra: Option<JsonValue>)
             -> Resolution {
        let mut metadata = json!({
            "strategy": strategy,
            "confidence": confidence,
            "identity": rec.identity(),
            "compound_name": rec.name(),
            "matched_code": matched_code,
        });
        if let Some(JsonValue::Object(map)) = extra {
            for (k, v) in map {
                metadata[k] = v;
            }
        }
        Resolution { smiles: Some(rec.structure().to_string()), metadata }
    }
}

fn is_bracket_fragment(input: &str) -> bool {
    input.len() >= 2 && input.starts_with(FRAGMENT_BRACKET) && input.ends_with(FRAGMENT_BRACKET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubs::InMemoryCompoundRepository;

    fn seeded_repo() -> Arc<InMemoryCompoundRepository> {
        let repo = Arc::new(InMemoryCompoundRepository::new());
        repo.add_record("Wolfender2024_PhenoxyRadicalCoupling_cpd10", "H", "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1")
            .unwrap();
        repo.add_record("trans-δ-Viniferin",
                        "T|–04r.15r–|H",
                        "OC(C=C1)=CC=C1[C@H](O2)[C@H](C3=CC(O)=CC(O)=C3)C4=C2C=CC(/C=C/C5=CC(O)=CC(O)=C5)=C4")
            .unwrap();
        repo
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let resolver = CodeResolver::new(seeded_repo());
        let hit = resolver.resolve("H").unwrap();
        assert!(hit.is_found());
        assert_eq!(hit.strategy(), "exact");
        assert_eq!(hit.confidence(), 1.0);

        // "h" no existe como código almacenado; cae a not_found (la tabla
        // de monómeros tampoco reconoce minúsculas).
        let miss = resolver.resolve("h").unwrap();
        assert!(!miss.is_found());
        assert_eq!(miss.strategy(), "not_found");
    }

    #[test]
    fn normalized_match_reports_normalization() {
        let resolver = CodeResolver::new(seeded_repo());
        let hit = resolver.resolve("T|-04r.15r-|H").unwrap();
        assert!(hit.is_found());
        assert_eq!(hit.strategy(), "normalized");
        assert_eq!(hit.metadata["normalized"], true);
    }

    #[test]
    fn bracket_fragment_matches_with_lower_confidence() {
        let resolver = CodeResolver::new(seeded_repo());
        let hit = resolver.resolve("|–04r.15r–|").unwrap();
        assert!(hit.is_found());
        assert_eq!(hit.strategy(), "partial");
        assert!(hit.confidence() < 1.0);
        assert_eq!(hit.metadata["matched_code"], "T|–04r.15r–|H");
    }

    #[test]
    fn fallback_monomer_symbols_resolve_last() {
        let repo = Arc::new(InMemoryCompoundRepository::new());
        let resolver = CodeResolver::new(repo);
        let hit = resolver.resolve("T").unwrap();
        assert!(hit.is_found());
        assert_eq!(hit.strategy(), "fallback");
        assert_eq!(hit.confidence(), 1.0);
        // Símbolo desconocido: marcador de fallo con diagnóstico.
        let miss = resolver.resolve("Z").unwrap();
        assert!(!miss.is_found());
        assert_eq!(miss.metadata["record_count"], 0);
    }

    #[test]
    fn catalog_entry_takes_priority_over_fallback_table() {
        // "H" está en el catálogo sembrado: debe responder la entrada del
        // catálogo (exact), no la tabla de monómeros.
        let resolver = CodeResolver::new(seeded_repo());
        let hit = resolver.resolve("H").unwrap();
        assert_eq!(hit.strategy(), "exact");
        assert_eq!(hit.metadata["identity"], "763631d4");
    }

    #[test]
    fn numeric_input_resolves_by_position() {
        let resolver = CodeResolver::new(seeded_repo());
        let hit = resolver.resolve("2").unwrap();
        assert_eq!(hit.strategy(), "index");
        assert_eq!(hit.metadata["compound_number"], 2);
        assert_eq!(hit.metadata["compound_name"], "trans-δ-Viniferin");

        let miss = resolver.resolve("200").unwrap();
        assert!(!miss.is_found());
    }

    #[test]
    fn duplicate_suffixed_entry_is_last_resort() {
        let repo = seeded_repo();
        // Mismo código, nombre distinto: la segunda alta queda indexada
        // bajo clave sufijada.
        repo.add_record("otro monómero H", "H", "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1O").unwrap();
        let resolver = CodeResolver::new(repo.clone());

        // La clave desnuda sigue resolviendo la primera entrada.
        let bare = resolver.resolve("H").unwrap();
        assert_eq!(bare.strategy(), "exact");

        // Si la primera entrada desaparece, la sufijada responde como
        // último recurso con nota de ambigüedad.
        let outcome = repo.delete_records(&["763631d4".to_string()]).unwrap();
        assert!(outcome.success);
        let dup = resolver.resolve("H").unwrap();
        assert!(dup.is_found());
        assert_eq!(dup.strategy(), "duplicate");
        assert_eq!(dup.metadata["entries_sharing_code"], 1);
        assert!(dup.confidence() < 1.0);
    }
}
