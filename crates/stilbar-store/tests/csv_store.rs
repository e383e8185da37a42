use std::fs;
use std::path::PathBuf;
use stilbar_domain::compound_identity;
use stilbar_store::CompoundStore;
use tempfile::TempDir;

const H_SMILES: &str = "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1";
const H77H_SMILES: &str = "OC1=CC=C(CCC2=C(C3=C(CCC4=CC=C(O)C=C4)C=C(O)C=C3O)C(O)=CC(O)=C2)C=C1";

fn write_table(dir: &TempDir, name: &str, content: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, content).unwrap();
  path
}

fn sample_hash_table() -> String {
  format!("num,compound_name,barcode,smiles\n\
           763631d4,Wolfender2024_PhenoxyRadicalCoupling_cpd10,H,{}\n\
           bdd42a70,Wolfender2024_PhenoxyRadicalCoupling_cpd11,H–77–H,{}\n",
          H_SMILES, H77H_SMILES)
}

#[test]
fn load_hash_layout_and_lookup_by_code() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", &sample_hash_table());
  let store = CompoundStore::open(path);
  assert_eq!(store.len().unwrap(), 2);
  let rec = store.by_code("H–77–H").unwrap().unwrap();
  assert_eq!(rec.identity(), "bdd42a70");
  assert_eq!(rec.structure(), H77H_SMILES);
}

#[test]
fn missing_table_starts_empty_without_error() {
  let dir = TempDir::new().unwrap();
  let store = CompoundStore::open(dir.path().join("no-existe.csv"));
  assert!(store.is_empty().unwrap());
  assert_eq!(store.code_keys().unwrap().len(), 0);
}

#[test]
fn bom_is_tolerated_and_preserved_on_rewrite() {
  let dir = TempDir::new().unwrap();
  let content = format!("\u{feff}{}", sample_hash_table().replace('\n', "\r\n"));
  let path = write_table(&dir, "tabla.csv", &content);
  let store = CompoundStore::open(path.clone());
  assert_eq!(store.len().unwrap(), 2);

  store.add("Pallidol", "H≡4r7.5r5r.74r≡H", "CCO").unwrap();
  let rewritten = fs::read_to_string(&path).unwrap();
  assert!(rewritten.starts_with('\u{feff}'));
  // El fichero reescrito vuelve a cargar igual
  assert_eq!(CompoundStore::open(path).len().unwrap(), 3);
}

#[test]
fn malformed_rows_are_skipped_and_counted() {
  let dir = TempDir::new().unwrap();
  let content = format!("num,compound_name,barcode,smiles\n\
                         763631d4,Wolfender2024_PhenoxyRadicalCoupling_cpd10,H,{}\n\
                         xxxxxxxx,sin_estructura,T–00–T,\n\
                         ,,,{}\n",
                        H_SMILES, H77H_SMILES);
  let path = write_table(&dir, "tabla.csv", &content);
  let store = CompoundStore::open(path);
  assert_eq!(store.len().unwrap(), 1);
  assert_eq!(store.skipped_rows().unwrap(), 2);
}

#[test]
fn legacy_numeric_layout_gets_content_derived_identities() {
  let dir = TempDir::new().unwrap();
  let content = "num,compound_name,barcode,smiles\n\
                 1,alpha,A–1–B,CCO\n\
                 2,beta,B–2–C,CCN\n\
                 3,gamma,C–3–D,CCC\n";
  let path = write_table(&dir, "legacy.csv", content);
  let store = CompoundStore::open(path.clone());
  assert_eq!(store.len().unwrap(), 3);
  // Identidad derivada del contenido, no del número de fila
  assert!(store.by_identity("c4327dec").unwrap().is_some());

  // Borrar la primera fila no desplaza las identidades de las demás
  let before_beta = compound_identity("B–2–C", "beta");
  let outcome = store.delete(&["c4327dec".to_string()]).unwrap();
  assert!(outcome.success);
  let reopened = CompoundStore::open(path);
  assert_eq!(reopened.len().unwrap(), 2);
  assert!(reopened.by_identity(&before_beta).unwrap().is_some());
}

#[test]
fn add_persists_row_and_rejects_duplicate_identity() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", &sample_hash_table());
  let store = CompoundStore::open(path.clone());
  let id = store.add("trans-δ-Viniferin", "T|-04r.15r-|H", "CCO").unwrap();
  assert_eq!(id, "6a61c442");

  // El código queda almacenado normalizado al guion largo
  let rec = store.by_code("T|–04r.15r–|H").unwrap().unwrap();
  assert_eq!(rec.identity(), "6a61c442");
  let rewritten = fs::read_to_string(&path).unwrap();
  assert!(rewritten.contains("T|–04r.15r–|H"));

  // Reabrir ve la fila persistida
  let reopened = CompoundStore::open(path);
  assert_eq!(reopened.len().unwrap(), 3);
  assert!(reopened.by_identity("6a61c442").unwrap().is_some());

  // La misma alta otra vez colisiona
  let dup = store.add("trans-δ-Viniferin", "T|-04r.15r-|H", "CCO");
  assert!(dup.is_err());
}

#[test]
fn delete_writes_backup_with_premutation_bytes() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", &sample_hash_table());
  let original = fs::read(&path).unwrap();
  let store = CompoundStore::open(path.clone());

  let outcome = store.delete(&["763631d4".to_string()]).unwrap();
  assert!(outcome.success);
  assert_eq!(outcome.deleted_count, 1);

  let backup = store.backup_path();
  assert!(backup.exists());
  assert_eq!(fs::read(&backup).unwrap(), original);
  // La tabla nueva ya no contiene la fila borrada
  let rewritten = fs::read_to_string(&path).unwrap();
  assert!(!rewritten.contains("Wolfender2024_PhenoxyRadicalCoupling_cpd10"));
  assert!(rewritten.contains("Wolfender2024_PhenoxyRadicalCoupling_cpd11"));
}

#[test]
fn delete_reports_missing_identities_without_aborting() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", &sample_hash_table());
  let store = CompoundStore::open(path);
  let outcome = store.delete(&["763631d4".to_string(), "ffffffff".to_string()]).unwrap();
  assert!(outcome.success);
  assert_eq!(outcome.deleted_count, 1);
  assert_eq!(outcome.errors.len(), 1);
  assert!(outcome.errors[0].contains("ffffffff"));
  assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn delete_with_only_unknown_identities_leaves_table_untouched() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", &sample_hash_table());
  let before = fs::read(&path).unwrap();
  let store = CompoundStore::open(path.clone());
  let outcome = store.delete(&["ffffffff".to_string()]).unwrap();
  assert!(!outcome.success);
  assert_eq!(outcome.deleted_count, 0);
  assert_eq!(fs::read(&path).unwrap(), before);
  assert!(!store.backup_path().exists());
}

#[test]
fn quoted_names_round_trip_through_rewrite() {
  let dir = TempDir::new().unwrap();
  let path = write_table(&dir, "tabla.csv", "num,compound_name,barcode,smiles\n");
  let store = CompoundStore::open(path.clone());
  let id = store.add("viniferina, forma \"rara\"", "Q–1–Q", "CCO").unwrap();
  let reopened = CompoundStore::open(path);
  let rec = reopened.by_identity(&id).unwrap().unwrap();
  assert_eq!(rec.name(), "viniferina, forma \"rara\"");
  assert_eq!(rec.code(), "Q–1–Q");
}

#[test]
fn duplicate_codes_on_load_are_indexed_under_suffixed_keys() {
  let dir = TempDir::new().unwrap();
  let content = "num,compound_name,barcode,smiles\n\
                 1,primera,X–1–X,CCO\n\
                 2,segunda,X–1–X,CCN\n";
  let path = write_table(&dir, "tabla.csv", content);
  let store = CompoundStore::open(path);
  assert_eq!(store.len().unwrap(), 2);
  let keys = store.code_keys().unwrap();
  assert!(keys.contains(&"X–1–X".to_string()));
  assert!(keys.contains(&"X–1–X#2".to_string()));
  assert_eq!(store.by_code("X–1–X").unwrap().unwrap().name(), "primera");
  assert_eq!(store.by_code("X–1–X#2").unwrap().unwrap().name(), "segunda");
}
