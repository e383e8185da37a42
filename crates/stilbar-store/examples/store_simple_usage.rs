use std::sync::Arc;
use stilbar_lookup::CatalogService;
use stilbar_store::CompoundStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // Tabla de ejemplo en un directorio temporal
  let dir = tempfile::TempDir::new()?;
  let path = dir.path().join("tabla.csv");
  std::fs::write(&path,
                 "num,compound_name,barcode,smiles\n\
                  763631d4,Wolfender2024_PhenoxyRadicalCoupling_cpd10,H,OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1\n")?;

  let store = Arc::new(CompoundStore::open(path));
  let service = CatalogService::new(store.clone());

  // Alta y búsqueda
  let identity = service.add("trans-δ-Viniferin",
                             "T|-04r.15r-|H",
                             "OC(C=C1)=CC=C1[C@H](O2)[C@H](C3=CC(O)=CC(O)=C3)C4=C2C=CC(/C=C/C5=CC(O)=CC(O)=C5)=C4")?;
  println!("alta -> identidad {}", identity);

  let res = service.lookup("T|–04r.15r–|H")?;
  println!("lookup -> [{}] {:?}", res.strategy(), res.smiles);

  // Borrado con copia de seguridad previa
  let outcome = service.delete(&[identity])?;
  println!("borrado ok={} (backup en {})", outcome.success, store.backup_path().display());
  Ok(())
}
