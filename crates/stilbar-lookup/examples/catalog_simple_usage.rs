use std::sync::Arc;
use stilbar_lookup::errors::LookupError;
use stilbar_lookup::stubs::InMemoryCompoundRepository;
use stilbar_lookup::CatalogService;

fn main() -> Result<(), LookupError> {
    // Catálogo en memoria y servicio
    let repo = Arc::new(InMemoryCompoundRepository::new());
    let service = CatalogService::new(repo);

    // Sembrar unos compuestos
    let id_h = service.add("Wolfender2024_PhenoxyRadicalCoupling_cpd10", "H", "OC1=CC(O)=CC(CCC2=CC=C(O)C=C2)=C1")?;
    println!("alta H -> identidad {}", id_h);
    let id_v = service.add("trans-δ-Viniferin",
                           "T|–04r.15r–|H",
                           "OC(C=C1)=CC=C1[C@H](O2)[C@H](C3=CC(O)=CC(O)=C3)C4=C2C=CC(/C=C/C5=CC(O)=CC(O)=C5)=C4")?;
    println!("alta viniferina -> identidad {}\n", id_v);

    // Resolver por distintas vías
    for input in ["H", "T|-04r.15r-|H", "|–04r.15r–|", "2", "T", "no-existe"] {
        let res = service.lookup(input)?;
        match &res.smiles {
            Some(smiles) => println!("{:>16} -> [{}] {}", input, res.strategy(), smiles),
            None => println!("{:>16} -> no encontrado ({})", input, res.metadata),
        }
    }

    // Borrar la viniferina y comprobar que el código deja de resolver
    let outcome = service.delete(&[id_v])?;
    println!("\nborrado: {} eliminados, errores: {:?}", outcome.deleted_count, outcome.errors);
    let res = service.lookup("T|–04r.15r–|H")?;
    println!("tras borrar: encontrado={}", res.is_found());

    let stats = service.stats()?;
    println!("stats: total={} con_codigo={}", stats.total_compounds, stats.with_code);
    Ok(())
}
