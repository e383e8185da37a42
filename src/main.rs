use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use stilbar_lookup::{CatalogService, Resolution};
use stilbar_providers::StructureEngine;
use stilbar_store::CompoundStore;

/// Pequeño menú interactivo para administrar el catálogo StilBAR→SMILES
/// usando el store CSV proporcionado por `stilbar-store`.
///
/// Opciones soportadas:
/// 1) Ver compuestos (tabla con identidad, código y nombre)
/// 2) Resolver un código StilBAR
/// 3) Resolver varios códigos en lote
/// 4) Añadir compuesto
/// 5) Eliminar compuestos por identidad
/// 6) Estadísticas / Recargar / Salir
fn main() -> Result<(), Box<dyn Error>> {
    TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).ok();

    // Inicializar store desde el entorno (STILBAR_CSV o tabla por defecto)
    let store: Arc<CompoundStore> = Arc::new(stilbar_store::new_from_env());
    println!("Tabla de compuestos: {}", store.path().display());
    let service = CatalogService::new(store.clone());

    // Motor de descriptores opcional: si no está disponible seguimos sin él
    let engine = StructureEngine::init().ok();
    if engine.is_none() {
        eprintln!("Motor de estructuras no disponible; se omiten los descriptores");
    }

    loop {
        println!("\n== StilBAR catalog menu ==");
        println!("1) Ver compuestos");
        println!("2) Resolver código StilBAR");
        println!("3) Resolver varios códigos (lote)");
        println!("4) Añadir compuesto");
        println!("5) Eliminar compuestos por identidad");
        println!("6) Estadísticas");
        println!("7) Recargar tabla");
        println!("8) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => match service.list_all() {
                Ok(records) => {
                    println!("\nIDENTIDAD | CÓDIGO                         | NOMBRE");
                    println!("--------------------------------------------------------------------");
                    for r in records {
                        let code = if r.code().is_empty() { "-".to_string() } else { r.code().to_string() };
                        println!("{} | {:<30} | {}", r.identity(), truncate(&code, 30), truncate(r.name(), 40));
                    }
                }
                Err(e) => eprintln!("Error listando compuestos: {}", e),
            },
            "2" => {
                let input = prompt("Código StilBAR (o número de compuesto): ")?;
                if input.trim().is_empty() {
                    eprintln!("Entrada vacía");
                    continue;
                }
                match service.lookup(input.trim()) {
                    Ok(res) => show_resolution(&res, engine.as_ref()),
                    Err(e) => eprintln!("Error en la búsqueda: {}", e),
                }
            }
            "3" => {
                let line = prompt("Códigos separados por comas: ")?;
                let inputs: Vec<&str> = line.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
                if inputs.is_empty() {
                    eprintln!("Sin códigos que procesar");
                    continue;
                }
                let mut hits = 0usize;
                for input in &inputs {
                    match service.lookup(input) {
                        Ok(res) if res.is_found() => {
                            hits += 1;
                            println!("{:>20} -> [{}] {}",
                                     input,
                                     res.strategy(),
                                     truncate(res.smiles.as_deref().unwrap_or(""), 60));
                        }
                        Ok(_) => println!("{:>20} -> no encontrado", input),
                        Err(e) => eprintln!("{:>20} -> error: {}", input, e),
                    }
                }
                println!("Resueltos {}/{}", hits, inputs.len());
            }
            "4" => {
                let name = prompt("Nombre del compuesto: ")?;
                let code = prompt("Código StilBAR (enter para ninguno): ")?;
                let smiles = prompt("SMILES: ")?;
                if let Some(engine) = engine.as_ref() {
                    if !smiles.trim().is_empty() && engine.parse(smiles.trim()).is_err() {
                        eprintln!("Aviso: el SMILES no parsea como estructura; se guarda igualmente");
                    }
                }
                match service.add(name.trim(), code.trim(), smiles.trim()) {
                    Ok(identity) => println!("Compuesto añadido con identidad {}", identity),
                    Err(e) => eprintln!("Error en el alta: {}", e),
                }
            }
            "5" => {
                let line = prompt("Identidades a eliminar (separadas por comas): ")?;
                let identities: Vec<String> =
                    line.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
                if identities.is_empty() {
                    eprintln!("Sin identidades que eliminar");
                    continue;
                }
                let confirm = prompt(&format!("Confirma borrado de {} identidades? escribir 'yes': ", identities.len()))?;
                if confirm.trim().to_lowercase() != "yes" {
                    println!("Borrado cancelado");
                    continue;
                }
                match service.delete(&identities) {
                    Ok(outcome) => {
                        for d in &outcome.deleted {
                            println!("Eliminado {} - {} ({})", d.identity, d.name, d.code);
                        }
                        for e in &outcome.errors {
                            eprintln!("Aviso: {}", e);
                        }
                        if outcome.success {
                            println!("Eliminados {} compuestos (copia previa en .backup)", outcome.deleted_count);
                        } else {
                            eprintln!("No se eliminó ningún compuesto");
                        }
                    }
                    Err(e) => eprintln!("Error eliminando: {}", e),
                }
            }
            "6" => match service.stats() {
                Ok(stats) => {
                    println!("Compuestos totales: {}", stats.total_compounds);
                    println!("Con código StilBAR: {}", stats.with_code);
                    println!("Sin código StilBAR: {}", stats.without_code);
                }
                Err(e) => eprintln!("Error obteniendo estadísticas: {}", e),
            },
            "7" => match service.reload() {
                Ok(n) => println!("Tabla recargada: {} compuestos", n),
                Err(e) => eprintln!("Error recargando: {}", e),
            },
            "8" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn show_resolution(res: &Resolution, engine: Option<&StructureEngine>) {
    match res.smiles.as_deref() {
        Some(smiles) => {
            println!("Estrategia: {} (confianza {:.2})", res.strategy(), res.confidence());
            if let Some(name) = res.metadata["compound_name"].as_str() {
                println!("Compuesto: {}", name);
            }
            if let Some(identity) = res.metadata["identity"].as_str() {
                println!("Identidad: {}", identity);
            }
            println!("SMILES: {}", smiles);
            if let Some(engine) = engine {
                match engine.parse(smiles) {
                    Ok(parsed) => {
                        println!("Fórmula: {}  PM: {:.2} g/mol  Átomos pesados: {}  Anillos: {}",
                                 parsed.formula,
                                 parsed.molecular_weight,
                                 parsed.heavy_atoms,
                                 parsed.rings);
                    }
                    Err(e) => eprintln!("Descriptores no disponibles: {}", e),
                }
            }
        }
        None => {
            println!("No encontrado");
            println!("Intentado: limpio='{}' normalizado='{}'",
                     res.metadata["cleaned"].as_str().unwrap_or(""),
                     res.metadata["normalized"].as_str().unwrap_or(""));
            println!("Catálogo: {} códigos / {} registros",
                     res.metadata["code_count"],
                     res.metadata["record_count"]);
        }
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
