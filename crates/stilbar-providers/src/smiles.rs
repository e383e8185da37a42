// smiles.rs
//
// Escáner de SMILES suficiente para validación y descriptores: subset
// orgánico, átomos entre corchetes, ramas, cierres de anillo y órdenes de
// enlace. Los hidrógenos implícitos se estiman con las valencias normales
// del subset orgánico; los átomos aromáticos consumen una valencia extra
// por la deslocalización del anillo.
use crate::EngineError;
use std::collections::HashMap;

pub(crate) struct ScanResult {
  pub formula: String,
  pub molecular_weight: f64,
  pub heavy_atoms: usize,
  pub rings: usize,
}

struct Atom {
  element: String,
  aromatic: bool,
  bracket: bool,
  explicit_h: u32,
  bond_sum: u32,
}

fn weight(element: &str) -> Option<f64> {
  match element {
    "H" => Some(1.008),
    "B" => Some(10.811),
    "C" => Some(12.011),
    "N" => Some(14.007),
    "O" => Some(15.999),
    "F" => Some(18.998),
    "P" => Some(30.974),
    "S" => Some(32.06),
    "Cl" => Some(35.453),
    "Br" => Some(79.904),
    "I" => Some(126.904),
    _ => None,
  }
}

fn valence(element: &str) -> u32 {
  match element {
    "B" | "N" | "P" => 3,
    "C" => 4,
    "O" | "S" => 2,
    _ => 1,
  }
}

fn bond_order(c: char) -> Option<u32> {
  match c {
    '-' | ':' | '/' | '\\' => Some(1),
    '=' => Some(2),
    '#' => Some(3),
    '$' => Some(4),
    _ => None,
  }
}

struct Scanner {
  atoms: Vec<Atom>,
  prev: Option<usize>,
  pending: Option<u32>,
  branch_stack: Vec<usize>,
  open_rings: HashMap<String, (usize, Option<u32>)>,
  closed_rings: usize,
}

impl Scanner {
  fn new() -> Self {
    Self { atoms: Vec::new(),
           prev: None,
           pending: None,
           branch_stack: Vec::new(),
           open_rings: HashMap::new(),
           closed_rings: 0 }
  }

  fn bond(&mut self, a: usize, b: usize, order: u32) {
    self.atoms[a].bond_sum += order;
    self.atoms[b].bond_sum += order;
  }

  fn push_atom(&mut self, element: String, aromatic: bool, bracket: bool, explicit_h: u32) -> Result<(), EngineError> {
    if weight(&element).is_none() {
      return Err(EngineError::UnsupportedElement(element));
    }
    self.atoms.push(Atom { element, aromatic, bracket, explicit_h, bond_sum: 0 });
    let idx = self.atoms.len() - 1;
    if let Some(prev) = self.prev {
      let order = self.pending.unwrap_or(1);
      self.bond(prev, idx, order);
    }
    self.pending = None;
    self.prev = Some(idx);
    Ok(())
  }

  fn close_ring(&mut self, label: String) -> Result<(), EngineError> {
    let here = self.prev.ok_or_else(|| EngineError::InvalidStructure("cierre de anillo sin átomo previo".into()))?;
    match self.open_rings.remove(&label) {
      Some((other, open_order)) => {
        let order = self.pending.or(open_order).unwrap_or(1);
        self.bond(other, here, order);
        self.closed_rings += 1;
      }
      None => {
        self.open_rings.insert(label, (here, self.pending));
      }
    }
    self.pending = None;
    Ok(())
  }
}

/// Parsea el cuerpo de un átomo entre corchetes (`[...]` sin corchetes):
/// isótopo, símbolo, quiralidad, hidrógenos explícitos, carga y mapa.
/// Devuelve (elemento, aromático, hidrógenos explícitos).
fn parse_bracket(body: &str) -> Result<(String, bool, u32), EngineError> {
  let chars: Vec<char> = body.chars().collect();
  let mut k = 0;
  while k < chars.len() && chars[k].is_ascii_digit() {
    k += 1;
  }
  if k >= chars.len() || !chars[k].is_ascii_alphabetic() {
    return Err(EngineError::InvalidStructure(format!("átomo entre corchetes sin símbolo: [{}]", body)));
  }
  let (element, aromatic) = if chars[k].is_ascii_lowercase() {
    let e = chars[k].to_ascii_uppercase().to_string();
    k += 1;
    (e, true)
  } else {
    let mut e = chars[k].to_string();
    k += 1;
    if k < chars.len() && chars[k].is_ascii_lowercase() {
      e.push(chars[k]);
      k += 1;
    }
    (e, false)
  };
  let mut explicit_h = 0u32;
  while k < chars.len() {
    match chars[k] {
      '@' => k += 1,
      'H' => {
        k += 1;
        let mut digits = String::new();
        while k < chars.len() && chars[k].is_ascii_digit() {
          digits.push(chars[k]);
          k += 1;
        }
        explicit_h = digits.parse().unwrap_or(1);
      }
      '+' | '-' => {
        k += 1;
        while k < chars.len() && chars[k].is_ascii_digit() {
          k += 1;
        }
      }
      ':' => {
        k += 1;
        while k < chars.len() && chars[k].is_ascii_digit() {
          k += 1;
        }
      }
      other => {
        return Err(EngineError::InvalidStructure(format!("token inesperado '{}' en [{}]", other, body)));
      }
    }
  }
  Ok((element, aromatic, explicit_h))
}

pub(crate) fn scan(smiles: &str) -> Result<ScanResult, EngineError> {
  if smiles.is_empty() {
    return Err(EngineError::InvalidStructure("cadena vacía".into()));
  }
  let chars: Vec<char> = smiles.chars().collect();
  let mut sc = Scanner::new();
  let mut i = 0usize;

  while i < chars.len() {
    let c = chars[i];
    if c == '[' {
      let close = chars[i + 1..].iter()
                                .position(|&x| x == ']')
                                .ok_or_else(|| EngineError::InvalidStructure("corchete sin cerrar".into()))?;
      let body: String = chars[i + 1..i + 1 + close].iter().collect();
      let (element, aromatic, explicit_h) = parse_bracket(&body)?;
      sc.push_atom(element, aromatic, true, explicit_h)?;
      i += close + 2;
    } else if c.is_ascii_digit() {
      sc.close_ring(c.to_string())?;
      i += 1;
    } else if c == '%' {
      if i + 2 >= chars.len() || !chars[i + 1].is_ascii_digit() || !chars[i + 2].is_ascii_digit() {
        return Err(EngineError::InvalidStructure("etiqueta %nn incompleta".into()));
      }
      let label: String = chars[i + 1..i + 3].iter().collect();
      sc.close_ring(label)?;
      i += 3;
    } else if c == '(' {
      let here = sc.prev.ok_or_else(|| EngineError::InvalidStructure("rama sin átomo previo".into()))?;
      sc.branch_stack.push(here);
      i += 1;
    } else if c == ')' {
      let back = sc.branch_stack
                   .pop()
                   .ok_or_else(|| EngineError::InvalidStructure("cierre de rama sin apertura".into()))?;
      sc.prev = Some(back);
      i += 1;
    } else if let Some(order) = bond_order(c) {
      sc.pending = Some(order);
      i += 1;
    } else if c == '.' {
      sc.prev = None;
      sc.pending = None;
      i += 1;
    } else if c.is_ascii_uppercase() {
      if c == 'C' && chars.get(i + 1) == Some(&'l') {
        sc.push_atom("Cl".to_string(), false, false, 0)?;
        i += 2;
      } else if c == 'B' && chars.get(i + 1) == Some(&'r') {
        sc.push_atom("Br".to_string(), false, false, 0)?;
        i += 2;
      } else if matches!(c, 'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I') {
        sc.push_atom(c.to_string(), false, false, 0)?;
        i += 1;
      } else {
        return Err(EngineError::InvalidStructure(format!("átomo desconocido '{}'", c)));
      }
    } else if c.is_ascii_lowercase() {
      if matches!(c, 'b' | 'c' | 'n' | 'o' | 'p' | 's') {
        sc.push_atom(c.to_ascii_uppercase().to_string(), true, false, 0)?;
        i += 1;
      } else {
        return Err(EngineError::InvalidStructure(format!("átomo aromático desconocido '{}'", c)));
      }
    } else {
      return Err(EngineError::InvalidStructure(format!("carácter inesperado '{}'", c)));
    }
  }

  if !sc.branch_stack.is_empty() {
    return Err(EngineError::InvalidStructure("rama sin cerrar".into()));
  }
  if !sc.open_rings.is_empty() {
    return Err(EngineError::InvalidStructure("anillo sin cerrar".into()));
  }
  if sc.atoms.is_empty() {
    return Err(EngineError::InvalidStructure("sin átomos".into()));
  }

  // Hidrógenos: explícitos de corchete, átomos [H] sueltos e implícitos
  // estimados por valencia para el subset orgánico.
  let mut hydrogens = 0u32;
  let mut counts: HashMap<String, usize> = HashMap::new();
  for atom in &sc.atoms {
    if atom.element == "H" {
      hydrogens += 1 + atom.explicit_h;
      continue;
    }
    if atom.bracket {
      hydrogens += atom.explicit_h;
    } else {
      let used = atom.bond_sum + u32::from(atom.aromatic);
      hydrogens += valence(&atom.element).saturating_sub(used);
    }
    *counts.entry(atom.element.clone()).or_insert(0) += 1;
  }

  let heavy_atoms: usize = counts.values().sum();
  let mut molecular_weight = f64::from(hydrogens) * 1.008;
  for (element, n) in &counts {
    // weight() ya se validó al crear cada átomo
    molecular_weight += weight(element).unwrap_or(0.0) * (*n as f64);
  }

  // Fórmula en orden de Hill: C, H y el resto alfabético
  let mut formula = String::new();
  if let Some(n) = counts.get("C") {
    formula.push('C');
    if *n > 1 {
      formula.push_str(&n.to_string());
    }
  }
  if hydrogens > 0 {
    formula.push('H');
    if hydrogens > 1 {
      formula.push_str(&hydrogens.to_string());
    }
  }
  let mut rest: Vec<(&String, &usize)> = counts.iter().filter(|(e, _)| e.as_str() != "C").collect();
  rest.sort();
  for (element, n) in rest {
    formula.push_str(element);
    if *n > 1 {
      formula.push_str(&n.to_string());
    }
  }

  Ok(ScanResult { formula, molecular_weight, heavy_atoms, rings: sc.closed_rings })
}
