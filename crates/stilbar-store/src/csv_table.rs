// csv_table.rs
//
// Lectura y escritura de la tabla CSV. El formato es el del módulo `csv`
// de Python que escribió las tablas originales: campos separados por coma,
// entrecomillados cuando contienen coma, comilla o salto de línea, con las
// comillas internas duplicadas. Los ficheros pueden llegar con BOM
// (utf-8-sig) y con finales de línea CRLF o LF.

/// Cabecera canónica de la tabla de compuestos.
pub const TABLE_HEADER: [&str; 4] = ["num", "compound_name", "barcode", "smiles"];

const BOM: char = '\u{feff}';

/// Quita el marcador de orden de bytes inicial si está presente.
pub fn strip_bom(content: &str) -> &str {
  content.strip_prefix(BOM).unwrap_or(content)
}

/// Parsea el contenido completo de una tabla en filas de campos. Un campo
/// entrecomillado puede contener comas, saltos de línea y comillas
/// duplicadas. Las filas completamente vacías se descartan.
pub fn parse_table(content: &str) -> Vec<Vec<String>> {
  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = content.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' => {
          if chars.peek() == Some(&'"') {
            chars.next();
            field.push('"');
          } else {
            in_quotes = false;
          }
        }
        other => field.push(other),
      }
      continue;
    }
    match c {
      '"' => in_quotes = true,
      ',' => row.push(std::mem::take(&mut field)),
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        }
        push_row(&mut rows, &mut row, &mut field);
      }
      '\n' => push_row(&mut rows, &mut row, &mut field),
      other => field.push(other),
    }
  }
  push_row(&mut rows, &mut row, &mut field);
  rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
  row.push(std::mem::take(field));
  let finished = std::mem::take(row);
  // Descartar filas sin contenido alguno
  if finished.iter().any(|f| !f.trim().is_empty()) {
    rows.push(finished);
  }
}

fn escape_field(field: &str) -> String {
  if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

/// Codifica filas de campos como contenido de tabla (una línea por fila,
/// terminada en `\n`).
pub fn encode_table(rows: &[Vec<String>]) -> String {
  let mut out = String::new();
  for row in rows {
    let line: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_plain_rows() {
    let rows = parse_table("num,compound_name,barcode,smiles\n1,Pallidol,H≡4r7.5r5r.74r≡H,CCO\n");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], TABLE_HEADER.map(String::from).to_vec());
    assert_eq!(rows[1][1], "Pallidol");
  }

  #[test]
  fn parses_quoted_fields_with_commas_and_quotes() {
    let rows = parse_table("a,\"nombre, con coma\",\"di\"\"cho\"\"\",d\r\n");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "nombre, con coma");
    assert_eq!(rows[0][2], "di\"cho\"");
  }

  #[test]
  fn tolerates_crlf_and_skips_empty_rows() {
    let rows = parse_table("a,b\r\n\r\n,,\r\nc,d\n");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "c");
  }

  #[test]
  fn strip_bom_removes_leading_marker_only() {
    assert_eq!(strip_bom("\u{feff}num,x"), "num,x");
    assert_eq!(strip_bom("num,x"), "num,x");
  }

  #[test]
  fn encode_parse_round_trip_preserves_special_fields() {
    let rows = vec![vec!["763631d4".to_string(), "nombre, raro \"x\"".to_string(), "H–77–H".to_string(), "CCO".to_string()]];
    let encoded = encode_table(&rows);
    assert_eq!(parse_table(&encoded), rows);
  }
}
