use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{CellValue, Column, RowIdentity, Table};

/// Cell contents that load as missing values.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey log from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` (or no extension) – comma-separated, UTF-8, header row
pub fn load_file(path: &Path) -> Result<Table> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file).with_context(|| format!("reading {}", path.display()))
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one sample per row.
///
/// When the first data row has `k` more fields than the header, its first
/// `k` fields (and those of every following row) become the row key, one
/// key level per extra field. The remaining fields are matched to the
/// header names in order. Rows that come up short are padded with nulls;
/// rows that run long are an error.
pub fn read_csv<R: Read>(source: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut index_width: Option<usize> = None;
    let mut levels: Vec<Vec<CellValue>> = Vec::new();
    let mut columns: Vec<Column> = headers
        .iter()
        .map(|name| Column {
            name: name.clone(),
            values: Vec::new(),
        })
        .collect();
    let mut row_count = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let k = *index_width.get_or_insert_with(|| {
            let k = record.len().saturating_sub(headers.len());
            levels = vec![Vec::new(); k];
            k
        });

        if record.len() > headers.len() + k {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                headers.len() + k,
                record.len()
            );
        }

        for (level, values) in levels.iter_mut().enumerate() {
            values.push(guess_cell_type(record.get(level).unwrap_or("")));
        }
        for (col_idx, column) in columns.iter_mut().enumerate() {
            column
                .values
                .push(guess_cell_type(record.get(k + col_idx).unwrap_or("")));
        }
        row_count += 1;
    }

    let identity = match levels.len() {
        0 => RowIdentity::Ordinal,
        1 => RowIdentity::Labeled(levels.remove(0)),
        _ => RowIdentity::Composite(levels),
    };

    log::debug!(
        "loaded {row_count} rows, {} columns, identity levels: {}",
        columns.len(),
        index_width.unwrap_or(0)
    );

    Ok(Table::new(columns, identity, row_count))
}

fn guess_cell_type(s: &str) -> CellValue {
    if NA_VALUES.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flat_csv_uses_ordinal_identity() {
        let table = read_csv("lat,lon,wifi_rssi\n1.0,2.0,-60\n3.0,4.0,\n".as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.identity, RowIdentity::Ordinal);
        assert_eq!(table.columns[0].values[0], CellValue::Float(1.0));
        assert_eq!(table.columns[2].values[0], CellValue::Integer(-60));
        assert_eq!(table.columns[2].values[1], CellValue::Null);
    }

    #[test]
    fn test_wide_rows_become_composite_identity() {
        let csv = "timestamp,wifi_rssi\n\
                   1700000000,48.1,11.5,-70\n\
                   1700000001,48.2,11.6,-72\n";
        let table = read_csv(csv.as_bytes()).unwrap();

        let levels = table.identity.composite_levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0][1], CellValue::Integer(1700000001));
        assert_eq!(levels[1][0], CellValue::Float(48.1));
        // header names now point at the shifted values
        assert_eq!(table.columns[0].name, "timestamp");
        assert_eq!(table.columns[0].values[0], CellValue::Float(11.5));
        assert_eq!(table.columns[1].values[1], CellValue::Integer(-72));
    }

    #[test]
    fn test_single_extra_field_is_labeled() {
        let table = read_csv("a,b\nrow0,1,2\n".as_bytes()).unwrap();
        assert!(matches!(table.identity, RowIdentity::Labeled(ref v) if v.len() == 1));
        assert!(table.identity.composite_levels().is_empty());
    }

    #[test]
    fn test_na_tokens_and_short_rows() {
        let table = read_csv("a,b,c\nNaN,n/a,x\n1\n".as_bytes()).unwrap();
        assert_eq!(table.columns[0].values[0], CellValue::Null);
        assert_eq!(table.columns[1].values[0], CellValue::Null);
        assert_eq!(table.columns[2].values[0], CellValue::Text("x".into()));
        assert_eq!(table.columns[1].values[1], CellValue::Null);
        assert_eq!(table.columns[2].values[1], CellValue::Null);
    }

    #[test]
    fn test_overlong_row_is_rejected() {
        let err = read_csv("a,b\n1,2\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("expected 2 fields"));
    }

    #[test]
    fn test_load_file_checks_path_and_extension() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.csv");
        let err = load_file(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Input file not found"));

        let json = dir.path().join("log.json");
        std::fs::write(&json, "[]").unwrap();
        assert!(load_file(&json).is_err());

        let path = dir.path().join("radio_log.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "lat,lon").unwrap();
        writeln!(f, "1.0,2.0").unwrap();
        drop(f);
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 1);
    }
}
