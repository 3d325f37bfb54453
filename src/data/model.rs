// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, typed by what its text parses as.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl CellValue {
    /// Lenient numeric coercion: anything that is not a number becomes
    /// missing instead of an error.
    pub fn to_numeric(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Null => return None,
        };
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }
}

// ---------------------------------------------------------------------------
// NumericSeries – a coerced column or index level
// ---------------------------------------------------------------------------

/// A column after numeric coercion. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries(pub Vec<Option<f64>>);

impl NumericSeries {
    pub fn from_cells(cells: &[CellValue]) -> Self {
        NumericSeries(cells.iter().map(CellValue::to_numeric).collect())
    }

    pub fn get(&self, row: usize) -> Option<f64> {
        self.0.get(row).copied().flatten()
    }

    /// Number of non-missing values.
    pub fn valid_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }

    /// Fraction of non-missing values inside the closed range `[lo, hi]`.
    /// Returns 0.0 when nothing is present.
    pub fn fraction_within(&self, lo: f64, hi: f64) -> f64 {
        let valid = self.valid_count();
        if valid == 0 {
            return 0.0;
        }
        let inside = self
            .0
            .iter()
            .flatten()
            .filter(|v| (lo..=hi).contains(*v))
            .count();
        inside as f64 / valid as f64
    }
}

// ---------------------------------------------------------------------------
// Column / RowIdentity / Table
// ---------------------------------------------------------------------------

/// One named column of the source CSV.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// How rows are keyed.
///
/// A CSV whose data rows are wider than its header has its leading fields
/// turned into the row key, one level per extra field. Those levels are
/// kept apart from the named columns so that coordinate discovery can
/// treat them as a separate source.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIdentity {
    /// Plain row counter.
    Ordinal,
    /// A single leading key field per row.
    Labeled(Vec<CellValue>),
    /// Two or more key fields per row, stored level by level.
    Composite(Vec<Vec<CellValue>>),
}

impl RowIdentity {
    /// The levels of a multi-component key, empty for any other identity.
    pub fn composite_levels(&self) -> &[Vec<CellValue>] {
        match self {
            RowIdentity::Composite(levels) => levels,
            _ => &[],
        }
    }
}

/// The full parsed survey log.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<Column>,
    pub identity: RowIdentity,
    row_count: usize,
}

impl Table {
    /// Build a table; every column must hold `row_count` values.
    pub fn new(columns: Vec<Column>, identity: RowIdentity, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        Table {
            columns,
            identity,
            row_count,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Numeric view of the column at `idx`.
    pub fn numeric_column(&self, idx: usize) -> NumericSeries {
        NumericSeries::from_cells(&self.columns[idx].values)
    }

    /// Numeric view of one level of a composite row key.
    pub fn numeric_level(&self, level: usize) -> NumericSeries {
        NumericSeries::from_cells(&self.identity.composite_levels()[level])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_numeric_coerces() {
        assert_eq!(CellValue::Integer(-60).to_numeric(), Some(-60.0));
        assert_eq!(CellValue::Float(1.5).to_numeric(), Some(1.5));
        assert_eq!(CellValue::Text(" 2.25 ".into()).to_numeric(), Some(2.25));
        assert_eq!(CellValue::Text("abc".into()).to_numeric(), None);
        assert_eq!(CellValue::Float(f64::NAN).to_numeric(), None);
        assert_eq!(CellValue::Null.to_numeric(), None);
    }

    #[test]
    fn test_fraction_within_ignores_missing() {
        let s = NumericSeries(vec![Some(10.0), None, Some(100.0), None, Some(-45.0)]);
        assert_eq!(s.valid_count(), 3);
        assert!((s.fraction_within(-90.0, 90.0) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.fraction_within(-180.0, 180.0), 1.0);

        let empty = NumericSeries(vec![None, None]);
        assert_eq!(empty.fraction_within(-90.0, 90.0), 0.0);
    }

    #[test]
    fn test_table_lookup() {
        let table = Table::new(
            vec![
                Column {
                    name: "lat".into(),
                    values: vec![CellValue::Float(1.0), CellValue::Text("x".into())],
                },
                Column {
                    name: "lon".into(),
                    values: vec![CellValue::Float(2.0), CellValue::Null],
                },
            ],
            RowIdentity::Ordinal,
            2,
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("lon"), Some(1));
        assert_eq!(table.column_index("wifi"), None);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["lat", "lon"]);
        assert_eq!(table.numeric_column(0).0, vec![Some(1.0), None]);
        assert!(table.identity.composite_levels().is_empty());
    }
}
