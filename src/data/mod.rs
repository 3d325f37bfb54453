/// Data layer: table model and CSV loading.
///
/// Architecture:
/// ```text
///  radio_log.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    Table      │  Vec<Column>, RowIdentity
///   └──────────────┘
///        │
///        ▼
///   schema (columns) → points (weighted) → render (html)
/// ```

pub mod loader;
pub mod model;
