//! Legacy flat-file tables.
//!
//! The previous generation of this system kept all state in five CSV files
//! rewritten wholesale on every change. The SQLite store replaces that, but
//! the flat-file contract survives in two places: importing an old data
//! directory, and the admin CSV export.
//!
//! Contract: `load` returns the declared columns with per-column defaults
//! backfilled, and an absent or unreadable file loads as an empty table —
//! never an error. `save` overwrites the whole file.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{BankError, BankResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
}

impl ColumnKind {
    fn default_value(self) -> &'static str {
        match self {
            ColumnKind::Text => "",
            ColumnKind::Numeric => "0",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn numeric(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Numeric,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

pub const USERS: TableSchema = TableSchema {
    name: "users",
    columns: &[
        text("user_id"),
        text("username"),
        text("password"),
        text("role"),
    ],
};

pub const ACCOUNTS: TableSchema = TableSchema {
    name: "accounts",
    columns: &[
        text("user_id"),
        text("account_no"),
        text("address"),
        text("mobile"),
        numeric("balance"),
    ],
};

pub const LOANS: TableSchema = TableSchema {
    name: "loan_applications",
    columns: &[
        text("loan_id"),
        text("user_id"),
        numeric("amount"),
        text("purpose"),
        numeric("income"),
        text("status"),
        text("application_date"),
        text("remarks"),
    ],
};

pub const TRANSACTIONS: TableSchema = TableSchema {
    name: "transactions",
    columns: &[
        text("user_id"),
        text("loan_id"),
        numeric("amount"),
        text("method"),
        text("date"),
    ],
};

/// An in-memory tabular snapshot with string cells, the way the flat files
/// held it. Rows are keyed by column name.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub schema: TableSchema,
    /// Header columns actually present in the backing file; empty when the
    /// file was absent. Distinguishes "backfilled default" from "was there".
    pub file_columns: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl CsvTable {
    pub fn empty(schema: TableSchema) -> Self {
        Self {
            schema,
            file_columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.schema.columns.iter().map(|c| c.name).collect()
    }

    pub fn get<'a>(&'a self, row: usize, column: &str) -> &'a str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Hard stop when a column the caller cannot work without was missing
    /// from the backing file itself. Backfilled defaults do not count: a
    /// users file with no password column must fail login import, not hand
    /// out blank passwords. An absent file (no rows) passes — empty is a
    /// valid state.
    pub fn require_columns(&self, required: &[&str]) -> BankResult<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        for col in required {
            if !self.file_columns.iter().any(|c| c == col) {
                return Err(BankError::MissingColumn {
                    table: self.schema.name,
                    column: col.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Load a legacy table. Missing columns are backfilled with the declared
/// default; an absent or unreadable file is an empty table, not an error.
pub fn load(path: &Path, schema: TableSchema) -> CsvTable {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("{}: treating as empty table ({e})", schema.name);
            return CsvTable::empty(schema);
        }
    };

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => {
            log::warn!("{}: unreadable header, treating as empty ({e})", schema.name);
            return CsvTable::empty(schema);
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{}: skipping malformed row ({e})", schema.name);
                continue;
            }
        };
        let mut row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        for col in schema.columns {
            row.entry(col.name.to_string())
                .or_insert_with(|| col.kind.default_value().to_string());
        }
        rows.push(row);
    }

    CsvTable {
        schema,
        file_columns: headers,
        rows,
    }
}

/// Overwrite the backing file with the whole table. Last writer wins.
pub fn save(path: &Path, table: &CsvTable) -> BankResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("creating {}: {e}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let columns = table.columns();
    writer.write_record(&columns)?;
    for row in &table.rows {
        let record: Vec<&str> = columns
            .iter()
            .map(|c| row.get(*c).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| anyhow::anyhow!("flush: {e}"))?;
    Ok(())
}
