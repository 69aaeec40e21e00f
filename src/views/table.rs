/// Miner table view
///
/// Rows are the current `MinerRecord`s; the `Symbol Notes` column is never
/// stored on the row and is re-derived from the note store on every read,
/// so editing a note only ever requires that one column to be redrawn.
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use crate::miners::MinerRecord;
use crate::storage::NoteStore;
use comfy_table::{
    modifiers, presets, Attribute, Cell, ColumnConstraint, ContentArrangement, Table, Width,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Terminal characters per pixel of configured column width
const PX_PER_CHAR: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    No,
    Coldkey,
    Hotkey,
    Uid,
    Ranking,
    Staking,
    StakingUsd,
    DailyAlpha,
    Immune,
    Registered,
    InDanger,
    Deregistered,
    SymbolNotes,
}

/// Static layout of a column
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnSpec {
    pub column: Column,
    pub id: &'static str,
    pub header: &'static str,
    pub min_width: Option<u16>,
    pub max_width: u16,
    pub pinned: bool,
    pub copyable: bool,
    pub editable: bool,
    pub filterable: bool,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::No,
        Column::Coldkey,
        Column::Hotkey,
        Column::Uid,
        Column::Ranking,
        Column::Staking,
        Column::StakingUsd,
        Column::DailyAlpha,
        Column::Immune,
        Column::Registered,
        Column::InDanger,
        Column::Deregistered,
        Column::SymbolNotes,
    ];

    pub fn spec(self) -> ColumnSpec {
        let (id, header, min_width, max_width) = match self {
            Column::No => ("no", "No", None, 70),
            Column::Coldkey => ("coldkey", "coldkey", Some(150), 520),
            Column::Hotkey => ("hotkey", "hotkey", Some(150), 520),
            Column::Uid => ("uid", "UID", None, 90),
            Column::Ranking => ("ranking", "Ranking", None, 90),
            Column::Staking => ("staking", "Staking", None, 90),
            Column::StakingUsd => ("staking_usd", "Staking USD", None, 100),
            Column::DailyAlpha => ("daily_alpha", "DailyAlpha", None, 90),
            Column::Immune => ("immune", "Immune", None, 90),
            Column::Registered => ("registered", "Registered", None, 100),
            Column::InDanger => ("in_danger", "In Danger", None, 100),
            Column::Deregistered => ("deregistered", "Deregistered", None, 100),
            Column::SymbolNotes => ("symbol_notes", "Symbol Notes", Some(150), 260),
        };

        ColumnSpec {
            column: self,
            id,
            header,
            min_width,
            max_width,
            pinned: self == Column::No,
            copyable: matches!(self, Column::Coldkey | Column::Hotkey),
            editable: self == Column::SymbolNotes,
            filterable: true,
        }
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn from_id(id: &str) -> Option<Column> {
        let id = id.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(id) || c.spec().header.eq_ignore_ascii_case(id))
    }
}

/// Which cells must be redrawn after an edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRefresh {
    pub row: usize,
    pub key: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub index: usize,
    pub symbol_key: String,
    pub cells: BTreeMap<&'static str, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<TableRow>,
    pub total_rows: usize,
}

pub struct TableView {
    records: Vec<MinerRecord>,
    notes: Arc<NoteStore>,
}

impl TableView {
    pub fn new(records: Vec<MinerRecord>, notes: Arc<NoteStore>) -> Self {
        Self { records, notes }
    }

    pub fn columns() -> Vec<ColumnSpec> {
        Column::ALL.iter().map(|c| c.spec()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, row: usize) -> Option<&MinerRecord> {
        self.records.get(row)
    }

    /// Display value of one cell; `None` when the row does not exist
    pub fn cell_value(&self, row: usize, column: Column) -> Option<String> {
        let record = self.records.get(row)?;
        let value = match column {
            Column::No => (row + 1).to_string(),
            Column::Coldkey => record.coldkey.clone(),
            Column::Hotkey => record.hotkey.clone(),
            Column::Uid => record.uid_display(),
            Column::Ranking => record.ranking_display(),
            Column::Staking => record.stake_display(),
            Column::StakingUsd => record.stake_usd_display(),
            Column::DailyAlpha => record.daily_alpha_display(),
            Column::Immune => record.immune_display().to_string(),
            Column::Registered => record.registered_display().to_string(),
            Column::InDanger => record.in_danger_display().to_string(),
            Column::Deregistered => record.deregistered_display(),
            Column::SymbolNotes => self.notes.get(&record.symbol_key()).unwrap_or_default(),
        };
        Some(value)
    }

    /// Raw value for the copy action; only copyable columns yield a value
    pub fn copy_value(&self, row: usize, column: Column) -> Option<String> {
        if !column.spec().copyable {
            return None;
        }
        self.cell_value(row, column)
    }

    /// Store a note for the row's symbol key
    ///
    /// The row itself is left untouched; the returned hint names the only
    /// column that needs refreshing.
    pub fn commit_note(&self, row: usize, text: &str) -> MonitorResult<CellRefresh> {
        let record = self
            .records
            .get(row)
            .ok_or_else(|| MonitorError::Validation(format!("Row {} does not exist", row)))?;
        let key = record.symbol_key();

        self.notes.set(&key, text);
        logger::debug(LogTag::Table, &format!("Note committed for {}", key));

        Ok(CellRefresh {
            row,
            key,
            columns: vec![Column::SymbolNotes],
        })
    }

    /// Rows matching every filter (case-insensitive substring per column)
    pub fn filter(&self, filters: &[(Column, String)]) -> Vec<usize> {
        let active: Vec<(Column, String)> = filters
            .iter()
            .filter(|(column, needle)| column.spec().filterable && !needle.trim().is_empty())
            .map(|(column, needle)| (*column, needle.trim().to_lowercase()))
            .collect();

        (0..self.records.len())
            .filter(|&row| {
                active.iter().all(|(column, needle)| {
                    self.cell_value(row, *column)
                        .map(|value| value.to_lowercase().contains(needle.as_str()))
                        .unwrap_or(false)
                })
            })
            .collect()
    }

    /// Cells of `row` shown at `position` in a (possibly filtered) listing;
    /// `No` follows the listing, not the underlying record index
    fn displayed_cell(&self, position: usize, row: usize, column: Column) -> Option<String> {
        match column {
            Column::No => self.records.get(row).map(|_| (position + 1).to_string()),
            _ => self.cell_value(row, column),
        }
    }

    pub fn snapshot(&self, rows: &[usize]) -> TableSnapshot {
        let rows = rows
            .iter()
            .enumerate()
            .filter_map(|(position, &row)| {
                let record = self.records.get(row)?;
                let cells = Column::ALL
                    .iter()
                    .filter_map(|&c| self.displayed_cell(position, row, c).map(|v| (c.id(), v)))
                    .collect();
                Some(TableRow {
                    index: row,
                    symbol_key: record.symbol_key(),
                    cells,
                })
            })
            .collect();

        TableSnapshot {
            columns: Self::columns(),
            rows,
            total_rows: self.records.len(),
        }
    }

    /// Terminal rendering of the given rows
    pub fn render(&self, rows: &[usize]) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(
            Column::ALL
                .iter()
                .map(|c| Cell::new(c.spec().header).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        table.set_constraints(Column::ALL.iter().map(|c| {
            ColumnConstraint::UpperBoundary(Width::Fixed(c.spec().max_width / PX_PER_CHAR))
        }));

        for (position, &row) in rows.iter().enumerate() {
            let cells: Vec<Cell> = Column::ALL
                .iter()
                .map(|&c| Cell::new(self.displayed_cell(position, row, c).unwrap_or_default()))
                .collect();
            table.add_row(cells);
        }

        table.to_string()
    }
}
