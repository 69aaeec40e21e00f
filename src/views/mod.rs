//! Presentation models: the miner table and the history charts

pub mod chart;
pub mod table;

pub use chart::{build_charts, ChartOptions, ChartSeries, ChartView, EMPTY_CHART_MESSAGE};
pub use table::{CellRefresh, Column, ColumnSpec, TableSnapshot, TableView};
