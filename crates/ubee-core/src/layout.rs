//! Page layout of the modem UI, as data.
//!
//! Every table the exporter reads is described by a [`TableSpec`]: where
//! it is, how many header rows to skip and which column feeds which
//! field. When a firmware update moves things around, this is the only
//! place that needs to change.
//!
//! Selectors are evaluated relative to the `#main_page` element of the
//! page.

use std::collections::HashMap;

use crate::decode::{self, CellValue, Field, FieldError, FieldKind};
use crate::models::{
    ChannelMeasurement, CounterKind, CounterMeasurement, DownstreamChannel, Measurements,
    UpstreamChannel,
};

/// Page container; one per rendered tab.
pub const CONTENT_SELECTOR: &str = ".uuzp-contentholder";
/// Navigation link of the tab the modem rendered as current.
pub const CURRENT_TAB_SELECTOR: &str = "#navigation_bar li a.current";
/// Root of the tab content that all table selectors are scoped to.
pub const MAIN_PAGE_SELECTOR: &str = "#main_page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    DownstreamChannels,
    Codewords,
    UpstreamChannels,
    ReportedTimeouts,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub index: usize,
    pub field: Field,
    pub kind: FieldKind,
}

const fn col(index: usize, field: Field, kind: FieldKind) -> ColumnSpec {
    ColumnSpec { index, field, kind }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub kind: TableKind,
    /// Selects the table's rows (`tr`), in document order.
    pub row_selector: &'static str,
    pub header_rows: usize,
    /// Only the first `n` data rows are read when set.
    pub max_rows: Option<usize>,
    pub columns: &'static [ColumnSpec],
}

/// A lone value cell.
#[derive(Debug, Clone, Copy)]
pub struct CellSpec {
    pub field: Field,
    pub selector: &'static str,
}

pub const DOWNSTREAM_CHANNELS: TableSpec = TableSpec {
    kind: TableKind::DownstreamChannels,
    row_selector: "table:nth-of-type(2) tr",
    header_rows: 2,
    max_rows: None,
    columns: &[
        col(0, Field::Channel, FieldKind::Text),
        col(1, Field::LockStatus, FieldKind::Text),
        col(2, Field::Modulation, FieldKind::Text),
        col(3, Field::Frequency, FieldKind::FrequencyHz),
        col(4, Field::Power, FieldKind::PowerDbmv),
        col(5, Field::Snr, FieldKind::SnrDb),
    ],
};

pub const CODEWORDS: TableSpec = TableSpec {
    kind: TableKind::Codewords,
    row_selector: "table:nth-of-type(3) tr",
    header_rows: 1,
    max_rows: Some(1),
    columns: &[
        col(0, Field::CorrectableErrors, FieldKind::Integer),
        col(1, Field::UncorrectableErrors, FieldKind::Integer),
    ],
};

pub const UPSTREAM_CHANNELS: TableSpec = TableSpec {
    kind: TableKind::UpstreamChannels,
    row_selector: "table:nth-of-type(4) tr",
    header_rows: 2,
    max_rows: None,
    columns: &[
        col(0, Field::Channel, FieldKind::Text),
        col(1, Field::LockStatus, FieldKind::Text),
        col(2, Field::ChannelType, FieldKind::Text),
        col(3, Field::SymbolRate, FieldKind::SymbolRateKsym),
        col(4, Field::Frequency, FieldKind::FrequencyHz),
        col(5, Field::Power, FieldKind::PowerDbmv),
    ],
};

pub const REPORTED_TIMEOUTS: TableSpec = TableSpec {
    kind: TableKind::ReportedTimeouts,
    row_selector: "table:nth-of-type(5) tr",
    header_rows: 1,
    max_rows: None,
    columns: &[
        col(0, Field::CounterName, FieldKind::Text),
        col(1, Field::CounterValue, FieldKind::Integer),
    ],
};

/// Tables of the Docsis tab, in page order.
pub const DOCSIS_TABLES: [TableSpec; 4] =
    [DOWNSTREAM_CHANNELS, CODEWORDS, UPSTREAM_CHANNELS, REPORTED_TIMEOUTS];

pub const UPTIME_CELL: CellSpec = CellSpec {
    field: Field::Uptime,
    selector: "table:nth-of-type(1) tr:nth-child(2) > td:nth-child(2)",
};

pub const FIRMWARE_CELL: CellSpec = CellSpec {
    field: Field::Firmware,
    selector: "table tr:nth-child(3) > td:nth-child(2)",
};

impl TableSpec {
    /// Indices (into the table's row list) of the rows holding data.
    pub fn data_rows(&self, total_rows: usize) -> std::ops::Range<usize> {
        let start = self.header_rows.min(total_rows);
        let end = match self.max_rows {
            Some(n) => (start + n).min(total_rows),
            None => total_rows,
        };
        start..end
    }
}

/// Typed values of one table row, keyed by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRow {
    values: HashMap<Field, CellValue>,
}

impl DecodedRow {
    pub fn text(&self, field: Field) -> String {
        match self.values.get(&field) {
            Some(CellValue::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn float(&self, field: Field) -> f64 {
        match self.values.get(&field) {
            Some(CellValue::Float(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn integer(&self, field: Field) -> u64 {
        match self.values.get(&field) {
            Some(CellValue::Integer(v)) => *v,
            _ => 0,
        }
    }
}

/// Decode the trimmed cell texts of a data row.
///
/// Undecodable or missing cells take their kind's zero value and are
/// reported in `errors`; the remaining columns are still decoded.
pub fn decode_row(spec: &TableSpec, cells: &[String], errors: &mut Vec<FieldError>) -> DecodedRow {
    let mut values = HashMap::with_capacity(spec.columns.len());

    for column in spec.columns {
        let text = cells.get(column.index).map(|c| c.trim());
        let value = match text.and_then(|t| column.kind.decode(t)) {
            Some(value) => value,
            None => {
                errors.push(FieldError {
                    field: column.field,
                    column: Some(column.index),
                    text: text.unwrap_or_default().to_string(),
                    expected: column.kind.expected(),
                });
                column.kind.zero()
            }
        };
        values.insert(column.field, value);
    }

    DecodedRow { values }
}

/// Turn a decoded row into measurements according to the table it came from.
pub fn collect_row(kind: TableKind, row: &DecodedRow, out: &mut Measurements) {
    match kind {
        TableKind::DownstreamChannels => {
            out.channels
                .push(ChannelMeasurement::Downstream(DownstreamChannel {
                    channel: row.text(Field::Channel),
                    lock_status: row.text(Field::LockStatus),
                    modulation: row.text(Field::Modulation),
                    frequency: row.text(Field::Frequency),
                    snr_db: row.float(Field::Snr),
                    power_dbmv: row.float(Field::Power),
                }))
        }
        TableKind::UpstreamChannels => {
            out.channels
                .push(ChannelMeasurement::Upstream(UpstreamChannel {
                    channel: row.text(Field::Channel),
                    lock_status: row.text(Field::LockStatus),
                    channel_type: row.text(Field::ChannelType),
                    frequency: row.text(Field::Frequency),
                    power_dbmv: row.float(Field::Power),
                    symbol_rate: row.float(Field::SymbolRate),
                }))
        }
        TableKind::Codewords => {
            out.counters.push(CounterMeasurement {
                kind: CounterKind::CorrectableErrors,
                name: None,
                value: row.integer(Field::CorrectableErrors),
            });
            out.counters.push(CounterMeasurement {
                kind: CounterKind::UncorrectableErrors,
                name: None,
                value: row.integer(Field::UncorrectableErrors),
            });
        }
        TableKind::ReportedTimeouts => out.counters.push(CounterMeasurement {
            kind: CounterKind::ReportedTimeouts,
            name: Some(row.text(Field::CounterName)),
            value: row.integer(Field::CounterValue),
        }),
    }
}

/// Decode every data row of a table. `rows` holds the trimmed cell texts of
/// all rows, headers included.
pub fn collect_table(spec: &TableSpec, rows: &[Vec<String>], out: &mut Measurements) {
    for i in spec.data_rows(rows.len()) {
        let row = decode_row(spec, &rows[i], &mut out.field_errors);
        collect_row(spec.kind, &row, out);
    }
}

/// Store the uptime cell text. Malformed text counts as zero uptime.
pub fn collect_uptime(text: &str, out: &mut Measurements) {
    let uptime = decode::uptime(text).unwrap_or_else(|| {
        out.field_errors.push(FieldError {
            field: UPTIME_CELL.field,
            column: None,
            text: text.trim().to_string(),
            expected: "<d> days <hh>h:<mm>m:<ss>s",
        });
        Default::default()
    });
    out.uptime.uptime = Some(uptime);
}

pub fn collect_firmware(text: &str, out: &mut Measurements) {
    out.uptime.firmware = Some(text.trim().to_string());
}
