// src/report.rs
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{PipelineResult, SkippedRecord};

pub const EMPTY_MESSAGE: &str = "No transactions found in the sampled range.";

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Rows in the recent transactions table.
    pub table_rows: usize,
    /// Points in the transaction value chart.
    pub chart_points: usize,
    /// Base-unit decimals of the native token (18 for SEI on EVM).
    pub value_decimals: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            table_rows: 20,
            chart_points: 50,
            value_decimals: 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Empty,
    Ok,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub incoming: Decimal,
    pub outgoing: Decimal,
    pub net: Decimal,
    pub incoming_display: String,
    pub outgoing_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slice {
    pub kind: &'static str,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxRow {
    pub hash: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Decimal,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<u64>,
    pub datetime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub datetime: Option<DateTime<Utc>>,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Everything the dashboard page renders, in display units.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub address: String,
    pub source: String,
    pub status: Status,
    pub message: Option<&'static str>,
    pub summary: Summary,
    pub breakdown: Vec<Slice>,
    pub recent: Vec<TxRow>,
    pub value_series: Vec<Point>,
    pub daily_counts: Vec<DayCount>,
    pub balance_series: Vec<Point>,
    pub skipped: Vec<SkippedRecord>,
}

/// Convert base units (wei) to whole tokens.
pub fn to_display(value: Decimal, decimals: u32) -> Decimal {
    let divisor = Decimal::from(10u64.pow(decimals));
    value
        .checked_div(divisor)
        .map(|v| v.normalize())
        .unwrap_or(value)
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

impl Dashboard {
    pub fn build(address: &str, source: &str, result: &PipelineResult, opts: &ReportOptions) -> Self {
        let scale = |v: Decimal| to_display(v, opts.value_decimals);

        let incoming = scale(result.incoming);
        let outgoing = scale(result.outgoing);

        let recent = tail(&result.transactions, opts.table_rows)
            .iter()
            .map(|tx| TxRow {
                hash: tx.hash.clone(),
                from: tx.from.clone(),
                to: tx.to.clone(),
                value: scale(tx.value),
                block_number: tx.block_number,
                datetime: tx.datetime,
            })
            .collect();

        let value_series = tail(&result.transactions, opts.chart_points)
            .iter()
            .map(|tx| Point {
                datetime: tx.datetime,
                value: scale(tx.value),
            })
            .collect();

        let balance_series = result
            .balance_series
            .iter()
            .map(|p| Point {
                datetime: p.datetime,
                value: scale(p.balance),
            })
            .collect();

        let daily_counts = result
            .daily_counts
            .iter()
            .map(|(date, count)| DayCount {
                date: *date,
                count: *count,
            })
            .collect();

        let (status, message) = if result.is_empty() {
            (Status::Empty, Some(EMPTY_MESSAGE))
        } else {
            (Status::Ok, None)
        };

        Dashboard {
            address: address.to_string(),
            source: source.to_string(),
            status,
            message,
            summary: Summary {
                incoming,
                outgoing,
                net: scale(result.final_balance()),
                incoming_display: format!("{:.4}", incoming),
                outgoing_display: format!("{:.4}", outgoing),
            },
            breakdown: vec![
                Slice { kind: "Incoming", amount: incoming },
                Slice { kind: "Outgoing", amount: outgoing.abs() },
            ],
            recent,
            value_series,
            daily_counts,
            balance_series,
            skipped: result.skipped.clone(),
        }
    }
}
