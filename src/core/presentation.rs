use crate::domain::model::{NormalizedRateRecord, RateCheckOutcome};
use std::fmt::Write;

pub const NO_RATES_MESSAGE: &str = "No matching list rates returned for the specified inputs.";

/// Cheapest first. `sort_by` is stable, so equal prices keep reply order.
pub fn sort_by_price(records: &mut [NormalizedRateRecord]) {
    records.sort_by(|a, b| a.list_price.amount.cmp(&b.list_price.amount));
}

pub fn render_table(records: &[NormalizedRateRecord]) -> String {
    let headers = ["#", "Service", "List Price", "Your Price", "Est. Delivery"];
    let rows: Vec<[String; 5]> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                (i + 1).to_string(),
                r.service_name.clone(),
                r.list_price.to_string(),
                r.marked_up_price.to_string(),
                r.estimated_delivery.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Full text report: rate table (or the no-rates warning), then alerts.
pub fn render_outcome(outcome: &RateCheckOutcome, include_raw: bool) -> String {
    let mut out = String::new();

    if outcome.has_rates() {
        out.push_str("Here are the available list rates:\n\n");
        out.push_str(&render_table(&outcome.records));
    } else {
        let _ = writeln!(out, "⚠️  {}", NO_RATES_MESSAGE);
    }

    if !outcome.alerts.is_empty() {
        out.push_str("\nCarrier alerts:\n");
        for alert in &outcome.alerts {
            let _ = writeln!(out, "- ({}) {}", alert.code, alert.message);
        }
    }

    if include_raw {
        out.push_str("\nFull carrier response:\n");
        match serde_json::to_string_pretty(&outcome.raw_response) {
            Ok(json) => out.push_str(&json),
            Err(_) => out.push_str(&outcome.raw_response.to_string()),
        }
        out.push('\n');
    }

    out
}
