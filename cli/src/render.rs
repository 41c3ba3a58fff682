//! Human-readable output.

use chrono::{DateTime, Utc};
use modlogs_core::{call::DecodedCall, event::DecodedEvent, record::EnrichedRecord};
use modlogs_pipeline::{RecordOutcome, ScanReport, ScanRequest};

pub fn print_report(request: &ScanRequest, report: &ScanReport) {
    println!(
        "Module:    {} v{} @ {}",
        request.module, request.version, report.address
    );
    println!("Wallet:    {}", request.wallet);
    println!(
        "Blocks:    {}..{}",
        request.from_block, request.to_block
    );
    if !request.method.is_empty() {
        println!("Method:    {}", request.method);
    }
    println!(
        "Records:   {} shown / {} logs ({} failed, {} transactions)",
        report.records.len(),
        report.summary.total,
        report.summary.failed,
        report.summary.unique_transactions
    );

    for outcome in &report.records {
        println!();
        match outcome {
            RecordOutcome::Decoded(record) => print_record(record),
            RecordOutcome::Failed {
                index,
                tx_hash,
                error,
            } => {
                println!("✗ log {index}  tx {tx_hash}");
                println!("  error: {error}");
            }
        }
    }
}

fn print_record(record: &EnrichedRecord) {
    let n = &record.numeric;
    let when = n
        .time_stamp
        .and_then(|ts| i64::try_from(ts).ok())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".into());
    println!("● tx {}", record.log.transaction_hash);
    println!(
        "  Block:     {}  (log {}, tx index {})  {when}",
        opt(n.block_number),
        opt(n.log_index),
        opt(n.transaction_index)
    );

    match &record.call {
        Some(call) => print_call(call),
        None => println!("  Function:  <unknown>"),
    }

    match &record.event {
        Some(event) => print_event(event),
        None => println!("  Event:     <unknown>"),
    }
}

pub fn print_call(call: &DecodedCall) {
    println!("  Function:  {}", call.function_name);
    println!("  Selector:  {}", call.selector_hex());
    print_fields(call.inputs.iter().map(|(k, v)| (k, v)));
    if let Some(inner) = call.nested.as_deref() {
        println!("  Inner:     {}  ({})", inner.function_name, inner.selector_hex());
        print_fields(inner.inputs.iter().map(|(k, v)| (k, v)));
    }
    if let Some(success) = call.success {
        println!("  Success:   {success}");
    }
}

pub fn print_event(event: &DecodedEvent) {
    println!("  Event:     {}", event.name);
    print_fields(event.fields.iter());
}

fn print_fields<'a, K, V, I>(fields: I)
where
    K: std::fmt::Display + 'a,
    V: std::fmt::Display + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    for (name, value) in fields {
        println!("    {name}: {value}");
    }
}

fn opt(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
