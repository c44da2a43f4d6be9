//! Writers for merged records.
//!
//! Each writer drains the merge iterator. On a structural error the records
//! already written stay written and the error is returned.

use std::io::Write;

use anyhow::Context;
use feedmerge_core::{EventRecord, MergeError, TypeTally};

/// Write one compact JSON record per line, as soon as each is merged.
pub fn write_jsonl<I, W>(records: I, out: &mut W) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = Result<EventRecord, MergeError>>,
    W: Write + ?Sized,
{
    let mut written: usize = 0;
    for record in records {
        let record = record?;
        serde_json::to_writer(&mut *out, &record).context("failed to write record")?;
        out.write_all(b"\n").context("failed to write record")?;
        written = written.saturating_add(1);
    }
    Ok(written)
}

/// Write all records as one pretty-printed JSON array.
pub fn write_json_array<I, W>(records: I, out: &mut W) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = Result<EventRecord, MergeError>>,
    W: Write + ?Sized,
{
    let records = records.into_iter().collect::<Result<Vec<_>, _>>()?;
    serde_json::to_writer_pretty(&mut *out, &records).context("failed to write records")?;
    out.write_all(b"\n").context("failed to write records")?;
    Ok(records.len())
}

/// Count records by type and write one `count<TAB>type` line per type, most
/// frequent first.
pub fn write_type_counts<I, W>(records: I, out: &mut W) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = Result<EventRecord, MergeError>>,
    W: Write + ?Sized,
{
    let mut tally = TypeTally::new();
    for record in records {
        tally.record(&record?);
    }
    for (event_type, count) in tally.most_common() {
        writeln!(out, "{count}\t{event_type}").context("failed to write type counts")?;
    }
    Ok(tally.total())
}
