//! CSV codec for site records.
//!
//! Each record is `name,url,sector,outages,downtime_secs` with no header row.
//! The check ID is not part of the format.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use super::{CodecError, Site, SiteSet};

const FIELD_COUNT: usize = 5;

fn record_terminator() -> Terminator {
    if cfg!(windows) {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    }
}

/// Write one site as a CSV record and flush it.
pub fn write_site<W: Write>(output: W, site: &Site) -> Result<(), CodecError> {
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .terminator(record_terminator())
        .from_writer(output);

    let outages = site.outages.to_string();
    let downtime = site.downtime_secs.to_string();
    w.write_record([
        site.name.as_str(),
        site.url.as_str(),
        site.sector.as_str(),
        outages.as_str(),
        downtime.as_str(),
    ])?;
    w.flush()?;
    Ok(())
}

/// Read every record from `input` into a site set.
///
/// Stops at the first malformed record.
pub fn read_sites<R: Read>(input: R) -> Result<SiteSet, CodecError> {
    let mut sites = SiteSet::new();
    for record in reader(input).records() {
        sites.push(decode_record(&record?)?);
    }
    Ok(sites)
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

fn decode_record(record: &StringRecord) -> Result<Site, CodecError> {
    let raw = || format!("{:?}", record.iter().collect::<Vec<_>>());

    if record.len() < FIELD_COUNT {
        return Err(CodecError::format(
            raw(),
            format!("expected {} fields, got {}", FIELD_COUNT, record.len()),
        ));
    }

    let outages = record[3]
        .parse::<u64>()
        .map_err(|e| CodecError::format(raw(), format!("outages {:?}: {}", &record[3], e)))?;
    let downtime_secs = record[4]
        .parse::<u64>()
        .map_err(|e| CodecError::format(raw(), format!("downtime {:?}: {}", &record[4], e)))?;

    Ok(Site {
        id: None,
        name: record[0].to_string(),
        url: record[1].to_string(),
        sector: record[2].to_string(),
        outages,
        downtime_secs,
    })
}
