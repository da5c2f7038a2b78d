//! Static site list loader.
//!
//! Reads a JSON array of `{name, url, sector, id}` objects. The result carries
//! identity only; every metric is zero.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::{CodecError, Site, SiteSet};

#[derive(Debug, Deserialize)]
struct SiteEntry {
    id: i64,
    name: String,
    url: String,
    #[serde(default)]
    sector: String,
}

/// Load a site list from a reader.
pub fn load_site_list<R: Read>(input: R) -> Result<SiteSet, CodecError> {
    let entries: Vec<SiteEntry> = serde_json::from_reader(input)?;
    Ok(entries
        .into_iter()
        .map(|e| Site {
            id: Some(e.id),
            name: e.name,
            url: e.url,
            sector: e.sector,
            ..Default::default()
        })
        .collect())
}

/// Load a site list from a file.
pub fn load_site_list_file<P: AsRef<Path>>(path: P) -> Result<SiteSet, CodecError> {
    let file = File::open(path)?;
    load_site_list(BufReader::new(file))
}
