//! Token URI parsing and batch planning
//!
//! A sample token URI of the form `<base>/<n>[.json]` lets the bridged
//! contract derive every URI from its base. Collections without that shape
//! need their URIs replayed, which is planned here as a pure function so the
//! replicator only has to submit what the plan says.

use regex::Regex;
use std::sync::OnceLock;

use crate::chunk::chunk;
use crate::types::DATA_URI_PREFIX;

/// URIs per batch for ordinary URIs
pub const URI_BATCH_SIZE: usize = 100;

/// URIs per batch when the run starts with a long or inline URI
pub const HEAVY_URI_BATCH_SIZE: usize = 5;

/// URIs longer than this are treated as heavy
pub const HEAVY_URI_LEN: usize = 50;

fn template_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+/)(\d+)(\.json)?$").expect("static regex"))
}

/// Components of a templated token URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    /// Everything up to and including the last `/`
    pub base: String,
    /// The numeric token id segment
    pub number: String,
    /// `.json` or empty
    pub extension: String,
}

impl UriTemplate {
    pub fn has_extension(&self) -> bool {
        !self.extension.is_empty()
    }
}

/// Parse a URI ending in a number with an optional `.json` extension
pub fn parse_uri_template(uri: &str) -> Option<UriTemplate> {
    let caps = template_regex().captures(uri)?;
    Some(UriTemplate {
        base: caps[1].to_string(),
        number: caps[2].to_string(),
        extension: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

/// Heavy URIs are sent in small batches to stay under the block gas limit
pub fn is_heavy(uri: &str) -> bool {
    uri.len() > HEAVY_URI_LEN || uri.starts_with(DATA_URI_PREFIX)
}

/// One `batchSetTokenURIs(start, uris)` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriBatch {
    pub start: u64,
    pub uris: Vec<String>,
}

impl UriBatch {
    /// Token id of the last URI in the batch
    pub fn end(&self) -> u64 {
        self.start + self.uris.len().saturating_sub(1) as u64
    }
}

/// Plan the URI write batches for `uris`, where `uris[i]` belongs to token
/// `start_from + i`.
///
/// Without an explicit `start_from`, a leading `None` (the id-0 slot of a
/// collection that starts at 1) is dropped and numbering starts at 1;
/// otherwise it starts at 0. `None` entries split the list into runs and are
/// never written. Each run is chunked by 100, or by 5 when its first URI is
/// heavy.
pub fn plan_uri_batches(uris: &[Option<String>], start_from: Option<u64>) -> Vec<UriBatch> {
    let (start_from, uris) = match (start_from, uris.first()) {
        (Some(start), _) => (start, uris),
        (None, Some(None)) => (1, &uris[1..]),
        (None, _) => (0, uris),
    };

    let mut batches = Vec::new();
    let mut run: Vec<String> = Vec::new();
    let mut run_start = start_from;

    for (i, uri) in uris.iter().enumerate() {
        match uri {
            Some(uri) => run.push(uri.clone()),
            None => {
                flush_run(&mut batches, &mut run, run_start);
                run_start = start_from + i as u64 + 1;
            }
        }
    }
    flush_run(&mut batches, &mut run, run_start);

    batches
}

fn flush_run(batches: &mut Vec<UriBatch>, run: &mut Vec<String>, run_start: u64) {
    let Some(first) = run.first() else {
        return;
    };
    let size = if is_heavy(first) {
        HEAVY_URI_BATCH_SIZE
    } else {
        URI_BATCH_SIZE
    };

    let mut start = run_start;
    for group in chunk(run, size) {
        batches.push(UriBatch {
            start,
            uris: group.to_vec(),
        });
        start += group.len() as u64;
    }
    run.clear();
}
