//! Opaque continuation cursors and page slicing.
//!
//! A cursor encodes one global offset into the merged, sorted result set as
//! `{"_global_offset": n}`. Bare integer strings are accepted too. Anything
//! else, including an absent cursor, decodes to offset 0: continuation is
//! best-effort and a bad cursor restarts from the first page instead of
//! failing the search.
//!
//! Multi-network searches fetch a bounded window per network (see
//! [`DiscoveryConfig::overfetch_factor`](crate::config::DiscoveryConfig)) and
//! slice the merged list. If one network alone holds more qualifying records
//! than that window, later pages can miss some of them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::EntityRecord;

#[derive(Debug, Serialize, Deserialize)]
struct CursorBody {
    #[serde(rename = "_global_offset")]
    global_offset: u64,
}

/// Encoder/decoder for continuation tokens.
pub struct Cursor;

impl Cursor {
    pub fn encode(offset: usize) -> String {
        serde_json::to_string(&CursorBody {
            global_offset: offset as u64,
        })
        .unwrap_or_else(|_| offset.to_string())
    }

    /// Decode a caller-supplied cursor; never fails.
    pub fn decode(raw: Option<&str>) -> usize {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return 0;
        };
        if let Ok(offset) = raw.parse::<u64>() {
            return offset as usize;
        }
        match serde_json::from_str::<CursorBody>(raw) {
            Ok(body) => body.global_offset as usize,
            Err(err) => {
                debug!(cursor = %raw, error = %err, "unreadable cursor, starting at offset 0");
                0
            }
        }
    }
}

/// One page of results and the cursor for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<EntityRecord>,
    /// Absent at the end of the result set.
    pub next_cursor: Option<String>,
}

/// Slice `[offset, offset + page_size)` out of a fully merged, sorted list.
pub fn paginate(sorted: Vec<EntityRecord>, page_size: usize, offset: usize) -> Page {
    let total = sorted.len();
    let end = offset.saturating_add(page_size);
    let items: Vec<EntityRecord> = sorted.into_iter().skip(offset).take(page_size).collect();
    let next_cursor = (total > end).then(|| Cursor::encode(end));
    Page { items, next_cursor }
}

/// Page from a single backend fetched with `page_size + 1` at `offset`.
///
/// `fetched` is how many records the backend returned before any local
/// filtering; one more than `page_size` means another page exists.
pub fn page_from_overfetch(
    records: Vec<EntityRecord>,
    page_size: usize,
    offset: usize,
    fetched: usize,
) -> Page {
    let has_more = fetched > page_size;
    let items = records.into_iter().take(page_size).collect();
    Page {
        items,
        next_cursor: has_more.then(|| Cursor::encode(offset.saturating_add(page_size))),
    }
}
