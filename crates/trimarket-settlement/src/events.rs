//! Append-only notification log for external indexers.

use trimarket_types::{AssetId, EventRecord, MarketEvent, Result, Timestamp};

/// Ordered, gap-free log of marketplace notifications.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append `event`, stamping it with the next sequence number.
    pub fn append(&mut self, emitted_at: Timestamp, event: MarketEvent) -> &EventRecord {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            emitted_at,
            event,
        });
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`, for indexers resuming from a cursor.
    #[must_use]
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from).map_or(self.records.len(), |s| s.min(self.records.len()));
        &self.records[start..]
    }

    pub fn for_asset(&self, asset_id: AssetId) -> impl Iterator<Item = &EventRecord> {
        self.records
            .iter()
            .filter(move |r| r.event.asset_id() == asset_id)
    }

    #[must_use]
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One JSON object per line, oldest first.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}
