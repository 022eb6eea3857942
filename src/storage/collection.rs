use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confessions::{Confession, ConfessionId, NewConfession};
use super::{schema, PageSlice, StoreError};

/// Listing order key: newest first, later insertions first on equal timestamps.
type OrderKey = (Reverse<DateTime<Utc>>, Reverse<u64>);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Row {
    pub seq: u64,
    #[serde(flatten)]
    pub doc: Confession,
}

/// In-memory document collection shared by every store backend.
///
/// Documents are keyed by id; a secondary ordered index over
/// (createdAt desc, insertion seq desc) serves the paginated listing.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    rows: HashMap<ConfessionId, Row>,
    order: BTreeMap<OrderKey, ConfessionId>,
    next_seq: u64,
}

fn key_of(row: &Row) -> OrderKey { (Reverse(row.doc.created_at), Reverse(row.seq)) }

impl Collection {
    pub fn from_rows(rows: Vec<Row>, next_seq: u64) -> Result<Self, StoreError> {
        let mut c = Collection::default();
        let mut max_seq = 0u64;
        for row in rows {
            if c.rows.contains_key(&row.doc.id) {
                return Err(StoreError::Corrupt(format!("duplicate confession id {}", row.doc.id)));
            }
            max_seq = max_seq.max(row.seq);
            if let Some(other) = c.order.insert(key_of(&row), row.doc.id) {
                return Err(StoreError::Corrupt(format!(
                    "confessions {other} and {} share createdAt and seq {}",
                    row.doc.id, row.seq
                )));
            }
            c.rows.insert(row.doc.id, row);
        }
        c.next_seq = next_seq.max(max_seq.saturating_add(1));
        Ok(c)
    }

    pub fn rows_in_order(&self) -> Vec<Row> {
        self.order.values().filter_map(|id| self.rows.get(id).cloned()).collect()
    }

    pub fn next_seq(&self) -> u64 { self.next_seq }

    pub fn insert(&mut self, new: NewConfession) -> Result<Confession, StoreError> {
        let text = schema::normalize_text(&new.text)?;
        let doc = Confession {
            id: ConfessionId::generate(),
            text,
            owner_id: new.owner_id,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.next_seq = self.next_seq.max(1);
        let row = Row { seq: self.next_seq, doc: doc.clone() };
        self.next_seq += 1;
        self.order.insert(key_of(&row), doc.id);
        self.rows.insert(doc.id, row);
        Ok(doc)
    }

    pub fn page(&self, skip: u64, limit: u64) -> PageSlice {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let items = self
            .order
            .values()
            .skip(skip)
            .take(limit)
            .filter_map(|id| self.rows.get(id).map(|r| r.doc.clone()))
            .collect();
        PageSlice { items, total: self.count() }
    }

    pub fn count(&self) -> u64 { self.rows.len() as u64 }

    pub fn get(&self, id: &ConfessionId) -> Option<Confession> { self.rows.get(id).map(|r| r.doc.clone()) }

    /// Overwrite an existing document. The ordering key never changes because
    /// `createdAt` is immutable.
    pub fn save(&mut self, doc: &Confession) -> Result<Confession, StoreError> {
        let row = self.rows.get_mut(&doc.id).ok_or_else(|| StoreError::Missing(doc.id.to_string()))?;
        let mut next = doc.clone();
        next.text = schema::normalize_text(&doc.text)?;
        schema::check_replacement(&row.doc, &next)?;
        row.doc = next.clone();
        Ok(next)
    }

    pub fn delete(&mut self, id: &ConfessionId) -> bool {
        match self.rows.remove(id) {
            Some(row) => {
                self.order.remove(&key_of(&row));
                true
            }
            None => false,
        }
    }
}
