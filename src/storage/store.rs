use crate::core::{BoardError, EntityKind, Record, RecordId, Result};
use crate::schema::schema;
use im::OrdMap;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A record together with its position in store order.
///
/// Store order is newest first, the order a backend lists records in. A
/// loaded record keeps its list position; a record inserted locally gets a
/// sequence number below every other one, so it ranks where the next load
/// would put it. The sort engine breaks ties on this number.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub seq: i64,
    pub record: &'a Record,
}

/// Number a plain slice of records in slice order.
pub fn entries_of(records: &[Record]) -> impl Iterator<Item = Entry<'_>> {
    records.iter().enumerate().map(|(i, record)| Entry {
        seq: i as i64,
        record,
    })
}

/// Authoritative collection of records for one entity kind.
///
/// Records are kept newest first. Mutations are whole-record only.
#[derive(Debug, Clone)]
pub struct RecordStore {
    kind: EntityKind,
    rows: OrdMap<i64, Record>,
    index: HashMap<RecordId, i64>,
    /// Smallest sequence number handed out so far
    front_seq: i64,
}

/// Frozen copy of a store's contents, cheap to take and to hold.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    kind: EntityKind,
    rows: OrdMap<i64, Record>,
}

impl StoreSnapshot {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.rows.iter().map(|(seq, record)| Entry { seq: *seq, record })
    }
}

impl RecordStore {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rows: OrdMap::new(),
            index: HashMap::new(),
            front_seq: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).and_then(|seq| self.rows.get(seq))
    }

    /// Records in store order, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.rows.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.rows.iter().map(|(seq, record)| Entry { seq: *seq, record })
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.iter().filter_map(Record::id).collect()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            kind: self.kind,
            rows: self.rows.clone(),
        }
    }

    /// Replace the whole collection. No merge with the previous contents.
    ///
    /// The input is checked first; a record without identity or a repeated
    /// id rejects the load and leaves the store as it was.
    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        let mut index = HashMap::with_capacity(records.len());
        let mut rows = OrdMap::new();

        for (seq, record) in records.into_iter().enumerate() {
            let seq = seq as i64;
            let id = record.require_id()?;
            if index.insert(id.clone(), seq).is_some() {
                warn!(kind = %self.kind, id = %id, "load rejected: duplicate id");
                return Err(BoardError::DuplicateId { kind: self.kind, id });
            }
            rows.insert(seq, record);
        }

        self.front_seq = 0;
        self.rows = rows;
        self.index = index;
        debug!(kind = %self.kind, count = self.rows.len(), "store loaded");
        Ok(())
    }

    /// Add a record as the most recent entry, ahead of every other record.
    /// Its id must be new.
    pub fn insert(&mut self, record: Record) -> Result<RecordId> {
        let id = record.require_id()?;
        if self.index.contains_key(&id) {
            warn!(kind = %self.kind, id = %id, "insert rejected: duplicate id");
            return Err(BoardError::DuplicateId { kind: self.kind, id });
        }

        let seq = self.front_seq - 1;
        self.front_seq = seq;
        self.rows.insert(seq, record);
        self.index.insert(id.clone(), seq);
        Ok(id)
    }

    /// Replace a record wholesale, keeping identity and creation metadata.
    ///
    /// The record keeps its position in store order.
    pub fn update(&mut self, id: &RecordId, patch: Record) -> Result<&Record> {
        let Some(seq) = self.index.get(id).copied() else {
            warn!(kind = %self.kind, id = %id, "update rejected: not found");
            return Err(BoardError::not_found(self.kind, id.clone()));
        };
        let Some(current) = self.rows.get(&seq) else {
            return Err(BoardError::not_found(self.kind, id.clone()));
        };

        let entity = schema(self.kind);
        let mut next: Record = patch
            .fields()
            .filter(|(name, _)| !entity.is_preserved_on_update(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        for (name, value) in current.fields() {
            if entity.is_preserved_on_update(name) {
                next.set(name, value.clone());
            }
        }

        self.rows.insert(seq, next);
        self.rows
            .get(&seq)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))
    }

    /// Remove exactly one record and hand it back.
    pub fn remove(&mut self, id: &RecordId) -> Result<Record> {
        let Some(seq) = self.index.remove(id) else {
            warn!(kind = %self.kind, id = %id, "remove rejected: not found");
            return Err(BoardError::not_found(self.kind, id.clone()));
        };
        self.rows
            .remove(&seq)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))
    }

    pub fn clear(&mut self) {
        self.rows = OrdMap::new();
        self.index.clear();
        self.front_seq = 0;
    }
}
