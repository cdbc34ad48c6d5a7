//! The storage boundary.
//!
//! [`GuardedSource`] wraps whatever loads records so that filtering happens
//! exactly once, as the record is materialized, and no caller can reach the
//! unfiltered value.

use std::collections::BTreeSet;

use crate::{
    principal::Principal,
    record::Guarded,
    visibility::{editable_fields, RecordFilter},
};

/// The storage collaborator's "load record" operation.
pub trait RecordSource {
    type Key: ?Sized;
    type Record: Guarded;
    type Error;

    fn load(&self, key: &Self::Key) -> Result<Self::Record, Self::Error>;
}

/// A filtered record with the fields the principal may edit.
#[derive(Clone, Debug)]
pub struct Editable<T> {
    pub record: T,
    pub fields: BTreeSet<String>,
}

/// A [`RecordSource`] wrapper that filters every record it loads.
#[derive(Clone, Debug)]
pub struct GuardedSource<S> {
    source: S,
    filter: RecordFilter,
}

impl<S: RecordSource> GuardedSource<S> {
    pub fn new(source: S, filter: RecordFilter) -> Self {
        Self { source, filter }
    }

    /// Loads the record for `key` and filters it for `principal`.
    pub fn load(&self, principal: &Principal, key: &S::Key) -> Result<S::Record, S::Error> {
        let record = self.source.load(key)?;
        Ok(self.filter.filter(record, principal))
    }

    /// Loads and filters the record, and lists the fields `principal` may edit.
    ///
    /// The field list is computed from the unfiltered record, before it is
    /// filtered, so both see the same rule sets.
    pub fn load_editable(
        &self,
        principal: &Principal,
        key: &S::Key,
    ) -> Result<Editable<S::Record>, S::Error> {
        let record = self.source.load(key)?;
        let fields = editable_fields(&record, principal)
            .into_iter()
            .map(str::to_owned)
            .collect();
        Ok(Editable {
            record: self.filter.filter(record, principal),
            fields,
        })
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}
