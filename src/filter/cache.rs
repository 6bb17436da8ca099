use super::matcher::FilterCriteria;
use crate::record::Record;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    revision: u64,
    len: usize,
    criteria: FilterCriteria,
}

/// Memoized filter view over a record collection.
///
/// The evaluator is pure, so the matching indices only need recomputing
/// when the records revision or the criteria change. Callers bump the
/// revision whenever the record collection is replaced or edited.
#[derive(Debug, Clone, Default)]
pub struct CachedFilter {
    key: Option<CacheKey>,
    indices: Vec<usize>,
    recomputations: u64,
}

impl CachedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching indices for `records`, recomputed only on a key change
    pub fn indices<R: Record>(
        &mut self,
        records: &[R],
        revision: u64,
        criteria: &FilterCriteria,
    ) -> &[usize] {
        let fresh = self.key.as_ref().is_some_and(|key| {
            key.revision == revision && key.len == records.len() && &key.criteria == criteria
        });

        if fresh {
            trace!(revision, "filter cache hit");
        } else {
            self.indices = criteria.indices(records);
            self.key = Some(CacheKey {
                revision,
                len: records.len(),
                criteria: criteria.clone(),
            });
            self.recomputations += 1;
        }

        &self.indices
    }

    /// Matching records for `records`, borrowing from the cached indices
    pub fn filter<'a, R: Record>(
        &mut self,
        records: &'a [R],
        revision: u64,
        criteria: &FilterCriteria,
    ) -> Vec<&'a R> {
        self.indices(records, revision, criteria)
            .iter()
            .map(|&idx| &records[idx])
            .collect()
    }

    /// Drop the cached result so the next call recomputes
    pub fn invalidate(&mut self) {
        self.key = None;
        self.indices.clear();
    }

    /// How many times the evaluator actually ran
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
