//! Bulk operation results and aggregate statistics.

use crate::server::error::fault::Fault;

/// Maximum number of items accepted by a single bulk request.
///
/// Bounds the number of serialized platform requests one invocation can issue.
pub const BULK_REQUEST_LIMIT: usize = 40;

/// Counts of successful and failed items in a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ResultsStats {
    pub ok: usize,
    pub failed: usize,
    pub total: usize,
}

/// Per-item results of a bulk operation in input order, plus aggregate stats.
///
/// `results[i]` always corresponds to the i-th input so failures can be reported
/// against what the caller submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResults<T> {
    pub results: Vec<Result<T, Fault>>,
    pub stats: ResultsStats,
}

impl<T> BulkResults<T> {
    /// Wraps per-item results and computes their stats.
    pub fn from_results(results: Vec<Result<T, Fault>>) -> Self {
        let ok = results.iter().filter(|result| result.is_ok()).count();
        let total = results.len();

        Self {
            stats: ResultsStats {
                ok,
                failed: total - ok,
                total,
            },
            results,
        }
    }

    /// Pairs each failed result with the input it was produced from.
    pub fn failures<'a, I>(&'a self, inputs: &'a [I]) -> Vec<(&'a I, &'a Fault)> {
        inputs
            .iter()
            .zip(self.results.iter())
            .filter_map(|(input, result)| result.as_ref().err().map(|fault| (input, fault)))
            .collect()
    }
}

/// Rejects a batch above the bulk ceiling before any per-item work starts.
pub fn check_bulk_limit(len: usize) -> Result<(), Fault> {
    if len > BULK_REQUEST_LIMIT {
        return Err(Fault::BulkRequestLimit);
    }

    Ok(())
}
