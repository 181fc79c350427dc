use std::future::Future;

/// Run a batch of fallible futures concurrently and collect every outcome
/// in input order. One branch failing never cancels, blocks, or reorders
/// the others; callers see exactly one `Result` per input.
///
/// This is the single fan-out/fan-in primitive shared by attachment
/// resolution and multi-query search, so ordering and error-isolation
/// semantics stay identical across both.
pub async fn settle_ordered<F, T, E>(futures: Vec<F>) -> Vec<Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    futures::future::join_all(futures).await
}
