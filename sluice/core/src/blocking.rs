use tokio::task::JoinError;

/// Run blocking I/O on tokio's blocking pool.
///
/// The closure keeps the caller's tracing dispatcher and span, so events it emits
/// land in the same run log as the async code around it.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let dispatch = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
    let span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || span.in_scope(f))
    })
    .await
}
