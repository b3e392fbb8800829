//! Span helpers for storage and reminder operations

/// Create a span around a storage mutation
///
/// # Example
///
/// ```rust
/// use poqt_observability::store_span;
///
/// let span = store_span!("delete_task", 42);
/// let _guard = span.enter();
/// // ... storage operation ...
/// ```
#[macro_export]
macro_rules! store_span {
    ($operation:expr, $id:expr) => {
        ::tracing::info_span!(
            "store.operation",
            store.operation = $operation,
            entity.id = $id,
        )
    };
}

/// Create a span for reminder scheduling operations
///
/// # Example
///
/// ```rust
/// use poqt_observability::reminder_span;
///
/// let span = reminder_span!("arm", 7);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! reminder_span {
    ($operation:expr, $task_id:expr) => {
        ::tracing::debug_span!(
            "reminder.operation",
            reminder.operation = $operation,
            task.id = $task_id,
        )
    };
}

/// Record an error on the current span and log it
///
/// ```rust
/// use poqt_observability::record_error;
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "notifier closed");
/// record_error(&err);
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}
