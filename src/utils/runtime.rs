use anyhow::Result;

/// The monitor is single-threaded by design, a current-thread runtime is all
/// the binary needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
