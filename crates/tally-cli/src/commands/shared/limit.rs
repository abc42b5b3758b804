/// Resolve a page size with precedence: local arg -> global `--limit`.
///
/// `None` defers to the configured default in the service.
#[must_use]
pub const fn effective_page_size(local: Option<u32>, global: Option<u32>) -> Option<u32> {
    match local {
        Some(size) => Some(size),
        None => global,
    }
}
