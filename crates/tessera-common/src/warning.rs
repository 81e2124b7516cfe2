//! Renderer warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the DOM loader, the style layer and the layout engine to report
//! input they degrade around instead of rendering faithfully.

use std::collections::HashSet;
use std::sync::Mutex;

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Table", "colspan is not supported; cell spans one column");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .map(|mut guard| guard.get_or_insert_with(HashSet::new).insert(key))
        .unwrap_or(false);

    if should_print {
        eprintln!("{}", format!("[Tessera {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (called at the start of every top-level render)
pub fn clear_warnings() {
    if let Ok(mut guard) = WARNED.lock() {
        if let Some(set) = guard.as_mut() {
            set.clear();
        }
    }
}

/// Number of distinct warnings recorded since the last [`clear_warnings`].
#[must_use]
pub fn warning_count() -> usize {
    WARNED
        .lock()
        .map(|guard| guard.as_ref().map_or(0, HashSet::len))
        .unwrap_or(0)
}
