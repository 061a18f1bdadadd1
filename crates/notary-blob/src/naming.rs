use std::path::Path;

use notary_types::SessionId;

/// Longest stem taken from a suggested name.
pub const MAX_STEM_LEN: usize = 64;
/// Longest extension kept from a suggested name.
pub const MAX_EXTENSION_LEN: usize = 16;

const FALLBACK_STEM: &str = "blob";

/// Build the on-disk name for a new blob.
///
/// Format: `<session>_<stem>_<nanos>[.<ext>]`. The session id alone makes the
/// name unique; the stem and extension come from the caller's suggested name
/// and are reduced to `[A-Za-z0-9_-]` so they can never introduce a path
/// separator or a `..` component.
pub fn blob_file_name(session: &SessionId, suggested_name: &str, nanos: u128) -> String {
    let path = Path::new(suggested_name);
    let stem = path
        .file_stem()
        .map(|s| sanitize(&s.to_string_lossy(), MAX_STEM_LEN))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());

    let extension = path
        .extension()
        .map(|e| {
            e.to_string_lossy()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_EXTENSION_LEN)
                .collect::<String>()
        })
        .filter(|e| !e.is_empty());

    match extension {
        Some(ext) => format!("{}_{stem}_{nanos}.{ext}", session.simple()),
        None => format!("{}_{stem}_{nanos}", session.simple()),
    }
}

fn sanitize(component: &str, max_len: usize) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect()
}
