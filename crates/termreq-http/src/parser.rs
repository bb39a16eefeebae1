use crate::model::KvMap;

/// Parse a `key=value` per line buffer.
///
/// Total: blank lines and lines without `=` are skipped, never reported.
/// Only the first `=` splits, so values may contain `=`. Key and value are
/// trimmed individually.
pub fn parse_kv_buffer(text: &str) -> KvMap {
    let mut map = KvMap::new();
    for line in text.trim().split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}
