use indexmap::IndexMap;
use url::Url;

/// HTTP methods offered by the method selector, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// The fixed method list the selector cycles through.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Method at `index` in [`HttpMethod::ALL`], wrapping.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Write methods carry parameters as a JSON body.
    pub fn sends_json_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value pairs parsed from a pane buffer (query/body params or headers).
///
/// Keys are unique. A repeated key keeps its first position and takes the
/// last value, so iteration follows the buffer's line order.
pub type KvMap = IndexMap<String, String>;

/// A fully-resolved, ready-to-send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: Url,
    /// Header entries in send order. Names may repeat.
    pub headers: Vec<(String, String)>,
    /// Always `None` for GET and DELETE.
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// All values sent for a header name (exact match).
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// A received response. Header names keep first-seen order, each with all its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Status code and reason phrase, e.g. `200 OK`.
    pub status_line: String,
    pub headers: Vec<(String, Vec<String>)>,
    pub body: Vec<u8>,
}

impl ResponseRecord {
    pub fn new(
        status_line: impl Into<String>,
        headers: Vec<(String, Vec<String>)>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            status_line: status_line.into(),
            headers,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_wraps() {
        assert_eq!(HttpMethod::from_index(0), HttpMethod::Get);
        assert_eq!(HttpMethod::from_index(4), HttpMethod::Patch);
        assert_eq!(HttpMethod::from_index(5), HttpMethod::Get);
    }

    #[test]
    fn test_json_body_methods() {
        let with_body: Vec<_> = HttpMethod::ALL
            .iter()
            .filter(|m| m.sends_json_body())
            .map(|m| m.as_str())
            .collect();
        assert_eq!(with_body, vec!["POST", "PUT", "PATCH"]);
    }

    #[test]
    fn test_kv_map_last_value_wins_in_first_position() {
        let mut map = KvMap::new();
        map.insert("a".into(), "1".into());
        map.insert("b".into(), "2".into());
        map.insert("a".into(), "3".into());
        let pairs: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }
}
