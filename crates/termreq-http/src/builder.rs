use serde_json::{Map, Value};
use url::Url;

use crate::error::RequestError;
use crate::model::{HttpMethod, KvMap, RequestDescriptor};

/// Header name checked before injecting the JSON default. Compared exactly,
/// so `content-type` does not suppress the injection.
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_MIME: &str = "application/json";

/// Build a ready-to-send request from the pane contents. No I/O happens here.
///
/// - GET appends every param to the URL's query, keeping any values already there.
/// - DELETE ignores params and carries no body.
/// - POST/PUT/PATCH send params as a flat JSON object of strings and get
///   `Content-Type: application/json` unless the headers define `Content-Type`.
pub fn build(
    method: HttpMethod,
    raw_url: &str,
    params: &KvMap,
    headers: &KvMap,
) -> Result<RequestDescriptor, RequestError> {
    let raw_url = raw_url.trim();
    let mut url =
        Url::parse(raw_url).map_err(|e| RequestError::InvalidUrl(format!("{e}: {raw_url:?}")))?;

    let body = match method {
        HttpMethod::Get => {
            append_query(&mut url, params);
            None
        }
        HttpMethod::Delete => None,
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => Some(json_body(params)?),
    };

    let mut header_list: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if method.sends_json_body() && !headers.contains_key(CONTENT_TYPE) {
        header_list.push((CONTENT_TYPE.to_string(), JSON_MIME.to_string()));
    }

    Ok(RequestDescriptor {
        method,
        url,
        headers: header_list,
        body,
    })
}

fn append_query(url: &mut Url, params: &KvMap) {
    // query_pairs_mut() would leave a bare `?` behind on an empty map
    if params.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in params {
        query.append_pair(key, value);
    }
}

fn json_body(params: &KvMap) -> Result<Vec<u8>, RequestError> {
    let object: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    serde_json::to_vec(&Value::Object(object))
        .map_err(|e| RequestError::BodySerialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_kv_buffer;
    use pretty_assertions::assert_eq;

    fn query_pairs(desc: &RequestDescriptor) -> Vec<(String, String)> {
        desc.url.query_pairs().into_owned().collect()
    }

    fn body_json(desc: &RequestDescriptor) -> Value {
        serde_json::from_slice(desc.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_get_merges_params_into_existing_query() {
        let params = parse_kv_buffer("b=2");
        let desc = build(HttpMethod::Get, "http://x/?a=1", &params, &KvMap::new()).unwrap();
        assert_eq!(
            query_pairs(&desc),
            vec![("a".into(), "1".into()), ("b".into(), "2".into())]
        );
        assert_eq!(desc.body, None);
    }

    #[test]
    fn test_get_adds_rather_than_overwrites() {
        let params = parse_kv_buffer("a=2");
        let desc = build(HttpMethod::Get, "http://x/?a=1", &params, &KvMap::new()).unwrap();
        assert_eq!(desc.url.as_str(), "http://x/?a=1&a=2");
    }

    #[test]
    fn test_get_encodes_values() {
        let params = parse_kv_buffer("q=hello world&more");
        let desc = build(HttpMethod::Get, "http://x/search", &params, &KvMap::new()).unwrap();
        assert_eq!(desc.url.as_str(), "http://x/search?q=hello+world%26more");
    }

    #[test]
    fn test_get_without_params_leaves_url_alone() {
        let desc = build(HttpMethod::Get, "https://httpbin.org/get", &KvMap::new(), &KvMap::new())
            .unwrap();
        assert_eq!(desc.url.as_str(), "https://httpbin.org/get");
    }

    #[test]
    fn test_get_never_injects_content_type() {
        let desc = build(HttpMethod::Get, "http://x", &parse_kv_buffer("a=1"), &KvMap::new())
            .unwrap();
        assert!(desc.header_values(CONTENT_TYPE).is_empty());
    }

    #[test]
    fn test_delete_ignores_params() {
        let params = parse_kv_buffer("a=1\nb=2");
        let desc = build(HttpMethod::Delete, "http://x/items/7", &params, &KvMap::new()).unwrap();
        assert_eq!(desc.url.as_str(), "http://x/items/7");
        assert_eq!(desc.body, None);
        assert!(desc.headers.is_empty());
    }

    #[test]
    fn test_post_sends_json_body_and_content_type() {
        let desc = build(HttpMethod::Post, "http://x", &parse_kv_buffer("a=1"), &KvMap::new())
            .unwrap();
        assert_eq!(body_json(&desc), serde_json::json!({"a": "1"}));
        assert_eq!(desc.header_values(CONTENT_TYPE), vec![JSON_MIME]);
        assert_eq!(desc.url.query(), None);
    }

    #[test]
    fn test_post_keeps_user_content_type() {
        let headers = parse_kv_buffer("Content-Type=text/plain");
        let desc =
            build(HttpMethod::Post, "http://x", &parse_kv_buffer("a=1"), &headers).unwrap();
        assert_eq!(desc.header_values(CONTENT_TYPE), vec!["text/plain"]);
    }

    #[test]
    fn test_content_type_check_is_case_sensitive() {
        let headers = parse_kv_buffer("content-type=text/plain");
        let desc = build(HttpMethod::Put, "http://x", &KvMap::new(), &headers).unwrap();
        assert_eq!(
            desc.headers,
            vec![
                ("content-type".to_string(), "text/plain".to_string()),
                (CONTENT_TYPE.to_string(), JSON_MIME.to_string()),
            ]
        );
    }

    #[test]
    fn test_body_keys_follow_buffer_order() {
        let params = parse_kv_buffer("zeta=1\nalpha=2\nmid=3");
        let desc = build(HttpMethod::Patch, "http://x", &params, &KvMap::new()).unwrap();
        assert_eq!(
            String::from_utf8(desc.body.unwrap()).unwrap(),
            r#"{"zeta":"1","alpha":"2","mid":"3"}"#
        );
    }

    #[test]
    fn test_write_method_with_no_params_sends_empty_object() {
        let desc = build(HttpMethod::Put, "http://x", &KvMap::new(), &KvMap::new()).unwrap();
        assert_eq!(desc.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_headers_keep_buffer_order() {
        let headers = parse_kv_buffer("Accept=application/json\nX-Trace=abc");
        let desc = build(HttpMethod::Get, "http://x", &KvMap::new(), &headers).unwrap();
        assert_eq!(
            desc.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = build(HttpMethod::Get, "not a url", &KvMap::new(), &KvMap::new()).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("Error parsing URL: "));
    }

    #[test]
    fn test_url_is_trimmed() {
        let desc = build(HttpMethod::Get, "  http://x/a \n", &KvMap::new(), &KvMap::new()).unwrap();
        assert_eq!(desc.url.as_str(), "http://x/a");
    }
}
