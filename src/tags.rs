use std::collections::BTreeMap;

/// Encodes object tags as a URL query string (`k1=v1&k2=v2`), the form S3 expects in the
/// `x-amz-tagging` header. Keys and values are percent-escaped.
pub fn encode_tags(tags: &BTreeMap<String, String>) -> String {
    tags.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
