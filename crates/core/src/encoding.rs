//! Query argument and header encoding
//!
//! Header and query-argument bags are kept in insertion order so that the
//! wire request is deterministic. Header names compare case-insensitively.

use crate::error::{Error, Result};

/// Reserved prefix for provider headers
pub const AMZ_PREFIX: &str = "x-amz-";

/// Content-metadata headers the provider treats as part of the object
pub const METADATA_HEADERS: [&str; 6] = [
    "Cache-Control",
    "Content-Disposition",
    "Content-Type",
    "Content-Language",
    "Expires",
    "Content-Encoding",
];

/// Query arguments that name a distinct resource and therefore get signed
pub const SUB_RESOURCES: [&str; 19] = [
    "acl",
    "cors",
    "delete",
    "lifecycle",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    "requestPayment",
    "restore",
    "tagging",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

/// Ordered HTTP header bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into this bag; values from `other` win
    pub fn extend(&mut self, other: Headers) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Value of a query argument: bare flag (`?delete`) or `name=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Flag,
    Value(String),
}

/// Ordered query-argument bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs(Vec<(String, ArgValue)>);

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag-style argument
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.set(name, ArgValue::Flag);
        self
    }

    /// Add a `name=value` argument
    pub fn value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, ArgValue::Value(value.into()));
        self
    }

    /// Add a `name=value` argument only when a value is present
    pub fn value_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.value(name, v),
            None => self,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: ArgValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as `?flag&name=value`, or the empty string when there are no arguments
    ///
    /// Flags come first, then valued arguments, each group in insertion order.
    pub fn to_query_string(&self) -> String {
        let flags = self.0.iter().filter_map(|(name, value)| match value {
            ArgValue::Flag => Some(urlencoding::encode(name).into_owned()),
            ArgValue::Value(_) => None,
        });
        let values = self.0.iter().filter_map(|(name, value)| match value {
            ArgValue::Flag => None,
            ArgValue::Value(v) => Some(format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(v)
            )),
        });

        let joined = flags.chain(values).collect::<Vec<_>>().join("&");
        if joined.is_empty() {
            joined
        } else {
            format!("?{joined}")
        }
    }

    /// Sub-resource part of the canonical resource
    ///
    /// Unlike [`QueryArgs::to_query_string`], arguments are sorted by name
    /// and values are left unencoded, which is how the provider rebuilds the
    /// string it verifies.
    pub fn to_canonical_string(&self) -> String {
        let mut args = self.sub_resources().0;
        if args.is_empty() {
            return String::new();
        }
        args.sort_by(|a, b| a.0.cmp(&b.0));

        let rendered = args
            .iter()
            .map(|(name, value)| match value {
                ArgValue::Flag => name.clone(),
                ArgValue::Value(v) => format!("{name}={v}"),
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("?{rendered}")
    }

    /// Keep only the arguments that identify a sub-resource
    pub fn sub_resources(&self) -> QueryArgs {
        QueryArgs(
            self.0
                .iter()
                .filter(|(name, _)| is_sub_resource(name))
                .cloned()
                .collect(),
        )
    }
}

/// Whether a query argument name is part of the canonical resource
pub fn is_sub_resource(name: &str) -> bool {
    SUB_RESOURCES.iter().any(|s| s.eq_ignore_ascii_case(name))
}

/// Whether a header is significant to the provider
pub fn is_special_header(name: &str) -> bool {
    let prefixed = name
        .get(..AMZ_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(AMZ_PREFIX));
    prefixed || METADATA_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Whether a header carries the provider's reserved prefix
pub fn is_amz_header(name: &str) -> bool {
    name.get(..AMZ_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(AMZ_PREFIX))
}

/// Partition headers into (special, regular)
pub fn split_headers(headers: &Headers) -> (Headers, Headers) {
    let mut special = Headers::new();
    let mut regular = Headers::new();
    for (name, value) in headers.iter() {
        if is_special_header(name) {
            special.insert(name, value);
        } else {
            regular.insert(name, value);
        }
    }
    (special, regular)
}

/// Percent-encode an object key for use in a request path, keeping `/`
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a `name:value` header argument
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::InvalidInput(format!(
            "Header '{raw}' is not of form key:value"
        ))),
    }
}

/// Parse a list of `name:value` header arguments into a bag
pub fn parse_headers<S: AsRef<str>>(raw: &[S]) -> Result<Headers> {
    let mut headers = Headers::new();
    for header in raw {
        let (name, value) = parse_header(header.as_ref())?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_empty() {
        assert_eq!(QueryArgs::new().to_query_string(), "");
    }

    #[test]
    fn test_query_string_single() {
        assert_eq!(QueryArgs::new().flag("k").to_query_string(), "?k");
        assert_eq!(QueryArgs::new().value("k", "v").to_query_string(), "?k=v");
    }

    #[test]
    fn test_query_string_flags_first() {
        let args = QueryArgs::new().value("k", "v").flag("f");
        assert_eq!(args.to_query_string(), "?f&k=v");
    }

    #[test]
    fn test_query_string_two_values() {
        let rendered = QueryArgs::new()
            .value("k1", "v1")
            .value("k2", "v2")
            .to_query_string();
        assert!(rendered.starts_with('?'));
        assert!(rendered.contains("k1=v1"));
        assert!(rendered.contains("k2=v2"));
    }

    #[test]
    fn test_query_string_percent_encoding() {
        let args = QueryArgs::new().value("b@dkey", "b@dvalue$$");
        assert_eq!(args.to_query_string(), "?b%40dkey=b%40dvalue%24%24");

        let args = QueryArgs::new().flag("b@dkey");
        assert_eq!(args.to_query_string(), "?b%40dkey");
    }

    #[test]
    fn test_value_opt() {
        let args = QueryArgs::new()
            .value_opt("marker", Some("abc"))
            .value_opt("prefix", None::<String>);
        assert_eq!(args.len(), 1);
        assert_eq!(args.get("marker"), Some(&ArgValue::Value("abc".into())));
    }

    #[test]
    fn test_sub_resources() {
        let args = QueryArgs::new().flag("delete");
        assert_eq!(args.sub_resources(), QueryArgs::new().flag("delete"));

        let args = QueryArgs::new().flag("delete").value("a", "b");
        assert_eq!(args.sub_resources(), QueryArgs::new().flag("delete"));
    }

    #[test]
    fn test_sub_resources_drop_pagination() {
        let args = QueryArgs::new()
            .value("marker", "k")
            .value("prefix", "p/")
            .value("max-keys", "10");
        assert!(args.sub_resources().is_empty());
        assert_eq!(args.sub_resources().to_query_string(), "");
    }

    #[test]
    fn test_canonical_string_sorted_and_raw() {
        let args = QueryArgs::new()
            .flag("versions")
            .value("prefix", "p/")
            .value("versionId", "a/b");
        assert_eq!(args.to_canonical_string(), "?versionId=a/b&versions");
        assert_eq!(args.to_query_string(), "?versions&prefix=p%2F&versionId=a%2Fb");

        assert_eq!(QueryArgs::new().value("marker", "k").to_canonical_string(), "");
        assert_eq!(QueryArgs::new().flag("acl").to_canonical_string(), "?acl");
    }

    #[test]
    fn test_sub_resource_versionid_case() {
        assert!(is_sub_resource("versionId"));
        assert!(is_sub_resource("versionid"));
        assert!(!is_sub_resource("marker"));
    }

    #[test]
    fn test_split_headers() {
        let headers: Headers = [("x-amz-meta-a", "1"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        let (special, regular) = split_headers(&headers);
        assert_eq!(special.get("x-amz-meta-a"), Some("1"));
        assert_eq!(special.len(), 1);
        assert_eq!(regular.get("Accept"), Some("*/*"));
        assert_eq!(regular.len(), 1);
    }

    #[test]
    fn test_split_headers_case_insensitive_prefix() {
        let headers: Headers = [("X-Amz-Meta", "v")].into_iter().collect();
        let (special, regular) = split_headers(&headers);
        assert_eq!(special.get("X-Amz-Meta"), Some("v"));
        assert!(regular.is_empty());
    }

    #[test]
    fn test_split_headers_metadata_whitelist() {
        let headers: Headers = [
            ("Content-Type", "text/plain"),
            ("cache-control", "no-cache"),
            ("Content-Length", "3"),
        ]
        .into_iter()
        .collect();
        let (special, regular) = split_headers(&headers);
        assert!(special.contains("content-type"));
        assert!(special.contains("Cache-Control"));
        assert!(regular.contains("Content-Length"));
    }

    #[test]
    fn test_headers_insert_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "a");
        headers.insert("content-type", "b");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("b"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("photos/puppy.jpg"), "photos/puppy.jpg");
        assert_eq!(encode_key("a b/c+d"), "a%20b/c%2Bd");
        assert_eq!(encode_key(""), "");
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Content-Type:text/plain").unwrap(),
            ("Content-Type".to_string(), "text/plain".to_string())
        );
        assert_eq!(
            parse_header("x-amz-meta-url: http://a/b").unwrap(),
            ("x-amz-meta-url".to_string(), "http://a/b".to_string())
        );
    }

    #[test]
    fn test_parse_header_malformed() {
        let err = parse_header("no-separator").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(parse_header(":value").is_err());
    }

    #[test]
    fn test_parse_headers_fails_on_first_bad_entry() {
        assert!(parse_headers(&["a:1", "bad"]).is_err());
        let headers = parse_headers(&["a:1", "b:2"]).unwrap();
        assert_eq!(headers.len(), 2);
    }
}
