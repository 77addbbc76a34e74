//! XML bodies of the object API
//!
//! Responses are matched on local element names, so the
//! `http://s3.amazonaws.com/doc/2006-03-01/` namespace (or its absence)
//! does not matter.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::traits::{DeleteOutcome, DeleteStatus, ListPage, ObjectEntry};

/// One step of a depth-first walk over an XML document
enum Node<'a> {
    /// An element was opened; `path` ends with its local name
    Open { path: &'a [String] },
    /// An element was closed with the text it directly contained
    Close { path: &'a [String], text: &'a str },
}

fn walk<F>(xml: &[u8], mut visit: F) -> Result<()>
where
    F: FnMut(Node<'_>) -> Result<()>,
{
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut path: Vec<String> = Vec::new();
    let mut texts: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                texts.push(String::new());
                visit(Node::Open { path: &path })?;
            }
            Event::Empty(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                visit(Node::Open { path: &path })?;
                visit(Node::Close {
                    path: &path,
                    text: "",
                })?;
                path.pop();
            }
            Event::Text(e) => {
                if let Some(text) = texts.last_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = texts.last_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let text = texts.pop().unwrap_or_default();
                visit(Node::Close { path: &path, text: &text })?;
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

/// Match the element names below the document root
fn below_root<'a>(path: &'a [String]) -> Vec<&'a str> {
    path.iter().skip(1).map(String::as_str).collect()
}

/// Parse a `ListAllMyBucketsResult` body into bucket names
pub fn parse_list_buckets(xml: &[u8]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    walk(xml, |node| {
        if let Node::Close { path, text } = node
            && below_root(path) == ["Buckets", "Bucket", "Name"]
        {
            names.push(text.to_string());
        }
        Ok(())
    })?;
    Ok(names)
}

/// Parse a `ListBucketResult` body
pub fn parse_list_objects(xml: &[u8]) -> Result<ListPage> {
    let mut truncated = None;
    let mut entries = Vec::new();
    let mut current: Option<ObjectEntry> = None;

    walk(xml, |node| {
        match node {
            Node::Open { path } => {
                if below_root(path) == ["Contents"] {
                    current = Some(ObjectEntry::default());
                }
            }
            Node::Close { path, text } => match below_root(path).as_slice() {
                ["IsTruncated"] => truncated = Some(text == "true"),
                ["Contents", field] => {
                    if let Some(entry) = current.as_mut() {
                        match *field {
                            "Key" => entry.key = text.to_string(),
                            "ETag" => entry.etag = Some(text.to_string()),
                            "Size" => {
                                entry.size = Some(text.parse().map_err(|_| {
                                    Error::Parse(format!("Invalid object size: {text}"))
                                })?)
                            }
                            "LastModified" => entry.last_modified = Some(text.to_string()),
                            _ => {}
                        }
                    }
                }
                ["Contents"] => {
                    if let Some(entry) = current.take() {
                        if entry.key.is_empty() {
                            return Err(Error::Parse("Contents element without Key".into()));
                        }
                        entries.push(entry);
                    }
                }
                _ => {}
            },
        }
        Ok(())
    })?;

    let truncated =
        truncated.ok_or_else(|| Error::Parse("Missing IsTruncated element".into()))?;
    Ok(ListPage { entries, truncated })
}

/// Parse a `DeleteResult` body into one outcome per reported key
pub fn parse_delete_result(xml: &[u8]) -> Result<Vec<DeleteOutcome>> {
    struct Pending {
        tag: String,
        key: Option<String>,
        code: Option<String>,
        message: Option<String>,
    }

    let mut outcomes = Vec::new();
    let mut current: Option<Pending> = None;

    walk(xml, |node| {
        match node {
            Node::Open { path } if path.len() == 2 => {
                current = Some(Pending {
                    tag: path[1].clone(),
                    key: None,
                    code: None,
                    message: None,
                });
            }
            Node::Close { path, text } if path.len() == 3 => {
                if let Some(pending) = current.as_mut() {
                    match path[2].as_str() {
                        "Key" => pending.key = Some(text.to_string()),
                        "Code" => pending.code = Some(text.to_string()),
                        "Message" => pending.message = Some(text.to_string()),
                        _ => {}
                    }
                }
            }
            Node::Close { path, .. } if path.len() == 2 => {
                if let Some(pending) = current.take() {
                    let key = pending.key.ok_or_else(|| {
                        Error::Parse(format!("{} element without Key", pending.tag))
                    })?;
                    let status = match pending.tag.as_str() {
                        "Deleted" => DeleteStatus::Deleted,
                        "Error" => DeleteStatus::Failed {
                            code: pending.code,
                            message: pending.message,
                        },
                        other => {
                            return Err(Error::Parse(format!(
                                "Unexpected delete result element: {other}"
                            )));
                        }
                    };
                    outcomes.push(DeleteOutcome { key, status });
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(outcomes)
}

/// Extract `<Error><Code>` from an error body, if there is one
pub fn parse_error_code(xml: &[u8]) -> Option<String> {
    let mut code = None;
    walk(xml, |node| {
        if let Node::Close { path, text } = node
            && path.len() == 2
            && path[0] == "Error"
            && path[1] == "Code"
        {
            code = Some(text.to_string());
        }
        Ok(())
    })
    .ok()?;
    code
}

/// Render the body of a multi-object delete request
pub fn render_delete_body<S: AsRef<str>>(keys: &[S], quiet: bool) -> Vec<u8> {
    let mut body = String::from("<Delete>");
    if quiet {
        body.push_str("<Quiet>true</Quiet>");
    }
    for key in keys {
        body.push_str("<Object><Key>");
        body.push_str(&escape(key.as_ref()));
        body.push_str("</Key></Object>");
    }
    body.push_str("</Delete>");
    body.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>johnsmith</Name>
  <Prefix></Prefix>
  <Marker></Marker>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <Contents>
    <Key>photos/2006/February/sample.jpg</Key>
    <LastModified>2011-02-26T01:56:20.000Z</LastModified>
    <ETag>&quot;bf1d737a4d46a19f3bced6905cc8b902&quot;</ETag>
    <Size>142863</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <Contents>
    <Key>photos/puppy &amp; kitten.jpg</Key>
    <Size>0</Size>
  </Contents>
</ListBucketResult>"#;

    #[test]
    fn test_parse_list_objects() {
        let page = parse_list_objects(LIST_PAGE.as_bytes()).unwrap();
        assert!(page.truncated);
        assert_eq!(page.entries.len(), 2);

        let first = &page.entries[0];
        assert_eq!(first.key, "photos/2006/February/sample.jpg");
        assert_eq!(first.size, Some(142863));
        assert_eq!(
            first.etag.as_deref(),
            Some("\"bf1d737a4d46a19f3bced6905cc8b902\"")
        );
        assert_eq!(first.last_modified.as_deref(), Some("2011-02-26T01:56:20.000Z"));

        assert_eq!(page.entries[1].key, "photos/puppy & kitten.jpg");
        assert_eq!(page.keys(), vec![
            "photos/2006/February/sample.jpg",
            "photos/puppy & kitten.jpg"
        ]);
    }

    #[test]
    fn test_parse_list_objects_not_truncated_empty() {
        let xml = r#"<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>"#;
        let page = parse_list_objects(xml.as_bytes()).unwrap();
        assert!(!page.truncated);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_parse_list_objects_missing_truncation_flag() {
        let xml = r#"<ListBucketResult><Contents><Key>a</Key></Contents></ListBucketResult>"#;
        let err = parse_list_objects(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_list_objects_malformed() {
        let xml = "<ListBucketResult><IsTruncated>false</Oops></ListBucketResult>";
        assert!(parse_list_objects(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_list_buckets() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>bcaf1ffd86f41161ca5fb16fd081034f</ID><DisplayName>webfile</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>quotes</Name><CreationDate>2006-02-03T16:45:09.000Z</CreationDate></Bucket>
    <Bucket><Name>samples</Name><CreationDate>2006-02-03T16:41:58.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        let names = parse_list_buckets(xml.as_bytes()).unwrap();
        assert_eq!(names, vec!["quotes", "samples"]);
    }

    #[test]
    fn test_parse_delete_result() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<DeleteResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Deleted><Key>sample1.txt</Key></Deleted>
  <Error>
    <Key>sample2.txt</Key>
    <Code>AccessDenied</Code>
    <Message>Access Denied</Message>
  </Error>
</DeleteResult>"#;
        let outcomes = parse_delete_result(xml.as_bytes()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].key, "sample1.txt");
        assert_eq!(outcomes[0].status, DeleteStatus::Deleted);
        assert_eq!(outcomes[0].status.tag(), "Deleted");
        assert_eq!(outcomes[1].key, "sample2.txt");
        assert_eq!(
            outcomes[1].status,
            DeleteStatus::Failed {
                code: Some("AccessDenied".into()),
                message: Some("Access Denied".into()),
            }
        );
        assert_eq!(outcomes[1].status.tag(), "Error");
    }

    #[test]
    fn test_parse_delete_result_quiet_is_empty() {
        let xml = r#"<DeleteResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"/>"#;
        assert!(parse_delete_result(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_delete_result_without_key() {
        let xml = "<DeleteResult><Deleted><VersionId>1</VersionId></Deleted></DeleteResult>";
        assert!(matches!(
            parse_delete_result(xml.as_bytes()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_parse_error_code() {
        let xml = "<Error><Code>NoSuchBucket</Code><Message>gone</Message></Error>";
        assert_eq!(parse_error_code(xml.as_bytes()).as_deref(), Some("NoSuchBucket"));
        assert_eq!(parse_error_code(b"not xml <<"), None);
        assert_eq!(parse_error_code(b""), None);
    }

    #[test]
    fn test_render_delete_body() {
        let body = render_delete_body(&["a.txt", "b&c.txt"], false);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "<Delete><Object><Key>a.txt</Key></Object><Object><Key>b&amp;c.txt</Key></Object></Delete>"
        );
    }

    #[test]
    fn test_render_delete_body_quiet() {
        let body = render_delete_body(&["a.txt"], true);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "<Delete><Quiet>true</Quiet><Object><Key>a.txt</Key></Object></Delete>"
        );
    }

    #[test]
    fn test_parse_delete_result_unknown_element() {
        let body = render_delete_body(&["k"], false);
        assert!(matches!(parse_delete_result(&body), Err(Error::Parse(_))));
    }
}
