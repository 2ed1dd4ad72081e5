//! S3 XML deserialization: parsing S3 response documents into model types.
//!
//! This module provides the [`S3Deserialize`] trait and implementations for
//! every response document the client consumes. Parsing follows the AWS S3
//! RestXml conventions; unknown elements are skipped so that servers which
//! emit extra fields (or future S3 revisions) do not break the client.

use quick_xml::Reader;
use quick_xml::events::Event;

use ostor_model::response::{
    CompleteMultipartResult, ErrorDocument, InitiateMultipartResult, ListBucketsResult,
    ListObjectsPage, ListPartsPage, ListUploadsPage,
};
use ostor_model::types::{
    AccessControlPolicy, BucketInfo, Grant, ObjectInfo, Owner, PartInfo, Permission, UploadInfo,
};

use crate::error::XmlError;

/// Trait for deserializing S3 types from XML.
///
/// Implementors parse XML elements from the reader and populate the struct
/// fields. The root element has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this element.
    /// The implementation should read all child content and return when the
    /// matching end tag is consumed.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize S3-compatible XML into a typed value.
///
/// Finds the root element and delegates to the type's [`S3Deserialize`]
/// implementation.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_string()));
            }
            // Skip declaration, comments, processing instructions, whitespace.
            _ => {}
        }
    }
}

/// Parse a `GET /{bucket}?location` response into a region code.
///
/// The document is a bare `<LocationConstraint>` element; an empty element,
/// or an entirely empty body, means the classic region `us-east-1`.
///
/// # Errors
///
/// Returns `XmlError` if the body is non-empty but not a well-formed
/// `LocationConstraint` document.
pub fn parse_location_constraint(xml: &[u8]) -> Result<String, XmlError> {
    if xml.iter().all(u8::is_ascii_whitespace) {
        return Ok("us-east-1".to_owned());
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                let text = read_text_content(&mut reader)?;
                return Ok(if text.is_empty() {
                    "us-east-1".to_owned()
                } else {
                    text
                });
            }
            // Self-closing <LocationConstraint/>.
            Event::Empty(_) => return Ok("us-east-1".to_owned()),
            Event::Eof => {
                return Err(XmlError::MissingElement("LocationConstraint".to_string()));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
///
/// Expects the reader to be positioned right after a `Start` event.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

/// Parse a u64 from XML text.
fn parse_u64(s: &str) -> Result<u64, XmlError> {
    s.parse::<u64>()
        .map_err(|e| XmlError::ParseError(format!("invalid integer '{s}': {e}")))
}

/// Parse a part number (u16) from XML text.
fn parse_u16(s: &str) -> Result<u16, XmlError> {
    s.parse::<u16>()
        .map_err(|e| XmlError::ParseError(format!("invalid part number '{s}': {e}")))
}

/// Parse an ISO 8601 timestamp from XML text.
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, XmlError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            // The S3 format: 2006-02-03T16:45:09.000Z
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| XmlError::ParseError(format!("invalid timestamp '{s}': {e}")))
}

/// Strip the quotes an ETag carries on the wire.
fn unquote_etag(s: &str) -> String {
    s.trim_matches('"').to_owned()
}

/// Store non-empty text as `Some`.
fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

// ---------------------------------------------------------------------------
// Nested element readers
// ---------------------------------------------------------------------------

/// Read an `<Owner>` element.
fn read_owner(reader: &mut Reader<&[u8]>) -> Result<Owner, XmlError> {
    let mut owner = Owner::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ID" => owner.id = non_empty(read_text_content(reader)?),
                b"DisplayName" => owner.display_name = non_empty(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(_) => return Ok(owner),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement("EOF inside Owner".to_string()));
            }
            _ => {}
        }
    }
}

/// Read a `<Bucket>` element from a ListBuckets response.
fn read_bucket(reader: &mut Reader<&[u8]>) -> Result<BucketInfo, XmlError> {
    let mut name = None;
    let mut creation_date = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Name" => name = Some(read_text_content(reader)?),
                b"CreationDate" => {
                    creation_date = Some(parse_timestamp(&read_text_content(reader)?)?);
                }
                _ => skip_element(reader)?,
            },
            Event::End(_) => {
                return Ok(BucketInfo {
                    name: name.ok_or_else(|| XmlError::MissingElement("Name".to_string()))?,
                    creation_date: creation_date
                        .ok_or_else(|| XmlError::MissingElement("CreationDate".to_string()))?,
                });
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement("EOF inside Bucket".to_string()));
            }
            _ => {}
        }
    }
}

/// Read a `<Contents>` element from a ListObjects response.
fn read_contents(reader: &mut Reader<&[u8]>) -> Result<ObjectInfo, XmlError> {
    let mut key = None;
    let mut last_modified = None;
    let mut etag = String::new();
    let mut size = 0;
    let mut storage_class = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Key" => key = Some(read_text_content(reader)?),
                b"LastModified" => {
                    last_modified = Some(parse_timestamp(&read_text_content(reader)?)?);
                }
                b"ETag" => etag = unquote_etag(&read_text_content(reader)?),
                b"Size" => size = parse_u64(&read_text_content(reader)?)?,
                b"StorageClass" => storage_class = non_empty(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(_) => {
                return Ok(ObjectInfo {
                    key: key.ok_or_else(|| XmlError::MissingElement("Key".to_string()))?,
                    last_modified: last_modified
                        .ok_or_else(|| XmlError::MissingElement("LastModified".to_string()))?,
                    etag,
                    size,
                    storage_class,
                });
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "EOF inside Contents".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Read a `<CommonPrefixes>` element, returning the inner prefix.
fn read_common_prefix(reader: &mut Reader<&[u8]>) -> Result<Option<String>, XmlError> {
    let mut prefix = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Prefix" => prefix = non_empty(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(_) => return Ok(prefix),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "EOF inside CommonPrefixes".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Read an `<Upload>` element from a ListMultipartUploads response.
fn read_upload(reader: &mut Reader<&[u8]>) -> Result<UploadInfo, XmlError> {
    let mut key = None;
    let mut upload_id = None;
    let mut initiated = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Key" => key = Some(read_text_content(reader)?),
                b"UploadId" => upload_id = Some(read_text_content(reader)?),
                b"Initiated" => {
                    initiated = Some(parse_timestamp(&read_text_content(reader)?)?);
                }
                _ => skip_element(reader)?,
            },
            Event::End(_) => {
                return Ok(UploadInfo {
                    key: key.ok_or_else(|| XmlError::MissingElement("Key".to_string()))?,
                    upload_id: upload_id
                        .ok_or_else(|| XmlError::MissingElement("UploadId".to_string()))?,
                    initiated: initiated
                        .ok_or_else(|| XmlError::MissingElement("Initiated".to_string()))?,
                });
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement("EOF inside Upload".to_string()));
            }
            _ => {}
        }
    }
}

/// Read a `<Part>` element from a ListParts response.
fn read_part(reader: &mut Reader<&[u8]>) -> Result<PartInfo, XmlError> {
    let mut part_number = None;
    let mut etag = String::new();
    let mut size = 0;
    let mut last_modified = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"PartNumber" => part_number = Some(parse_u16(&read_text_content(reader)?)?),
                b"ETag" => etag = unquote_etag(&read_text_content(reader)?),
                b"Size" => size = parse_u64(&read_text_content(reader)?)?,
                b"LastModified" => {
                    last_modified = Some(parse_timestamp(&read_text_content(reader)?)?);
                }
                _ => skip_element(reader)?,
            },
            Event::End(_) => {
                return Ok(PartInfo {
                    part_number: part_number
                        .ok_or_else(|| XmlError::MissingElement("PartNumber".to_string()))?,
                    etag,
                    size,
                    last_modified,
                });
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement("EOF inside Part".to_string()));
            }
            _ => {}
        }
    }
}

/// Read a `<Grant>` element from an ACL response.
fn read_grant(reader: &mut Reader<&[u8]>) -> Result<Option<Grant>, XmlError> {
    let mut grantee_uri = None;
    let mut grantee_id = None;
    let mut permission = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Grantee" => {
                    // Nested: <Grantee><URI>…</URI></Grantee> or <ID>…</ID>.
                    loop {
                        match reader.read_event()? {
                            Event::Start(g) => match g.local_name().as_ref() {
                                b"URI" => grantee_uri = non_empty(read_text_content(reader)?),
                                b"ID" => grantee_id = non_empty(read_text_content(reader)?),
                                _ => skip_element(reader)?,
                            },
                            Event::End(_) => break,
                            Event::Eof => {
                                return Err(XmlError::UnexpectedElement(
                                    "EOF inside Grantee".to_string(),
                                ));
                            }
                            _ => {}
                        }
                    }
                }
                b"Permission" => {
                    permission = Permission::parse(&read_text_content(reader)?);
                }
                _ => skip_element(reader)?,
            },
            Event::End(_) => {
                // Grants with unrecognized permissions are dropped rather
                // than failing the whole document.
                return Ok(permission.map(|permission| Grant {
                    grantee_uri,
                    grantee_id,
                    permission,
                }));
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement("EOF inside Grant".to_string()));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// S3Deserialize implementations
// ---------------------------------------------------------------------------

impl S3Deserialize for ListBucketsResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut result = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Owner" => result.owner = read_owner(reader)?,
                    b"Buckets" => loop {
                        match reader.read_event()? {
                            Event::Start(b) if b.local_name().as_ref() == b"Bucket" => {
                                result.buckets.push(read_bucket(reader)?);
                            }
                            Event::Start(_) => skip_element(reader)?,
                            Event::End(_) => break,
                            Event::Eof => {
                                return Err(XmlError::UnexpectedElement(
                                    "EOF inside Buckets".to_string(),
                                ));
                            }
                            _ => {}
                        }
                    },
                    _ => skip_element(reader)?,
                },
                Event::End(_) => return Ok(result),
                Event::Eof => return Ok(result),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for ListObjectsPage {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut page = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Contents" => page.objects.push(read_contents(reader)?),
                    b"CommonPrefixes" => {
                        if let Some(prefix) = read_common_prefix(reader)? {
                            page.prefixes.push(prefix);
                        }
                    }
                    b"IsTruncated" => {
                        page.is_truncated = parse_bool(&read_text_content(reader)?)?;
                    }
                    b"NextMarker" => page.next_marker = non_empty(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => return Ok(page),
                Event::Eof => return Ok(page),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for ListUploadsPage {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut page = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Upload" => page.uploads.push(read_upload(reader)?),
                    b"CommonPrefixes" => {
                        if let Some(prefix) = read_common_prefix(reader)? {
                            page.prefixes.push(prefix);
                        }
                    }
                    b"IsTruncated" => {
                        page.is_truncated = parse_bool(&read_text_content(reader)?)?;
                    }
                    b"NextKeyMarker" => {
                        page.next_key_marker = non_empty(read_text_content(reader)?);
                    }
                    b"NextUploadIdMarker" => {
                        page.next_upload_id_marker = non_empty(read_text_content(reader)?);
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => return Ok(page),
                Event::Eof => return Ok(page),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for ListPartsPage {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut page = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Part" => page.parts.push(read_part(reader)?),
                    b"IsTruncated" => {
                        page.is_truncated = parse_bool(&read_text_content(reader)?)?;
                    }
                    b"NextPartNumberMarker" => {
                        let text = read_text_content(reader)?;
                        if !text.is_empty() {
                            page.next_part_number_marker = Some(parse_u16(&text)?);
                        }
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => return Ok(page),
                Event::Eof => return Ok(page),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for InitiateMultipartResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut result = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Bucket" => result.bucket = read_text_content(reader)?,
                    b"Key" => result.key = read_text_content(reader)?,
                    b"UploadId" => result.upload_id = read_text_content(reader)?,
                    _ => skip_element(reader)?,
                },
                Event::End(_) | Event::Eof => {
                    if result.upload_id.is_empty() {
                        return Err(XmlError::MissingElement("UploadId".to_string()));
                    }
                    return Ok(result);
                }
                _ => {}
            }
        }
    }
}

impl S3Deserialize for CompleteMultipartResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut result = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Location" => result.location = non_empty(read_text_content(reader)?),
                    b"Bucket" => result.bucket = non_empty(read_text_content(reader)?),
                    b"Key" => result.key = non_empty(read_text_content(reader)?),
                    b"ETag" => result.etag = unquote_etag(&read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) | Event::Eof => return Ok(result),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for AccessControlPolicy {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut policy = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Owner" => policy.owner = read_owner(reader)?,
                    b"AccessControlList" => loop {
                        match reader.read_event()? {
                            Event::Start(g) if g.local_name().as_ref() == b"Grant" => {
                                if let Some(grant) = read_grant(reader)? {
                                    policy.grants.push(grant);
                                }
                            }
                            Event::Start(_) => skip_element(reader)?,
                            Event::End(_) => break,
                            Event::Eof => {
                                return Err(XmlError::UnexpectedElement(
                                    "EOF inside AccessControlList".to_string(),
                                ));
                            }
                            _ => {}
                        }
                    },
                    _ => skip_element(reader)?,
                },
                Event::End(_) | Event::Eof => return Ok(policy),
                _ => {}
            }
        }
    }
}

impl S3Deserialize for ErrorDocument {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut doc = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"Code" => doc.code = read_text_content(reader)?,
                    b"Message" => doc.message = read_text_content(reader)?,
                    b"RequestId" => doc.request_id = non_empty(read_text_content(reader)?),
                    b"HostId" => doc.host_id = non_empty(read_text_content(reader)?),
                    b"Resource" => doc.resource = non_empty(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) | Event::Eof => return Ok(doc),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ostor_model::types::CannedAcl;

    use super::*;

    #[test]
    fn test_should_parse_list_buckets_result() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc123</ID><DisplayName>alice</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>first</Name><CreationDate>2024-01-15T10:30:00.000Z</CreationDate></Bucket>
    <Bucket><Name>second</Name><CreationDate>2024-02-01T00:00:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

        let result: ListBucketsResult = from_xml(xml).unwrap();
        assert_eq!(result.owner.id.as_deref(), Some("abc123"));
        assert_eq!(result.buckets.len(), 2);
        assert_eq!(result.buckets[0].name, "first");
        assert_eq!(result.buckets[1].name, "second");
    }

    #[test]
    fn test_should_parse_list_objects_page() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>mybucket</Name>
  <Prefix>photos/</Prefix>
  <IsTruncated>true</IsTruncated>
  <NextMarker>photos/cat.png</NextMarker>
  <Contents>
    <Key>photos/ant.png</Key>
    <LastModified>2024-03-01T12:00:00.000Z</LastModified>
    <ETag>&quot;599b5b7254242dd4f380f4b1b1e0c2a5&quot;</ETag>
    <Size>409600</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <CommonPrefixes><Prefix>photos/2024/</Prefix></CommonPrefixes>
</ListBucketResult>"#;

        let page: ListObjectsPage = from_xml(xml).unwrap();
        assert!(page.is_truncated);
        assert_eq!(page.next_marker.as_deref(), Some("photos/cat.png"));
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key, "photos/ant.png");
        assert_eq!(page.objects[0].etag, "599b5b7254242dd4f380f4b1b1e0c2a5");
        assert_eq!(page.objects[0].size, 409_600);
        assert_eq!(page.prefixes, vec!["photos/2024/".to_owned()]);
    }

    #[test]
    fn test_should_parse_list_uploads_page() {
        let xml = br#"<ListMultipartUploadsResult>
  <IsTruncated>false</IsTruncated>
  <Upload>
    <Key>big.bin</Key>
    <UploadId>VXBsb2FkIElE</UploadId>
    <Initiated>2024-05-01T08:00:00.000Z</Initiated>
  </Upload>
  <Upload>
    <Key>big.bin</Key>
    <UploadId>bGF0ZXIgdXBsb2Fk</UploadId>
    <Initiated>2024-05-02T08:00:00.000Z</Initiated>
  </Upload>
</ListMultipartUploadsResult>"#;

        let page: ListUploadsPage = from_xml(xml).unwrap();
        assert!(!page.is_truncated);
        assert_eq!(page.uploads.len(), 2);
        assert_eq!(page.uploads[1].upload_id, "bGF0ZXIgdXBsb2Fk");
        assert!(page.uploads[0].initiated < page.uploads[1].initiated);
    }

    #[test]
    fn test_should_parse_list_parts_page() {
        let xml = br#"<ListPartsResult>
  <IsTruncated>true</IsTruncated>
  <NextPartNumberMarker>2</NextPartNumberMarker>
  <Part>
    <PartNumber>1</PartNumber>
    <ETag>"79b281060d337b9b2b84ccf390adcf74"</ETag>
    <Size>5242880</Size>
    <LastModified>2024-05-01T08:10:00.000Z</LastModified>
  </Part>
  <Part>
    <PartNumber>2</PartNumber>
    <ETag>"0cc175b9c0f1b6a831c399e269772661"</ETag>
    <Size>5242880</Size>
  </Part>
</ListPartsResult>"#;

        let page: ListPartsPage = from_xml(xml).unwrap();
        assert!(page.is_truncated);
        assert_eq!(page.next_part_number_marker, Some(2));
        assert_eq!(page.parts.len(), 2);
        assert_eq!(page.parts[0].part_number, 1);
        assert_eq!(page.parts[0].etag, "79b281060d337b9b2b84ccf390adcf74");
        assert_eq!(page.parts[1].size, 5_242_880);
    }

    #[test]
    fn test_should_parse_initiate_multipart_result() {
        let xml = br#"<InitiateMultipartUploadResult>
  <Bucket>mybucket</Bucket>
  <Key>big.bin</Key>
  <UploadId>VXBsb2FkIElE</UploadId>
</InitiateMultipartUploadResult>"#;

        let result: InitiateMultipartResult = from_xml(xml).unwrap();
        assert_eq!(result.bucket, "mybucket");
        assert_eq!(result.key, "big.bin");
        assert_eq!(result.upload_id, "VXBsb2FkIElE");
    }

    #[test]
    fn test_should_reject_initiate_result_without_upload_id() {
        let xml = br"<InitiateMultipartUploadResult><Bucket>b</Bucket></InitiateMultipartUploadResult>";
        let result: Result<InitiateMultipartResult, _> = from_xml(xml);
        assert!(matches!(result, Err(XmlError::MissingElement(_))));
    }

    #[test]
    fn test_should_parse_complete_multipart_result() {
        let xml = br#"<CompleteMultipartUploadResult>
  <Location>http://mybucket.s3.amazonaws.com/big.bin</Location>
  <Bucket>mybucket</Bucket>
  <Key>big.bin</Key>
  <ETag>"3858f62230ac3c915f300c664312c11f-9"</ETag>
</CompleteMultipartUploadResult>"#;

        let result: CompleteMultipartResult = from_xml(xml).unwrap();
        assert_eq!(result.etag, "3858f62230ac3c915f300c664312c11f-9");
        assert_eq!(result.key.as_deref(), Some("big.bin"));
    }

    #[test]
    fn test_should_parse_access_control_policy() {
        let xml = br#"<AccessControlPolicy>
  <Owner><ID>abc</ID></Owner>
  <AccessControlList>
    <Grant>
      <Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="CanonicalUser">
        <ID>abc</ID>
      </Grantee>
      <Permission>FULL_CONTROL</Permission>
    </Grant>
    <Grant>
      <Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="Group">
        <URI>http://acs.amazonaws.com/groups/global/AllUsers</URI>
      </Grantee>
      <Permission>READ</Permission>
    </Grant>
  </AccessControlList>
</AccessControlPolicy>"#;

        let policy: AccessControlPolicy = from_xml(xml).unwrap();
        assert_eq!(policy.grants.len(), 2);
        assert_eq!(
            policy.grants[1].grantee_uri.as_deref(),
            Some("http://acs.amazonaws.com/groups/global/AllUsers")
        );
        assert_eq!(
            CannedAcl::from_grants(&policy.grants),
            Some(CannedAcl::PublicRead)
        );
    }

    #[test]
    fn test_should_parse_error_document() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <Resource>/mybucket/missing.txt</Resource>
  <RequestId>4442587FB7D0A2F9</RequestId>
</Error>"#;

        let doc: ErrorDocument = from_xml(xml).unwrap();
        assert_eq!(doc.code, "NoSuchKey");
        assert_eq!(doc.message, "The specified key does not exist.");
        assert_eq!(doc.resource.as_deref(), Some("/mybucket/missing.txt"));
        assert_eq!(doc.request_id.as_deref(), Some("4442587FB7D0A2F9"));
    }

    #[test]
    fn test_should_parse_location_constraint() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<LocationConstraint xmlns="http://s3.amazonaws.com/doc/2006-03-01/">eu-west-1</LocationConstraint>"#;
        assert_eq!(parse_location_constraint(xml).unwrap(), "eu-west-1");
    }

    #[test]
    fn test_should_treat_empty_location_as_us_east_1() {
        assert_eq!(parse_location_constraint(b"").unwrap(), "us-east-1");
        assert_eq!(
            parse_location_constraint(br"<LocationConstraint/>").unwrap(),
            "us-east-1"
        );
        assert_eq!(
            parse_location_constraint(
                br"<LocationConstraint></LocationConstraint>"
            )
            .unwrap(),
            "us-east-1"
        );
    }

    #[test]
    fn test_should_skip_unknown_elements() {
        let xml = br#"<ListBucketResult>
  <FutureField><Nested>x</Nested></FutureField>
  <IsTruncated>false</IsTruncated>
</ListBucketResult>"#;
        let page: ListObjectsPage = from_xml(xml).unwrap();
        assert!(!page.is_truncated);
        assert!(page.objects.is_empty());
    }
}
