//! S3 XML serialization: converting request payloads to S3-compatible XML.
//!
//! This module provides the [`S3Serialize`] trait and implementations for the
//! request bodies the client sends, following the AWS S3 RestXml protocol
//! conventions:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use ostor_model::request::{CompleteMultipartUpload, CreateBucketConfiguration};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Trait for serializing S3 types to XML.
///
/// Implementors write their content as child elements inside the current XML
/// context. The root element name and namespace are handled by the top-level
/// [`to_xml`] function.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require
/// `io::Result<()>`.
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as S3-compatible XML with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

impl S3Serialize for CreateBucketConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "LocationConstraint", &self.location_constraint)
    }
}

impl S3Serialize for CompleteMultipartUpload {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for part in &self.parts {
            writer.create_element("Part").write_inner_content(|w| {
                write_text_element(w, "PartNumber", &part.part_number.to_string())?;
                // ETags travel quoted on the wire.
                write_text_element(w, "ETag", &format!("\"{}\"", part.etag))?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ostor_model::types::CompletedPart;

    use super::*;

    #[test]
    fn test_should_serialize_create_bucket_configuration() {
        let config = CreateBucketConfiguration {
            location_constraint: "eu-west-1".to_owned(),
        };
        let xml = to_xml("CreateBucketConfiguration", &config).unwrap();
        let xml_str = std::str::from_utf8(&xml).unwrap();

        assert!(xml_str.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml_str.contains(
            "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
        ));
        assert!(xml_str.contains("<LocationConstraint>eu-west-1</LocationConstraint>"));
    }

    #[test]
    fn test_should_serialize_complete_multipart_upload_in_order() {
        let upload = CompleteMultipartUpload::new(vec![
            CompletedPart {
                part_number: 2,
                etag: "bbb".to_owned(),
            },
            CompletedPart {
                part_number: 1,
                etag: "aaa".to_owned(),
            },
        ]);
        let xml = to_xml("CompleteMultipartUpload", &upload).unwrap();
        let xml_str = std::str::from_utf8(&xml).unwrap();

        let first = xml_str.find("<PartNumber>1</PartNumber>").unwrap();
        let second = xml_str.find("<PartNumber>2</PartNumber>").unwrap();
        assert!(first < second);
        assert!(xml_str.contains("<ETag>&quot;aaa&quot;</ETag>"));
    }
}
