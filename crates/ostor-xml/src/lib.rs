//! S3 XML wire documents for ostor.
//!
//! This crate provides the XML layer for the S3 REST protocol, handling
//! conversion between the `ostor-model` types and the XML wire format. S3
//! uses the RestXml protocol with `noErrorWrapping: true`.
//!
//! # Key components
//!
//! - [`S3Serialize`] trait and [`to_xml`] for the request bodies the client
//!   sends (`CreateBucketConfiguration`, `CompleteMultipartUpload`)
//! - [`S3Deserialize`] trait and [`from_xml`] for parsing response documents
//!   (listings, multipart results, ACLs, `<Error>` documents)
//! - [`parse_location_constraint`] for the bucket-region bootstrap response,
//!   which may legitimately be empty
//!
//! # S3 XML conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 format (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, from_xml, parse_location_constraint};
pub use error::XmlError;
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
