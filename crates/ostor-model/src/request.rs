//! Request payload documents.
//!
//! The two XML bodies the client sends: bucket creation with an explicit
//! region, and multipart completion.

use crate::types::CompletedPart;

/// Body of `PUT /{bucket}` when creating a bucket outside `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBucketConfiguration {
    /// The region the bucket should be created in.
    pub location_constraint: String,
}

/// Body of `POST /{bucket}/{key}?uploadId=…`: the assembled part list.
///
/// Parts must be in ascending part-number order; the orchestrator builds the
/// list that way and [`CompleteMultipartUpload::new`] keeps the invariant by
/// sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUpload {
    /// The parts, ascending by part number.
    pub parts: Vec<CompletedPart>,
}

impl CompleteMultipartUpload {
    /// Build a completion payload, sorting parts by part number.
    #[must_use]
    pub fn new(mut parts: Vec<CompletedPart>) -> Self {
        parts.sort_by_key(|p| p.part_number);
        Self { parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_sort_parts_ascending() {
        let upload = CompleteMultipartUpload::new(vec![
            CompletedPart {
                part_number: 3,
                etag: "c".to_owned(),
            },
            CompletedPart {
                part_number: 1,
                etag: "a".to_owned(),
            },
            CompletedPart {
                part_number: 2,
                etag: "b".to_owned(),
            },
        ]);
        let numbers: Vec<u16> = upload.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
