//! Façade operations against the scripted transport: bucket CRUD, ACLs,
//! listings with pagination, downloads, presigning, and error translation.

mod common;

use futures::TryStreamExt;

use common::{MockResponse, MockTransport, error_xml, play_client};
use ostor_client::{CannedAcl, ClientError, ListEntry, UploadEntry};

#[tokio::test]
async fn test_should_list_buckets() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/");
        MockResponse::xml(
            200,
            "<ListAllMyBucketsResult><Owner><ID>me</ID></Owner><Buckets>\
             <Bucket><Name>alpha</Name><CreationDate>2024-01-01T00:00:00.000Z</CreationDate></Bucket>\
             <Bucket><Name>beta</Name><CreationDate>2024-02-01T00:00:00.000Z</CreationDate></Bucket>\
             </Buckets></ListAllMyBucketsResult>",
        )
    });
    let client = play_client(transport);

    let buckets = client.list_buckets().await.unwrap();
    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_should_rewrite_temporary_redirect_on_list_buckets_to_access_denied() {
    let transport =
        MockTransport::new(|_| MockResponse::xml(307, &error_xml("TemporaryRedirect", "moved")));
    let client = play_client(transport);

    let err = client.list_buckets().await.unwrap_err();
    assert!(matches!(err, ClientError::AccessDenied));
}

#[tokio::test]
async fn test_should_create_bucket_with_region_and_acl() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.method, "PUT");
        assert_eq!(req.path, "/eu-bucket");
        assert_eq!(req.header("x-amz-acl").unwrap(), "public-read");
        let body = String::from_utf8(req.body.clone()).unwrap();
        assert!(body.contains("<LocationConstraint>eu-west-1</LocationConstraint>"));
        MockResponse::new(200)
    });
    let client = play_client(transport.clone());

    client
        .make_bucket("eu-bucket", Some(CannedAcl::PublicRead), Some("eu-west-1"))
        .await
        .unwrap();
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_should_omit_location_body_for_default_region() {
    let transport = MockTransport::new(|req| {
        assert!(req.body.is_empty(), "us-east-1 creation sends no body");
        MockResponse::new(200)
    });
    let client = play_client(transport);
    client.make_bucket("plain-bucket", None, None).await.unwrap();
}

#[tokio::test]
async fn test_should_answer_bucket_exists() {
    let transport = MockTransport::new(|req| {
        if req.path == "/there" {
            MockResponse::new(200)
        } else {
            // HEAD answers carry no body.
            MockResponse::new(404)
        }
    });
    let client = play_client(transport);

    assert!(client.bucket_exists("there").await.unwrap());
    assert!(!client.bucket_exists("gone").await.unwrap());
}

#[tokio::test]
async fn test_should_classify_bucket_acl() {
    let transport = MockTransport::new(|req| {
        assert!(req.query_has("acl"));
        MockResponse::xml(
            200,
            "<AccessControlPolicy><AccessControlList>\
             <Grant><Grantee><URI>http://acs.amazonaws.com/groups/global/AllUsers</URI></Grantee>\
             <Permission>READ</Permission></Grant>\
             </AccessControlList></AccessControlPolicy>",
        )
    });
    let client = play_client(transport);

    let acl = client.get_bucket_acl("mybucket").await.unwrap();
    assert_eq!(acl, CannedAcl::PublicRead);
}

#[tokio::test]
async fn test_should_reject_write_only_acl_as_unsupported() {
    let transport = MockTransport::new(|_| {
        MockResponse::xml(
            200,
            "<AccessControlPolicy><AccessControlList>\
             <Grant><Grantee><URI>http://acs.amazonaws.com/groups/global/AllUsers</URI></Grantee>\
             <Permission>WRITE</Permission></Grant>\
             </AccessControlList></AccessControlPolicy>",
        )
    });
    let client = play_client(transport);

    let err = client.get_bucket_acl("mybucket").await.unwrap_err();
    assert!(matches!(err, ClientError::UnsupportedAcl { .. }));
}

#[tokio::test]
async fn test_should_set_canned_acl_via_header() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.method, "PUT");
        assert!(req.query_has("acl"));
        assert_eq!(req.header("x-amz-acl").unwrap(), "private");
        MockResponse::new(200)
    });
    let client = play_client(transport);
    client.set_bucket_acl("mybucket", CannedAcl::Private).await.unwrap();
}

#[tokio::test]
async fn test_should_paginate_object_listing_lazily() {
    let transport = MockTransport::new(|req| {
        // Query values travel percent-escaped.
        assert_eq!(req.query_param("prefix"), Some("logs%2F"));
        match req.query_param("marker") {
            None => MockResponse::xml(
                200,
                "<ListBucketResult><IsTruncated>true</IsTruncated>\
                 <NextMarker>logs/b</NextMarker>\
                 <Contents><Key>logs/a</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
                 <ETag>\"e1\"</ETag><Size>1</Size></Contents>\
                 <Contents><Key>logs/b</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
                 <ETag>\"e2\"</ETag><Size>2</Size></Contents>\
                 </ListBucketResult>",
            ),
            Some("logs%2Fb") => MockResponse::xml(
                200,
                "<ListBucketResult><IsTruncated>false</IsTruncated>\
                 <Contents><Key>logs/c</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
                 <ETag>\"e3\"</ETag><Size>3</Size></Contents>\
                 </ListBucketResult>",
            ),
            other => panic!("unexpected marker {other:?}"),
        }
    });
    let client = play_client(transport.clone());

    let entries: Vec<ListEntry> = client
        .list_objects("mybucket", Some("logs/"), true)
        .try_collect()
        .await
        .unwrap();

    let keys: Vec<&str> = entries
        .iter()
        .map(|e| match e {
            ListEntry::Object(o) => o.key.as_str(),
            ListEntry::Prefix(p) => p.as_str(),
        })
        .collect();
    assert_eq!(keys, vec!["logs/a", "logs/b", "logs/c"]);
    assert_eq!(transport.requests().len(), 2, "one request per page");
}

#[tokio::test]
async fn test_should_interleave_prefixes_in_non_recursive_listing() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.query_param("delimiter"), Some("%2F"));
        MockResponse::xml(
            200,
            "<ListBucketResult><IsTruncated>false</IsTruncated>\
             <Contents><Key>top.txt</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
             <ETag>\"e\"</ETag><Size>9</Size></Contents>\
             <CommonPrefixes><Prefix>dir/</Prefix></CommonPrefixes>\
             </ListBucketResult>",
        )
    });
    let client = play_client(transport);

    let entries: Vec<ListEntry> = client
        .list_objects("mybucket", None, false)
        .try_collect()
        .await
        .unwrap();
    assert!(matches!(&entries[0], ListEntry::Object(o) if o.key == "top.txt"));
    assert!(matches!(&entries[1], ListEntry::Prefix(p) if p == "dir/"));
}

#[tokio::test]
async fn test_should_stop_listing_on_error_page() {
    let transport = MockTransport::new(|req| match req.query_param("marker") {
        None => MockResponse::xml(
            200,
            "<ListBucketResult><IsTruncated>true</IsTruncated>\
             <NextMarker>m</NextMarker>\
             <Contents><Key>one</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
             <ETag>\"e\"</ETag><Size>1</Size></Contents>\
             </ListBucketResult>",
        ),
        Some(_) => MockResponse::xml(500, &error_xml("InternalError", "boom")),
    });
    let client = play_client(transport);

    let result: Result<Vec<ListEntry>, ClientError> =
        client.list_objects("mybucket", None, true).try_collect().await;
    assert!(matches!(result, Err(ClientError::Server(ref s)) if s.code == "InternalError"));
}

#[tokio::test]
async fn test_should_translate_error_document_with_context() {
    let transport =
        MockTransport::new(|_| MockResponse::xml(404, &error_xml("NoSuchKey", "not here")));
    let client = play_client(transport);

    let err = client.get_object("mybucket", "missing.txt").await.unwrap_err();
    match err {
        ClientError::Server(server) => {
            assert_eq!(server.code, "NoSuchKey");
            assert_eq!(server.status, 404);
            assert_eq!(server.bucket.as_deref(), Some("mybucket"));
            assert_eq!(server.key.as_deref(), Some("missing.txt"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_should_download_object_body() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.path, "/mybucket/data.bin");
        MockResponse::new(200)
            .header("content-length", "5")
            .header("etag", "\"tag\"")
            .header("content-type", "application/octet-stream")
            .body(b"hello".to_vec())
    });
    let client = play_client(transport);

    let body = client.get_object("mybucket", "data.bin").await.unwrap();
    assert_eq!(body.size, Some(5));
    assert_eq!(body.etag.as_deref(), Some("tag"));
    let bytes = body.bytes().await.unwrap();
    assert_eq!(bytes.as_ref(), b"hello");
}

#[tokio::test]
async fn test_should_send_range_for_partial_reads() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.header("range").unwrap(), "bytes=10-19");
        MockResponse::new(206).body(b"0123456789".to_vec())
    });
    let client = play_client(transport);

    let body = client
        .get_partial_object("mybucket", "data.bin", 10, 10)
        .await
        .unwrap();
    assert_eq!(body.bytes().await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_should_clamp_range_end_for_extreme_offsets() {
    let transport = MockTransport::new(|req| {
        assert_eq!(
            req.header("range").unwrap(),
            format!("bytes={}-{}", u64::MAX - 1, u64::MAX)
        );
        MockResponse::new(206).body(b"xy".to_vec())
    });
    let client = play_client(transport);

    client
        .get_partial_object("mybucket", "data.bin", u64::MAX - 1, u64::MAX)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_should_send_open_ended_range_for_zero_length() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.header("range").unwrap(), "bytes=100-");
        MockResponse::new(206).body(b"tail".to_vec())
    });
    let client = play_client(transport);

    client
        .get_partial_object("mybucket", "data.bin", 100, 0)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_should_remove_object() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.method, "DELETE");
        assert_eq!(req.path, "/mybucket/old.txt");
        MockResponse::new(204)
    });
    let client = play_client(transport);
    client.remove_object("mybucket", "old.txt").await.unwrap();
}

#[tokio::test]
async fn test_should_list_incomplete_uploads() {
    let transport = MockTransport::new(|req| {
        assert!(req.query_has("uploads"));
        MockResponse::xml(
            200,
            "<ListMultipartUploadsResult><IsTruncated>false</IsTruncated>\
             <Upload><Key>a.bin</Key><UploadId>u1</UploadId>\
             <Initiated>2024-05-01T00:00:00.000Z</Initiated></Upload>\
             <CommonPrefixes><Prefix>dir/</Prefix></CommonPrefixes>\
             </ListMultipartUploadsResult>",
        )
    });
    let client = play_client(transport);

    let entries: Vec<UploadEntry> = client
        .list_incomplete_uploads("mybucket", None, false)
        .try_collect()
        .await
        .unwrap();
    assert!(matches!(&entries[0], UploadEntry::Upload(u) if u.upload_id == "u1"));
    assert!(matches!(&entries[1], UploadEntry::Prefix(p) if p == "dir/"));
}

#[tokio::test]
async fn test_should_abort_latest_incomplete_upload() {
    let transport = MockTransport::new(|req| {
        if req.method == "GET" {
            // Two uploads for the key; the later initiation must win.
            MockResponse::xml(
                200,
                "<ListMultipartUploadsResult><IsTruncated>false</IsTruncated>\
                 <Upload><Key>big.bin</Key><UploadId>older</UploadId>\
                 <Initiated>2024-05-01T00:00:00.000Z</Initiated></Upload>\
                 <Upload><Key>big.bin</Key><UploadId>newer</UploadId>\
                 <Initiated>2024-05-02T00:00:00.000Z</Initiated></Upload>\
                 </ListMultipartUploadsResult>",
            )
        } else {
            assert_eq!(req.method, "DELETE");
            assert_eq!(req.query_param("uploadId"), Some("newer"));
            MockResponse::new(204)
        }
    });
    let client = play_client(transport.clone());

    client.remove_incomplete_upload("mybucket", "big.bin").await.unwrap();
    assert!(transport.requests().iter().any(|r| r.method == "DELETE"));
}

#[tokio::test]
async fn test_should_treat_missing_upload_as_noop_on_abort() {
    let transport = MockTransport::new(|req| {
        assert_eq!(req.method, "GET", "only the listing is expected");
        MockResponse::xml(
            200,
            "<ListMultipartUploadsResult><IsTruncated>false</IsTruncated></ListMultipartUploadsResult>",
        )
    });
    let client = play_client(transport.clone());

    client.remove_incomplete_upload("mybucket", "none.bin").await.unwrap();
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_should_mint_presigned_get_url() {
    // No network involved for a path-style endpoint.
    let transport = MockTransport::new(|_| panic!("presigning must not touch the wire"));
    let client = play_client(transport);

    let url = client
        .presigned_get_object("mybucket", "some key.txt", 3600)
        .await
        .unwrap();

    assert!(url.starts_with("http://play.example.com:9000/mybucket/some%20key.txt?"));
    assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
    assert!(url.contains("X-Amz-Expires=3600"));
    assert!(url.contains("X-Amz-SignedHeaders=host"));
    assert!(url.contains("X-Amz-Signature="));
}

#[tokio::test]
async fn test_should_build_post_policy_form_data() {
    let transport = MockTransport::new(|_| panic!("policy signing must not touch the wire"));
    let client = play_client(transport);

    let mut policy = ostor_client::PostPolicy::new();
    policy.set_expires(chrono::Utc::now() + chrono::Duration::hours(1));
    policy.set_bucket("mybucket").unwrap();
    policy.set_key_starts_with("uploads/").unwrap();
    policy.set_content_type("image/png");

    let form = client.presigned_post_policy(policy).await.unwrap();

    assert_eq!(form.get("bucket").unwrap(), "mybucket");
    assert_eq!(form.get("key").unwrap(), "uploads/");
    assert_eq!(form.get("Content-Type").unwrap(), "image/png");
    assert_eq!(form.get("x-amz-algorithm").unwrap(), "AWS4-HMAC-SHA256");
    assert!(form.get("x-amz-credential").unwrap().ends_with("/s3/aws4_request"));
    assert!(form.contains_key("x-amz-date"));
    assert_eq!(form.get("x-amz-signature").unwrap().len(), 64);

    // The policy document round-trips through base64 and names the bucket.
    use base64::Engine;
    let doc = base64::engine::general_purpose::STANDARD
        .decode(form.get("policy").unwrap())
        .unwrap();
    let doc = String::from_utf8(doc).unwrap();
    assert!(doc.contains("\"$bucket\",\"mybucket\""));
    assert!(doc.contains("starts-with"));
}

#[tokio::test]
async fn test_should_reject_expired_post_policy() {
    let transport = MockTransport::new(|_| panic!("no wire expected"));
    let client = play_client(transport);

    let mut policy = ostor_client::PostPolicy::new();
    policy.set_expires(chrono::Utc::now() - chrono::Duration::hours(1));
    policy.set_bucket("mybucket").unwrap();
    policy.set_key("k").unwrap();

    let err = client.presigned_post_policy(policy).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Sign(ostor_auth::SignError::ExpiredPolicy)
    ));
}
