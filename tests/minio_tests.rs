use bytes::Bytes;
use object_store_walkthrough::{
    adapters::outbound::storage::create_s3_client, BucketName, BucketStore, CreateBucketOptions,
    ObjectKey, ObjectStore, PutObjectOptions, S3Config, S3StorageAdapter, StorageError,
    VersioningStatus,
};

// Note: These tests require MinIO (or another S3-compatible service) configured via:
// - S3_ENDPOINT (default: http://localhost:9000)
// - S3_ACCESS_KEY (default: minioadmin)
// - S3_SECRET_KEY (default: minioadmin)
// - AWS_REGION (default: us-east-1)

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn minio_config() -> S3Config {
    S3Config {
        region: Some(env_or("AWS_REGION", "us-east-1")),
        endpoint: Some(env_or("S3_ENDPOINT", "http://localhost:9000")),
        access_key: Some(env_or("S3_ACCESS_KEY", "minioadmin")),
        secret_key: Some(env_or("S3_SECRET_KEY", "minioadmin")),
        force_path_style: true,
    }
}

async fn minio_adapter() -> (S3StorageAdapter, String) {
    let (client, region) = create_s3_client(&minio_config()).await.unwrap();
    (S3StorageAdapter::new(client), region)
}

#[tokio::test]
#[ignore = "requires MinIO server to be running"]
async fn test_minio_versioned_bucket_lifecycle() {
    let (adapter, region) = minio_adapter().await;
    let bucket = BucketName::generate("walkthrough-it-").unwrap();
    let key = ObjectKey::new("firstfile.txt").unwrap();

    adapter
        .create_bucket(&bucket, &region, &CreateBucketOptions::default())
        .await
        .unwrap();
    assert!(adapter
        .list_buckets()
        .await
        .unwrap()
        .iter()
        .any(|b| b.name == bucket.as_str()));

    let plain = PutObjectOptions::default();
    adapter
        .put_object(&bucket, &key, Bytes::from("f".repeat(300)), &plain)
        .await
        .unwrap();
    let details = adapter.head_object(&bucket, &key).await.unwrap();
    assert_eq!(details.size, 300);

    adapter
        .put_bucket_versioning(&bucket, VersioningStatus::Enabled)
        .await
        .unwrap();
    assert_eq!(
        adapter.get_bucket_versioning(&bucket).await.unwrap(),
        VersioningStatus::Enabled
    );

    let second = adapter
        .put_object(&bucket, &key, Bytes::from("t".repeat(300)), &plain)
        .await
        .unwrap();
    // Service-issued ids are kept verbatim
    let version_id = second.version_id.unwrap();
    assert_eq!(
        adapter.head_object(&bucket, &key).await.unwrap().version_id,
        Some(version_id.clone())
    );
    let data = adapter.get_object(&bucket, &key, Some(&version_id)).await.unwrap();
    assert_eq!(data, Bytes::from("t".repeat(300)));

    let deleted = adapter.delete_object(&bucket, &key).await.unwrap();
    assert!(deleted.delete_marker);

    // Two versions plus the delete marker must all be purged before the bucket can go
    let versions = adapter.list_object_versions(&bucket).await.unwrap();
    assert_eq!(versions.len(), 3);
    assert!(matches!(
        adapter.delete_bucket(&bucket).await,
        Err(StorageError::BucketNotEmpty { .. })
    ));

    let identifiers: Vec<_> = versions.iter().map(|v| v.identifier()).collect();
    let outcome = adapter.delete_objects(&bucket, &identifiers).await.unwrap();
    assert_eq!(outcome.deleted.len(), 3);
    assert!(outcome.errors.is_empty());

    adapter.delete_bucket(&bucket).await.unwrap();
}

#[tokio::test]
#[ignore = "requires MinIO server to be running"]
async fn test_minio_not_found_errors_name_the_missing_resource() {
    let (adapter, region) = minio_adapter().await;
    let bucket = BucketName::generate("walkthrough-it-").unwrap();
    let missing_bucket = BucketName::generate("walkthrough-gone-").unwrap();
    let key = ObjectKey::new("thirdfile.txt").unwrap();

    adapter
        .create_bucket(&bucket, &region, &CreateBucketOptions::default())
        .await
        .unwrap();

    // HEAD answers a bare 404 for both cases
    assert!(matches!(
        adapter.head_object(&bucket, &key).await,
        Err(StorageError::ObjectNotFound { .. })
    ));
    match adapter.head_object(&missing_bucket, &key).await {
        Err(StorageError::BucketNotFound { bucket: b }) => assert_eq!(b, missing_bucket),
        other => panic!("unexpected result: {other:?}"),
    }

    adapter
        .put_object(&bucket, &key, Bytes::from("t"), &PutObjectOptions::default())
        .await
        .unwrap();
    match adapter
        .copy_object(&bucket, &key, &missing_bucket, &key)
        .await
    {
        Err(StorageError::BucketNotFound { bucket: b }) => assert_eq!(b, missing_bucket),
        other => panic!("unexpected result: {other:?}"),
    }

    adapter.delete_object(&bucket, &key).await.unwrap();
    adapter.delete_bucket(&bucket).await.unwrap();
}
