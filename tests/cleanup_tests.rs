use bytes::Bytes;
use object_store_walkthrough::{
    domain::models::{CreateBucketOptions, ObjectOwnership, PutObjectOptions},
    BucketName, BucketService, BucketServiceImpl, BucketStore, InMemoryStorageAdapter, ObjectKey,
    ObjectStore, StorageError,
};
use std::sync::Arc;

async fn versioned_bucket_with_history(
    adapter: &Arc<InMemoryStorageAdapter>,
    service: &BucketServiceImpl,
) -> BucketName {
    let bucket = service.create_bucket("history-").await.unwrap().name;
    service.enable_versioning(&bucket).await.unwrap();

    let key = ObjectKey::new("doc.txt").unwrap();
    for body in ["one", "two", "three"] {
        adapter
            .put_object(&bucket, &key, Bytes::from(body), &PutObjectOptions::default())
            .await
            .unwrap();
    }
    adapter.delete_object(&bucket, &key).await.unwrap();
    bucket
}

fn service(adapter: &Arc<InMemoryStorageAdapter>) -> BucketServiceImpl {
    BucketServiceImpl::new(adapter.clone(), "us-east-1").with_create_options(CreateBucketOptions {
        object_ownership: Some(ObjectOwnership::ObjectWriter),
    })
}

#[tokio::test]
async fn non_empty_bucket_cannot_be_deleted() {
    let adapter = Arc::new(InMemoryStorageAdapter::new());
    let service = service(&adapter);
    let bucket = versioned_bucket_with_history(&adapter, &service).await;

    // Only a delete marker is current, but three versions remain
    assert!(adapter.list_objects(&bucket).await.unwrap().is_empty());
    assert!(matches!(
        service.delete_bucket(&bucket).await,
        Err(StorageError::BucketNotEmpty { .. })
    ));
}

#[tokio::test]
async fn delete_all_objects_removes_versions_and_markers() {
    let adapter = Arc::new(InMemoryStorageAdapter::new());
    let service = service(&adapter);
    let bucket = versioned_bucket_with_history(&adapter, &service).await;

    let versions = service.list_object_versions(&bucket).await.unwrap();
    assert_eq!(versions.len(), 4);
    assert_eq!(versions.iter().filter(|v| v.is_delete_marker).count(), 1);

    let summary = service.delete_all_objects(&bucket).await.unwrap();
    assert_eq!(summary.listed, 4);
    assert_eq!(summary.deleted, 4);
    assert_eq!(summary.batches, 1);

    assert!(adapter.list_object_versions(&bucket).await.unwrap().is_empty());
    service.delete_bucket(&bucket).await.unwrap();
}

#[tokio::test]
async fn cleanup_is_best_effort_across_buckets() {
    let adapter = Arc::new(InMemoryStorageAdapter::new());
    let service = service(&adapter);

    let first = versioned_bucket_with_history(&adapter, &service).await;
    let gone = BucketName::new("already-deleted-bucket").unwrap();
    let last = service.create_bucket("last-").await.unwrap().name;

    let report = service
        .cleanup(&[first.clone(), gone.clone(), last.clone()])
        .await;

    assert_eq!(report.buckets.len(), 3);
    assert!(report.buckets[0].deleted);
    assert_eq!(report.buckets[0].purge.as_ref().unwrap().deleted, 4);
    assert!(!report.buckets[1].deleted);
    assert!(report.buckets[1].delete_error.is_some());
    assert!(report.buckets[2].deleted);

    assert!(adapter.list_buckets().await.unwrap().is_empty());
}

#[tokio::test]
async fn cleanup_of_nothing_is_empty_report() {
    let adapter = Arc::new(InMemoryStorageAdapter::new());
    let report = service(&adapter).cleanup(&[]).await;

    assert!(report.buckets.is_empty());
    assert!(report.all_deleted());
}
