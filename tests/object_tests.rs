use object_store_walkthrough::{
    create_in_memory_app, create_temp_file,
    domain::models::{CannedAcl, PutObjectOptions, ServerSideEncryption, StorageClass},
    AppServices, BucketName, ObjectKey, StorageError,
};

async fn two_buckets() -> (AppServices, BucketName, BucketName) {
    let services = create_in_memory_app().await.unwrap();
    let a = services
        .bucket_service
        .create_bucket("firstbucket-")
        .await
        .unwrap()
        .name;
    let b = services
        .bucket_service
        .create_bucket("secondbucket-")
        .await
        .unwrap()
        .name;
    (services, a, b)
}

#[tokio::test]
async fn generated_bucket_names_are_unique() {
    let (_, a, b) = two_buckets().await;
    assert_ne!(a, b);
    assert!((3..=63).contains(&a.as_str().len()));
    assert_eq!(a.as_str().len(), "firstbucket-".len() + 36);
}

#[tokio::test]
async fn upload_copy_delete_leaves_no_object() {
    let (services, a, b) = two_buckets().await;
    let dir = tempfile::tempdir().unwrap();
    let file = create_temp_file(dir.path(), 300, "firstfile.txt", "f")
        .await
        .unwrap();
    let key = ObjectKey::new(file.name.as_str()).unwrap();
    let objects = &services.object_service;

    objects
        .upload_file(&a, &key, file.path(), &PutObjectOptions::default())
        .await
        .unwrap();
    objects.copy_to_bucket(&a, &b, &key).await.unwrap();
    assert_eq!(objects.object_details(&b, &key).await.unwrap().size, 300);

    objects.delete_object(&b, &key).await.unwrap();
    objects.delete_object(&a, &key).await.unwrap();

    assert!(!objects.object_exists(&a, &key).await.unwrap());
    assert!(!objects.object_exists(&b, &key).await.unwrap());
    assert!(matches!(
        objects.download_file(&a, &key, &dir.path().join("out")).await,
        Err(StorageError::ObjectNotFound { .. })
    ));
}

#[tokio::test]
async fn encryption_and_storage_class_are_reported() {
    let (services, a, _) = two_buckets().await;
    let dir = tempfile::tempdir().unwrap();
    let file = create_temp_file(dir.path(), 300, "thirdfile.txt", "t")
        .await
        .unwrap();
    let key = ObjectKey::new(file.name.as_str()).unwrap();
    let objects = &services.object_service;

    let options =
        PutObjectOptions::default().with_server_side_encryption(ServerSideEncryption::Aes256);
    let outcome = objects
        .upload_file(&a, &key, file.path(), &options)
        .await
        .unwrap();
    assert_eq!(outcome.server_side_encryption, Some(ServerSideEncryption::Aes256));
    assert_eq!(
        objects.object_details(&a, &key).await.unwrap().storage_class,
        StorageClass::Standard
    );

    objects
        .upload_file(
            &a,
            &key,
            file.path(),
            &options.with_storage_class(StorageClass::InfrequentAccess),
        )
        .await
        .unwrap();
    let details = objects.object_details(&a, &key).await.unwrap();
    assert_eq!(details.storage_class, StorageClass::InfrequentAccess);
    assert_eq!(details.server_side_encryption, Some(ServerSideEncryption::Aes256));
}

#[tokio::test]
async fn versioned_uploads_create_distinct_versions() {
    let (services, a, _) = two_buckets().await;
    let dir = tempfile::tempdir().unwrap();
    let first = create_temp_file(dir.path(), 300, "firstfile.txt", "f")
        .await
        .unwrap();
    let third = create_temp_file(dir.path(), 300, "thirdfile.txt", "t")
        .await
        .unwrap();
    let key = ObjectKey::new(first.name.as_str()).unwrap();
    let objects = &services.object_service;

    services.bucket_service.enable_versioning(&a).await.unwrap();

    let v1 = objects
        .upload_file(&a, &key, first.path(), &PutObjectOptions::default())
        .await
        .unwrap()
        .version_id
        .unwrap();
    let v2 = objects
        .upload_file(&a, &key, third.path(), &PutObjectOptions::default())
        .await
        .unwrap()
        .version_id
        .unwrap();
    assert_ne!(v1, v2);
    assert_eq!(
        objects.object_details(&a, &key).await.unwrap().version_id,
        Some(v2.clone())
    );

    // Latest content is the third file's
    let out = dir.path().join("latest.txt");
    objects.download_file(&a, &key, &out).await.unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "t".repeat(300));

    let deleted = objects.delete_object(&a, &key).await.unwrap();
    assert!(deleted.delete_marker);
    assert!(!objects.object_exists(&a, &key).await.unwrap());

    let versions = services.bucket_service.list_object_versions(&a).await.unwrap();
    assert_eq!(versions.len(), 3);
    assert!(versions.iter().any(|v| v.version_id == v1 && !v.is_latest));
}

#[tokio::test]
async fn private_upload_has_only_owner_grant() {
    let (services, a, _) = two_buckets().await;
    let dir = tempfile::tempdir().unwrap();
    let file = create_temp_file(dir.path(), 10, "private.txt", "p")
        .await
        .unwrap();
    let key = ObjectKey::new(file.name.as_str()).unwrap();

    services
        .object_service
        .upload_file(
            &a,
            &key,
            file.path(),
            &PutObjectOptions::default().with_acl(CannedAcl::Private),
        )
        .await
        .unwrap();

    let acl = services.object_service.object_acl(&a, &key).await.unwrap();
    assert_eq!(acl.grants.len(), 1);
    assert!(!acl.is_public_read());
}
