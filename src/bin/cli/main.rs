use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use object_store_walkthrough::{
    app::{init_logging, AppBuilder, BackendArgs},
    domain::{
        models::{CannedAcl, PutObjectOptions, ServerSideEncryption, StorageClass},
        value_objects::{BucketName, ObjectKey},
    },
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "object-store-cli")]
#[command(about = "Run single bucket and object operations against S3 or the in-memory backend", long_about = None)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a bucket named <prefix><uuid>
    CreateBucket {
        /// Bucket name prefix
        prefix: String,
    },

    /// Delete an empty bucket
    DeleteBucket { bucket: String },

    /// List all buckets
    ListBuckets,

    /// Upload a file
    Put {
        bucket: String,
        /// File path to upload
        file: PathBuf,
        /// Object key, defaults to the file name
        #[arg(short, long)]
        key: Option<String>,
        /// Canned ACL, e.g. public-read
        #[arg(long)]
        acl: Option<String>,
        /// Server-side encryption: AES256 or aws:kms
        #[arg(long)]
        sse: Option<String>,
        /// Storage class, e.g. STANDARD_IA
        #[arg(long)]
        storage_class: Option<String>,
    },

    /// Download an object
    Get {
        bucket: String,
        key: String,
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Copy an object to another bucket under the same key
    Copy {
        from: String,
        to: String,
        key: String,
    },

    /// Delete an object
    Delete { bucket: String, key: String },

    /// Show the ACL grants of an object
    Acl { bucket: String, key: String },

    /// Show object attributes
    Head { bucket: String, key: String },

    /// List objects with version id and metadata
    List { bucket: String },

    /// Manage bucket versioning
    Versioning {
        #[command(subcommand)]
        command: VersioningCommands,
    },

    /// List every object version and delete marker
    Versions { bucket: String },

    /// Delete every object version in a bucket
    Purge {
        bucket: String,
        /// Also delete the bucket afterwards
        #[arg(long)]
        delete_bucket: bool,
    },
}

#[derive(Subcommand, Debug)]
enum VersioningCommands {
    /// Enable versioning
    Enable { bucket: String },

    /// Show the versioning status
    Status { bucket: String },
}

fn bucket(name: &str) -> Result<BucketName> {
    BucketName::new(name).with_context(|| format!("Invalid bucket name: {}", name))
}

fn key(name: &str) -> Result<ObjectKey> {
    ObjectKey::new(name).with_context(|| format!("Invalid object key: {}", name))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn put_options(
    acl: Option<&str>,
    sse: Option<&str>,
    storage_class: Option<&str>,
) -> Result<PutObjectOptions> {
    let mut options = PutObjectOptions::default();
    if let Some(acl) = acl {
        options = options.with_acl(acl.parse::<CannedAcl>()?);
    }
    if let Some(sse) = sse {
        options = options.with_server_side_encryption(sse.parse::<ServerSideEncryption>()?);
    }
    if let Some(class) = storage_class {
        options = options.with_storage_class(class.parse::<StorageClass>()?);
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let app = AppBuilder::new()
        .with_config(cli.backend.to_app_config()?)
        .build()
        .await
        .context("Failed to build application")?;
    let buckets = &app.bucket_service;
    let objects = &app.object_service;

    match cli.command {
        Commands::CreateBucket { prefix } => print_json(&buckets.create_bucket(&prefix).await?)?,
        Commands::DeleteBucket { bucket: name } => {
            buckets.delete_bucket(&bucket(&name)?).await?;
        }
        Commands::ListBuckets => print_json(&buckets.list_buckets().await?)?,
        Commands::Put {
            bucket: name,
            file,
            key: object_key,
            acl,
            sse,
            storage_class,
        } => {
            let object_key = match object_key {
                Some(k) => k,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .context("Cannot derive an object key from the file path")?,
            };
            let options = put_options(acl.as_deref(), sse.as_deref(), storage_class.as_deref())?;
            let outcome = objects
                .upload_file(&bucket(&name)?, &key(&object_key)?, &file, &options)
                .await?;
            print_json(&outcome)?;
        }
        Commands::Get {
            bucket: name,
            key: object_key,
            output,
        } => {
            let written = objects
                .download_file(&bucket(&name)?, &key(&object_key)?, &output)
                .await?;
            println!("{} bytes written to {}", written, output.display());
        }
        Commands::Copy {
            from,
            to,
            key: object_key,
        } => {
            let outcome = objects
                .copy_to_bucket(&bucket(&from)?, &bucket(&to)?, &key(&object_key)?)
                .await?;
            print_json(&outcome)?;
        }
        Commands::Delete {
            bucket: name,
            key: object_key,
        } => print_json(
            &objects
                .delete_object(&bucket(&name)?, &key(&object_key)?)
                .await?,
        )?,
        Commands::Acl {
            bucket: name,
            key: object_key,
        } => print_json(&objects.object_acl(&bucket(&name)?, &key(&object_key)?).await?)?,
        Commands::Head {
            bucket: name,
            key: object_key,
        } => print_json(
            &objects
                .object_details(&bucket(&name)?, &key(&object_key)?)
                .await?,
        )?,
        Commands::List { bucket: name } => {
            print_json(&objects.describe_objects(&bucket(&name)?).await?)?
        }
        Commands::Versioning { command } => match command {
            VersioningCommands::Enable { bucket: name } => {
                println!("{}", buckets.enable_versioning(&bucket(&name)?).await?)
            }
            VersioningCommands::Status { bucket: name } => {
                println!("{}", buckets.versioning_status(&bucket(&name)?).await?)
            }
        },
        Commands::Versions { bucket: name } => {
            print_json(&buckets.list_object_versions(&bucket(&name)?).await?)?
        }
        Commands::Purge {
            bucket: name,
            delete_bucket,
        } => {
            let name = bucket(&name)?;
            print_json(&buckets.delete_all_objects(&name).await?)?;
            if delete_bucket {
                buckets.delete_bucket(&name).await?;
            }
        }
    }

    Ok(())
}
