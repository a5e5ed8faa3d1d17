use anyhow::{Context, Result};
use clap::Parser;
use object_store_walkthrough::{
    app::{init_logging, AppBuilder, BackendArgs},
    services::{CleanupScope, WalkthroughConfig, WalkthroughReport},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "walkthrough")]
#[command(about = "Tour of the S3 bucket and object API, cleaning up after itself", long_about = None)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// Directory for the generated local files
    #[arg(long, env = "WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Leave the generated local files in place
    #[arg(long)]
    keep_files: bool,

    /// Buckets removed at the end: created or prefixed
    #[arg(long, env = "CLEANUP_SCOPE", default_value = "created")]
    cleanup_scope: String,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_walkthrough_config(&self) -> Result<WalkthroughConfig> {
        let cleanup_scope: CleanupScope = self
            .cleanup_scope
            .parse()
            .context("Invalid --cleanup-scope")?;

        let work_dir = match &self.work_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to resolve working directory")?,
        };

        Ok(WalkthroughConfig::builder()
            .work_dir(work_dir)
            .keep_files(self.keep_files)
            .cleanup_scope(cleanup_scope)
            .build())
    }
}

fn print_summary(report: &WalkthroughReport) {
    println!("{} {}", report.first_bucket, report.region);
    println!("{} {}", report.second_bucket, report.region);
    println!(
        "{} exists after delete: first bucket {}, second bucket {}",
        report.after_delete.key,
        report.after_delete.in_first_bucket,
        report.after_delete.in_second_bucket
    );
    for grant in &report.public_object_acl.grants {
        println!("{:?} {}", grant.grantee, grant.permission.as_str());
    }
    match report.server_side_encryption {
        Some(sse) => println!("{}", sse),
        None => println!("no server-side encryption"),
    }
    println!("{}", report.storage_class);
    println!("{}", report.versioning_status);
    if let Some(version_id) = &report.latest_version_id {
        println!("latest version of {}: {}", report.after_delete.key, version_id);
    }
    for bucket in &report.buckets {
        println!("{}", bucket.name);
    }
    for object in &report.objects {
        println!(
            "{} {} {:?} {:?} {:?}",
            object.key,
            object.storage_class,
            object.last_modified,
            object.version_id,
            object.metadata
        );
    }
    for failure in report.cleanup.failures() {
        println!(
            "cleanup failed for {}: {}",
            failure.bucket,
            failure
                .delete_error
                .as_deref()
                .or(failure.purge_error.as_deref())
                .unwrap_or("unknown error")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    info!("Storage backend: {}", cli.backend.backend);

    let app_config = cli.backend.to_app_config()?;
    let walkthrough_config = cli.to_walkthrough_config()?;

    let app = AppBuilder::new()
        .with_config(app_config)
        .build()
        .await
        .context("Failed to build application")?;

    let report = app
        .walkthrough(walkthrough_config)
        .run()
        .await
        .context("Walkthrough failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if !report.cleanup.all_deleted() {
        anyhow::bail!("Some buckets could not be cleaned up");
    }

    Ok(())
}
