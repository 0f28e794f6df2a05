//! Command-line configuration for GeoTIFF Streamer.
//!
//! This module provides the CLI surface:
//! - Subcommands via clap derive (`info`, `tile`)
//! - Environment variables with `GEOTIFF_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `GEOTIFF_FILE` - Local file to read
//! - `GEOTIFF_S3_BUCKET` - S3 bucket name
//! - `GEOTIFF_S3_KEY` - Object key inside the bucket
//! - `GEOTIFF_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `GEOTIFF_S3_REGION` - AWS region (default: us-east-1)
//! - `GEOTIFF_RETRIES` - Retries for transient read errors (default: 3)
//! - `GEOTIFF_RETRY_DELAY_MS` - Initial retry backoff in milliseconds (default: 100)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::io::{RetryPolicy, DEFAULT_MAX_DELAY};

// =============================================================================
// Default Values
// =============================================================================

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default number of retries for transient read errors.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default initial retry backoff in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Upper bound on `--retries`.
pub const MAX_RETRIES: u32 = 10;

// =============================================================================
// CLI Arguments
// =============================================================================

/// GeoTIFF Streamer - Inspect tiled GeoTIFFs and decode single tiles.
///
/// Reads only the byte ranges it needs, from a local file or from S3.
#[derive(Parser, Debug, Clone)]
#[command(name = "geotiff-streamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print header, tags, tile grid and GeoKeys of a raster.
    Info(InfoConfig),

    /// Decode one tile and print its shape and statistics.
    Tile(TileConfig),
}

// =============================================================================
// Source Configuration
// =============================================================================

/// Where to read the raster from.
#[derive(Args, Debug, Clone)]
pub struct SourceConfig {
    /// Local file path.
    #[arg(long, env = "GEOTIFF_FILE", conflicts_with_all = ["s3_bucket", "s3_key"])]
    pub file: Option<PathBuf>,

    /// S3 bucket name.
    #[arg(long, env = "GEOTIFF_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Object key inside the bucket.
    #[arg(long, env = "GEOTIFF_S3_KEY")]
    pub s3_key: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "GEOTIFF_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "GEOTIFF_S3_REGION")]
    pub s3_region: String,

    /// Retries for transient read errors (0 disables retrying).
    #[arg(long, default_value_t = DEFAULT_RETRIES, env = "GEOTIFF_RETRIES")]
    pub retries: u32,

    /// Initial retry backoff in milliseconds, doubled on each attempt.
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS, env = "GEOTIFF_RETRY_DELAY_MS")]
    pub retry_delay_ms: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Resolved source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    S3 { bucket: String, key: String },
}

impl SourceConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.source()?;

        if self.retries > MAX_RETRIES {
            return Err(format!("retries must be at most {}", MAX_RETRIES));
        }
        if self.retries > 0 && self.retry_delay_ms == 0 {
            return Err("retry_delay_ms must be greater than 0 when retrying".to_string());
        }

        Ok(())
    }

    /// Resolve which source was selected.
    pub fn source(&self) -> Result<Source, String> {
        match (&self.file, &self.s3_bucket, &self.s3_key) {
            (Some(path), None, None) => Ok(Source::File(path.clone())),
            (None, Some(bucket), Some(key)) => {
                if bucket.is_empty() || key.is_empty() {
                    return Err("S3 bucket and key must not be empty".to_string());
                }
                Ok(Source::S3 {
                    bucket: bucket.clone(),
                    key: key.clone(),
                })
            }
            (None, Some(_), None) => {
                Err("S3 key is required. Set --s3-key or GEOTIFF_S3_KEY".to_string())
            }
            (None, None, Some(_)) => {
                Err("S3 bucket is required. Set --s3-bucket or GEOTIFF_S3_BUCKET".to_string())
            }
            (None, None, None) => Err(
                "No source given. Set --file, or --s3-bucket and --s3-key".to_string(),
            ),
            _ => Err("Give either --file or --s3-bucket/--s3-key, not both".to_string()),
        }
    }

    /// Retry policy for the selected source.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

// =============================================================================
// Subcommand Configuration
// =============================================================================

/// Options for `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    #[command(flatten)]
    pub source: SourceConfig,

    /// Emit a JSON report instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()
    }
}

/// Options for `tile`.
#[derive(Args, Debug, Clone)]
pub struct TileConfig {
    #[command(flatten)]
    pub source: SourceConfig,

    /// Linear tile index (row-major).
    #[arg(long, conflicts_with_all = ["x", "y"])]
    pub index: Option<usize>,

    /// Tile column.
    #[arg(long, requires = "y")]
    pub x: Option<u32>,

    /// Tile row.
    #[arg(long, requires = "x")]
    pub y: Option<u32>,

    /// Emit a JSON summary instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Which tile to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSelector {
    Index(usize),
    Position { x: u32, y: u32 },
}

impl TileConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()?;
        self.selector().map(|_| ())
    }

    /// Resolve the requested tile.
    pub fn selector(&self) -> Result<TileSelector, String> {
        match (self.index, self.x, self.y) {
            (Some(index), None, None) => Ok(TileSelector::Index(index)),
            (None, Some(x), Some(y)) => Ok(TileSelector::Position { x, y }),
            (None, None, None) => Err("No tile given. Set --index, or --x and --y".to_string()),
            _ => Err("Give either --index or --x/--y".to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
