//! GeoTIFF Streamer - Inspect tiled GeoTIFFs and decode single tiles.
//!
//! This binary opens a raster from a local file or S3 and prints either its
//! structure (`info`) or one decoded tile (`tile`).

use std::process::ExitCode;

use async_trait::async_trait;
use bytes::Bytes;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geotiff_streamer::{
    config::{Cli, Command, InfoConfig, Source, SourceConfig, TileConfig, TileSelector},
    create_s3_client, FileRangeReader, IoError, RangeReader, RetryReader, S3RangeReader,
    SampleStats, SampleType, TiffError, TiledRaster,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Info(config) => run_info(config).await,
        Command::Tile(config) => run_tile(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "geotiff_streamer=debug"
    } else {
        "geotiff_streamer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Source
// =============================================================================

/// Reader for whichever source was selected on the command line.
enum SourceReader {
    File(RetryReader<FileRangeReader>),
    S3(RetryReader<S3RangeReader>),
}

#[async_trait]
impl RangeReader for SourceReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        match self {
            SourceReader::File(r) => r.read_exact_at(offset, len).await,
            SourceReader::S3(r) => r.read_exact_at(offset, len).await,
        }
    }

    fn size(&self) -> u64 {
        match self {
            SourceReader::File(r) => r.size(),
            SourceReader::S3(r) => r.size(),
        }
    }

    fn identifier(&self) -> &str {
        match self {
            SourceReader::File(r) => r.identifier(),
            SourceReader::S3(r) => r.identifier(),
        }
    }
}

async fn open_source(config: &SourceConfig) -> Result<SourceReader, String> {
    let policy = config.retry_policy();

    match config.source()? {
        Source::File(path) => {
            let reader = FileRangeReader::open(&path)
                .await
                .map_err(|e| e.to_string())?;
            Ok(SourceReader::File(RetryReader::with_policy(reader, policy)))
        }
        Source::S3 { bucket, key } => {
            if let Some(ref endpoint) = config.s3_endpoint {
                info!("S3 endpoint: {}", endpoint);
            }
            let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
            let reader = S3RangeReader::new(client, bucket, key)
                .await
                .map_err(|e| e.to_string())?;
            Ok(SourceReader::S3(RetryReader::with_policy(reader, policy)))
        }
    }
}

/// Validate, set up logging and open the source; `None` after reporting a failure.
async fn prepare(source: &SourceConfig, validation: Result<(), String>) -> Option<SourceReader> {
    init_logging(source.verbose);

    if let Err(e) = validation {
        error!("Configuration error: {}", e);
        return None;
    }

    match open_source(source).await {
        Ok(reader) => Some(reader),
        Err(e) => {
            error!("Failed to open source: {}", e);
            None
        }
    }
}

fn report_tiff_error(context: &str, e: &TiffError) {
    error!(kind = ?e.kind(), "{}: {}", context, e);
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

#[derive(Serialize)]
struct InfoReport {
    resource: String,
    size: u64,
    byte_order: &'static str,
    first_ifd_offset: u32,
    tags: Vec<TagReport>,
    grid: GridReport,
    epsg: Option<u16>,
    geo_keys: Vec<GeoKeyReport>,
}

#[derive(Serialize)]
struct TagReport {
    id: u16,
    name: Option<&'static str>,
    field_type: &'static str,
    count: u32,
    value: String,
    value_name: Option<&'static str>,
}

#[derive(Serialize)]
struct GridReport {
    image_width: u32,
    image_length: u32,
    tile_width: u32,
    tile_length: u32,
    tiles_across: u32,
    tiles_down: u32,
    tile_count: u64,
}

#[derive(Serialize)]
struct GeoKeyReport {
    id: u16,
    name: Option<&'static str>,
    value: String,
}

fn build_info_report(reader: &SourceReader, raster: &TiledRaster) -> InfoReport {
    let header = raster.header();
    let grid = raster.grid();

    let tags = raster
        .tags()
        .iter()
        .map(|tag| TagReport {
            id: tag.id(),
            name: tag.name,
            field_type: tag.entry.field_type.name(),
            count: tag.entry.count,
            value: tag.value.to_string(),
            value_name: tag.value_name(),
        })
        .collect();

    let geo_keys = raster
        .geo_keys()
        .map(|geo| {
            geo.keys
                .iter()
                .map(|key| GeoKeyReport {
                    id: key.id,
                    name: key.name(),
                    value: key.value.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    InfoReport {
        resource: reader.identifier().to_string(),
        size: reader.size(),
        byte_order: header.byte_order.name(),
        first_ifd_offset: header.first_ifd_offset,
        tags,
        grid: GridReport {
            image_width: grid.image_width,
            image_length: grid.image_length,
            tile_width: grid.tile_width,
            tile_length: grid.tile_length,
            tiles_across: grid.tiles_across,
            tiles_down: grid.tiles_down,
            tile_count: grid.tile_count(),
        },
        epsg: raster.geo_keys().and_then(|geo| geo.epsg()),
        geo_keys,
    }
}

fn print_info_text(report: &InfoReport) {
    println!("Resource:    {}", report.resource);
    println!("Size:        {} bytes", report.size);
    println!("Byte order:  {}", report.byte_order);
    println!("First IFD:   {}", report.first_ifd_offset);
    println!();

    println!("Tags ({})", report.tags.len());
    println!("─────────────────");
    for tag in &report.tags {
        let name = tag.name.unwrap_or("(unknown)");
        let value_name = tag
            .value_name
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        println!(
            "  {:>5}  {:<24} {:<9} x{:<6} {}{}",
            tag.id, name, tag.field_type, tag.count, tag.value, value_name
        );
    }
    println!();

    let g = &report.grid;
    println!("Tile grid");
    println!("─────────────────");
    println!("  Image:  {} x {}", g.image_width, g.image_length);
    println!("  Tile:   {} x {}", g.tile_width, g.tile_length);
    println!(
        "  Tiles:  {} across x {} down ({} total)",
        g.tiles_across, g.tiles_down, g.tile_count
    );

    if !report.geo_keys.is_empty() {
        println!();
        println!("GeoKeys ({})", report.geo_keys.len());
        println!("─────────────────");
        for key in &report.geo_keys {
            println!(
                "  {:>5}  {:<28} {}",
                key.id,
                key.name.unwrap_or("(unknown)"),
                key.value
            );
        }
        if let Some(epsg) = report.epsg {
            println!("  EPSG:{}", epsg);
        }
    }
}

async fn run_info(config: InfoConfig) -> ExitCode {
    let Some(reader) = prepare(&config.source, config.validate()).await else {
        return ExitCode::FAILURE;
    };

    let raster = match TiledRaster::open(&reader).await {
        Ok(raster) => raster,
        Err(e) => {
            report_tiff_error("Failed to open raster", &e);
            return ExitCode::FAILURE;
        }
    };

    let report = build_info_report(&reader, &raster);
    if config.json {
        return print_json(&report);
    }

    print_info_text(&report);
    ExitCode::SUCCESS
}

// =============================================================================
// Tile Command
// =============================================================================

#[derive(Serialize)]
struct TileReport {
    index: usize,
    x: u32,
    y: u32,
    width: u32,
    length: u32,
    samples_per_pixel: u16,
    sample_type: SampleType,
    /// (rows, samples per row)
    shape: (usize, usize),
    /// Pixel extent inside the image
    valid_width: u32,
    valid_length: u32,
    stats: Option<SampleStats>,
}

async fn run_tile(config: TileConfig) -> ExitCode {
    let Some(reader) = prepare(&config.source, config.validate()).await else {
        return ExitCode::FAILURE;
    };

    let raster = match TiledRaster::open(&reader).await {
        Ok(raster) => raster,
        Err(e) => {
            report_tiff_error("Failed to open raster", &e);
            return ExitCode::FAILURE;
        }
    };

    let result = match config.selector() {
        Ok(TileSelector::Index(index)) => raster.decode_tile(&reader, index).await,
        Ok(TileSelector::Position { x, y }) => raster.decode_tile_at(&reader, x, y).await,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tile = match result {
        Ok(tile) => tile,
        Err(e) => {
            report_tiff_error("Failed to decode tile", &e);
            return ExitCode::FAILURE;
        }
    };

    let grid = raster.grid();
    let (x, y) = grid.tile_position(tile.index as u64).unwrap_or((0, 0));
    let (valid_width, valid_length) = grid
        .tile_dimensions(x, y)
        .unwrap_or((tile.width, tile.length));

    let report = TileReport {
        index: tile.index,
        x,
        y,
        width: tile.width,
        length: tile.length,
        samples_per_pixel: tile.samples_per_pixel,
        sample_type: tile.sample_type(),
        shape: tile.shape(),
        valid_width,
        valid_length,
        stats: tile.stats(),
    };

    if config.json {
        return print_json(&report);
    }

    println!("Tile {} (column {}, row {})", report.index, report.x, report.y);
    println!(
        "  Shape:    {} rows x {} samples ({} x {} px, {} sample(s) per pixel, {})",
        report.shape.0,
        report.shape.1,
        report.width,
        report.length,
        report.samples_per_pixel,
        report.sample_type.name()
    );
    println!("  Valid:    {} x {} px", report.valid_width, report.valid_length);
    match report.stats {
        Some(stats) => println!(
            "  Values:   min {}  max {}  mean {:.4}",
            stats.min, stats.max, stats.mean
        ),
        None => println!("  Values:   (no samples)"),
    }

    ExitCode::SUCCESS
}
