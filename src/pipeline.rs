//! Run entry points.
//!
//! ```text
//! config ──► source.list_current() ──► reconcile(records, output_dir, maker) ──► sink
//!                                          │
//!                                          └─► WallpaperMaker: resolve_backdrop → render → JPEG
//! ```
//!
//! Everything a run needs is resolved before the output directory is
//! touched: config, source credentials, font, template assets, and the
//! current record list. Any failure up to that point aborts with nothing
//! written or deleted. After it, failures are per record.

use crate::config::{Config, ConfigError, SourceKind};
use crate::font::{FontError, load_font};
use crate::imaging::{
    Layout, Quality, RenderError, TemplateAssets, TextPainter, encode_jpeg, render, render_asset,
};
use crate::reconcile::{ItemError, Materialize, ReconcileReport, reconcile};
use crate::sink::CommandSink;
use crate::source::{FetchError, HttpClient, MediaSource, PlexSource, TmdbSource, token_from_env};
use crate::types::{MediaKind, MediaRecord};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("metadata source unavailable: {0}")]
    SourceUnavailable(#[source] FetchError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("template assets: {0}")]
    Assets(#[from] RenderError),
    #[error("output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Layout plus its loaded template images.
#[derive(Debug, Clone)]
pub struct Template {
    pub layout: Layout,
    pub assets: TemplateAssets,
}

impl Template {
    pub fn load(layout: Layout, assets_dir: Option<&Path>) -> Result<Self, RenderError> {
        let assets = TemplateAssets::load(assets_dir, &layout)?;
        Ok(Self { layout, assets })
    }
}

/// Rendering settings for one run, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub output_dir: PathBuf,
    pub movie: Template,
    pub series: Template,
    pub quality: Quality,
    pub delay: Option<Duration>,
}

impl SyncOptions {
    /// Resolve layouts and load template assets. Reads files, no network.
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        let assets_dir = config.layout.assets_dir.as_deref();
        Ok(Self {
            output_dir: config.output_dir.clone(),
            movie: Template::load(config.layout_for(MediaKind::Movie), assets_dir)?,
            series: Template::load(config.layout_for(MediaKind::Series), assets_dir)?,
            quality: config.quality(),
            delay: config.fetch.delay(),
        })
    }

    pub fn template(&self, kind: MediaKind) -> &Template {
        match kind {
            MediaKind::Movie => &self.movie,
            MediaKind::Series => &self.series,
        }
    }
}

/// Turns a record into JPEG bytes: download, compose, encode.
pub struct WallpaperMaker<'a, S: ?Sized, P> {
    source: &'a S,
    painter: &'a P,
    options: &'a SyncOptions,
}

impl<'a, S: MediaSource + ?Sized, P: TextPainter> WallpaperMaker<'a, S, P> {
    pub fn new(source: &'a S, painter: &'a P, options: &'a SyncOptions) -> Self {
        Self {
            source,
            painter,
            options,
        }
    }
}

impl<S: MediaSource + ?Sized, P: TextPainter> Materialize for WallpaperMaker<'_, S, P> {
    fn materialize(&self, record: &MediaRecord) -> Result<Vec<u8>, ItemError> {
        let backdrop = record.backdrop.as_ref().ok_or(ItemError::NoBackdrop)?;
        let bytes = self.source.resolve_backdrop(backdrop);
        if let Some(delay) = self.options.delay {
            std::thread::sleep(delay);
        }
        let template = self.options.template(record.kind());
        let asset = render_asset(&bytes?, record, &template.layout, &template.assets, self.painter)?;
        debug!(id = %asset.source_record_id, file = %asset.canonical_filename, "composed");
        Ok(encode_jpeg(&asset.pixels, self.options.quality)?)
    }
}

/// List the current titles and reconcile the output directory against them.
pub fn run<S, P>(source: &S, painter: &P, options: &SyncOptions) -> Result<ReconcileReport, SyncError>
where
    S: MediaSource + ?Sized,
    P: TextPainter,
{
    let records = source.list_current().map_err(|e| {
        error!(source = source.name(), error = %e, "cannot list current titles, leaving output untouched");
        SyncError::SourceUnavailable(e)
    })?;
    info!(source = source.name(), count = records.len(), "current titles");

    let maker = WallpaperMaker::new(source, painter, options);
    let report = reconcile(&records, &options.output_dir, &maker)?;
    info!(
        rendered = report.rendered,
        skipped = report.skipped,
        deleted = report.deleted,
        failed = report.failed(),
        "reconciled"
    );
    Ok(report)
}

/// Build the configured source.
pub fn build_source(config: &Config, http: HttpClient) -> Result<Box<dyn MediaSource>, FetchError> {
    let kinds = config.kinds();
    Ok(match config.source.kind {
        SourceKind::Tmdb => Box::new(TmdbSource::new(
            http,
            token_from_env(&config.tmdb.token_env)?,
            &config.tmdb.language,
            config.tmdb.window,
            config.tmdb.pages,
            kinds,
        )),
        SourceKind::Plex => Box::new(PlexSource::new(
            http,
            &config.plex.base_url,
            token_from_env(&config.plex.token_env)?,
            config.plex.order_by,
            config.plex.limit,
            kinds,
        )),
    })
}

/// How the sink step went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkStatus {
    NotConfigured,
    Ok,
    Failed(String),
}

/// Everything `sync` reports back to the CLI.
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub source: String,
    pub output_dir: PathBuf,
    pub report: ReconcileReport,
    pub sink: SinkStatus,
}

/// Full run from config: source, font, reconcile, sink.
pub fn sync(config: &Config) -> Result<SyncSummary, SyncError> {
    let http = HttpClient::new(config.fetch.timeout()).map_err(SyncError::SourceUnavailable)?;
    let source = build_source(config, http.clone()).map_err(SyncError::SourceUnavailable)?;
    let options = SyncOptions::from_config(config)?;
    let painter = load_font(&config.font, &http)?;

    let report = run(&source, &painter, &options)?;
    let sink = run_sink(config, &options.output_dir);

    Ok(SyncSummary {
        source: source.name().to_string(),
        output_dir: options.output_dir,
        report,
        sink,
    })
}

fn run_sink(config: &Config, dir: &Path) -> SinkStatus {
    let Some(sink) = config.sink.command.clone().and_then(CommandSink::new) else {
        return SinkStatus::NotConfigured;
    };
    match sink.push(dir) {
        Ok(()) => SinkStatus::Ok,
        Err(e) => {
            warn!(error = %e, "sink failed");
            SinkStatus::Failed(e.to_string())
        }
    }
}

/// Render one local backdrop with the configured layout for `record`'s kind
/// and write it to `out`. The only network access is the font, on a cache
/// miss.
pub fn preview(config: &Config, image: &Path, record: &MediaRecord, out: &Path) -> Result<(), PreviewError> {
    let bytes = std::fs::read(image).map_err(|source| PreviewError::Read {
        path: image.to_path_buf(),
        source,
    })?;
    let http = HttpClient::new(config.fetch.timeout()).map_err(|e| PreviewError::Font(e.into()))?;
    let painter = load_font(&config.font, &http)?;
    let template = Template::load(
        config.layout_for(record.kind()),
        config.layout.assets_dir.as_deref(),
    )?;

    let img = render(&bytes, record, &template.layout, &template.assets, &painter)?;
    let jpeg = encode_jpeg(&img, config.quality())?;
    std::fs::write(out, jpeg).map_err(|source| PreviewError::Write {
        path: out.to_path_buf(),
        source,
    })?;
    info!(out = %out.display(), preset = %template.layout.preset, "preview written");
    Ok(())
}

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
