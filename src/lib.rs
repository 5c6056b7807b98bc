//! # trendwall
//!
//! Turns what is trending on TMDB, or what is newest on a Plex server, into
//! captioned wallpaper images in a folder a slideshow or screensaver reads.
//!
//! # Architecture: One Sequential Pass
//!
//! ```text
//! 1. List      source  →  Vec<MediaRecord>       (TMDB trending / Plex library)
//! 2. Reconcile records →  output_dir/*.jpg       (render missing, delete stale)
//! 3. Sink      output_dir → elsewhere            (optional external command)
//! ```
//!
//! Each record becomes one file named after its sanitized title. A title
//! already on disk is never re-rendered, so a steady trending list costs no
//! downloads; a title that drops off the list has its file deleted.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared types: `MediaRecord`, `MediaKind`, `RenderedAsset` |
//! | [`naming`] | Title → canonical filename sanitizer |
//! | [`metadata`] | Display text: year, duration, seasons, rating, overview policies |
//! | [`imaging`] | Layout engine: presets, template assets, text painting, JPEG output |
//! | [`font`] | Font loading with a content-addressed local cache |
//! | [`source`] | `MediaSource` trait with TMDB and Plex adapters |
//! | [`reconcile`] | Snapshot-then-diff directory reconciliation |
//! | [`pipeline`] | Wires config, source, font, reconciler and sink into a run |
//! | [`sink`] | Post-run mirroring command |
//! | [`config`] | `trendwall.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting of run reports and config |
//!
//! # Design Decisions
//!
//! ## Filenames Are the Index
//!
//! There is no manifest. The output directory listing is the record of what
//! has been rendered, and [`naming::canonical_filename`] is the join key
//! between it and the current titles. Writes go through a hidden temp file
//! and a rename so a crash never leaves a half-written file under a real
//! name.
//!
//! ## One Engine, Many Sources
//!
//! Both backends implement [`source::MediaSource`]; the layout engine only
//! sees records and bytes. Presets carry everything that differs between a
//! TMDB wallpaper and a Plex one.
//!
//! ## Fail Per Record
//!
//! A broken backdrop or a failed write costs one title. Only losing the
//! title list itself aborts the run, before anything is deleted.

pub mod config;
pub mod font;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod sink;
pub mod source;
pub mod types;
