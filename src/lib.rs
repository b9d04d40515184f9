//! tf1forge converts editor-authored vector animations (scenes of
//! colored line traces plus per-channel output intensities) into the
//! compact TF1 binary payload an embedded laser projector controller
//! plays back, and frames that payload for transfer over the device's
//! serial link.
//!
//! The pipeline: an authoring JSON document (either the app's `.seq`
//! export or the simple hand-authored shape) is normalized by [`import`]
//! into canonical scenes, [`geometry`] turns each scene's patterns into
//! the firmware's polar byte stream, [`payload_format`] assembles the
//! deduplicated blobs and per-scene metadata into one container, and
//! [`framing`] wraps the result into handshake and chunk frames for the
//! wire. Everything in between is a pure, synchronous transformation;
//! the only I/O lives in the CLI binary.

#![warn(missing_docs)]
pub mod args;
pub mod device_config;
pub mod embed;
pub mod framing;
pub mod geometry;
pub mod import;
pub mod payload_format;
pub mod scene;
pub mod simplify;
