//! Commandline argument parser using clap for tf1forge

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level commandline arguments.
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct ForgeArgs {
    #[command(subcommand, long_about)]
    /// Which task to perform, payload building or serial transfer
    pub command: CommandTask,
}

/// The two tasks the tool performs.
#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// Generate a TF1 payload from a simple scene JSON or an app .seq JSON
    #[command(about)]
    Build(BuildCommand),

    /// Send a finished TF1 payload to the device over a serial port
    #[command(about)]
    Send(SendCommand),
}

/// Arguments of the `build` subcommand.
#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct BuildCommand {
    /// Input JSON (.seq JSON or simple scene JSON)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output .tf1 payload path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// TF1 display name
    #[arg(long, default_value = "AUTO1")]
    pub name: String,

    /// Override weight (default from input or 1)
    #[arg(long)]
    pub weight: Option<u16>,

    /// Canvas width in canvas units
    #[arg(long, default_value_t = 360)]
    pub canvas_width: u32,

    /// Canvas height in canvas units
    #[arg(long, default_value_t = 360)]
    pub canvas_height: u32,

    /// Path to device channel config JSON
    #[arg(long, default_value = "WWW/static/DQF6_LS01_en.json")]
    pub device_config: PathBuf,

    /// Write C header with sample_tf1_payload[] to this path
    #[arg(long, default_value = "esp-proto/main/include/tf1_sample.h")]
    pub emit_header: PathBuf,

    /// Do not write the C header
    #[arg(long)]
    pub no_header: bool,

    /// Protocol chunk payload bytes for frame preview
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Print cmd17/cmd18 frames in hex
    #[arg(long)]
    pub show_frames: bool,

    /// Douglas-Peucker simplify tolerance in canvas units (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub simplify_epsilon: f64,
}

/// Arguments of the `send` subcommand.
#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct SendCommand {
    /// Input .tf1 payload path
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Serial device name, e.g. /dev/ttyUSB0
    #[arg(short = 'p', long = "port")]
    pub port: String,

    /// Serial baud rate
    #[arg(short = 'b', long = "baud", default_value_t = 115200)]
    pub baud: u32,

    /// Protocol chunk payload bytes per frame
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Pause between frames, in milliseconds
    #[arg(long, default_value_t = 20)]
    pub interframe_ms: u64,
}
