//! CLI for generating app-compatible TF1 payloads and streaming them to
//! the device over its serial link.

use clap::Parser;
use log::{debug, info};
use serial2::SerialPort;
use std::{fs, process, time::Duration};

use tf1forge::{
    args::{BuildCommand, CommandTask, ForgeArgs, SendCommand},
    device_config::load_default_channels,
    embed::write_header_file,
    framing::{chunk_frame, handshake_frame, split_chunks, TF1_TAG},
    geometry::encode_patterns,
    import::parse_document,
    payload_format::build_tf1_payload,
    scene::BuildOptions,
    simplify::simplify_scenes,
};

// Example:
// cargo run -- build -i examples/line_scene.json -o line_scene.tf1 --show-frames
// cargo run -- send -i line_scene.tf1 -p /dev/ttyUSB0

fn main() {
    env_logger::init();
    let args = ForgeArgs::parse();

    match args.command {
        CommandTask::Build(cmd) => run_build(cmd),
        CommandTask::Send(cmd) => run_send(cmd),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn run_build(cmd: BuildCommand) {
    if cmd.chunk_size == 0 {
        fail("chunk-size must be > 0");
    }
    if cmd.simplify_epsilon < 0.0 {
        fail("simplify-epsilon must be >= 0");
    }

    let text = fs::read_to_string(&cmd.input).expect("Failed to read input JSON");
    let document = match parse_document(&text) {
        Ok(document) => document,
        Err(error) => fail(&error.to_string()),
    };

    let default_channels =
        load_default_channels(&cmd.device_config).expect("Failed to load device config");
    let weight = cmd.weight.unwrap_or_else(|| document.weight());
    let device_type = document.device_type().to_string();

    let mut scenes = document.into_scenes(&default_channels);
    if scenes.is_empty() {
        fail("No scenes found in input");
    }
    if cmd.simplify_epsilon > 0.0 {
        scenes = simplify_scenes(scenes, cmd.simplify_epsilon);
    }

    let opts = BuildOptions {
        tf1_name: cmd.name.clone(),
        weight,
        device_type,
        canvas_width: cmd.canvas_width,
        canvas_height: cmd.canvas_height,
    };

    // Re-encode per scene for the dedup report; the builder does its own
    // pass over the same deterministic encoder.
    let blobs: Vec<Vec<u8>> = scenes
        .iter()
        .map(|s| encode_patterns(&s.patterns, opts.canvas_width, opts.canvas_height))
        .collect();
    let raw_bytes: usize = blobs.iter().map(Vec::len).sum();
    let mut unique: Vec<&Vec<u8>> = Vec::new();
    for blob in &blobs {
        if !unique.contains(&blob) {
            unique.push(blob);
        }
    }
    let unique_bytes: usize = unique.iter().map(|b| b.len()).sum();
    let saved_bytes = raw_bytes - unique_bytes;
    let saved_percent = if raw_bytes > 0 {
        saved_bytes as f64 / raw_bytes as f64 * 100.0
    } else {
        0.0
    };

    let payload = match build_tf1_payload(&scenes, &opts) {
        Ok(payload) => payload,
        Err(error) => fail(&error.to_string()),
    };

    fs::write(&cmd.output, &payload).expect("Failed to write payload");
    println!(
        "Wrote TF1 payload ({} bytes): {}",
        payload.len(),
        cmd.output.display()
    );

    if !cmd.no_header {
        write_header_file(&payload, &cmd.emit_header).expect("Failed to write ESP header");
        println!("Updated ESP header: {}", cmd.emit_header.display());
    }

    println!(
        "Pattern dedup: {}/{} unique blobs, saved {} bytes ({:.2}%), reused-by-scenes={}",
        unique.len(),
        blobs.len(),
        saved_bytes,
        saved_percent,
        blobs.len() - unique.len()
    );

    if cmd.show_frames {
        let handshake = handshake_frame(payload.len() as u32, TF1_TAG, 0);
        println!("handshake(cmd17): {}", hex(&handshake));
        let chunks = split_chunks(&payload, cmd.chunk_size).expect("chunk size already checked");
        let mut sequence: u16 = 0;
        for chunk in chunks {
            sequence = sequence.wrapping_add(1);
            let frame = chunk_frame(sequence, chunk, TF1_TAG, 0).expect("Frame too long");
            println!("chunk {}(cmd18): {}", sequence, hex(&frame));
        }
    }
}

fn run_send(cmd: SendCommand) {
    if cmd.chunk_size == 0 {
        fail("chunk-size must be > 0");
    }

    let payload = fs::read(&cmd.input).expect("Failed to read payload");
    let chunks = split_chunks(&payload, cmd.chunk_size).expect("chunk size already checked");

    let mut port = SerialPort::open(&cmd.port, cmd.baud).expect("Failed to open port");
    port.set_write_timeout(Duration::from_secs(5))
        .expect("Failed to set write timeout");
    info!("Opened {} at {} baud", cmd.port, cmd.baud);

    let pause = Duration::from_millis(cmd.interframe_ms);
    let handshake = handshake_frame(payload.len() as u32, TF1_TAG, 0);
    debug!("handshake(cmd17): {}", hex(&handshake));
    port.write_all(&handshake).expect("Failed to send handshake");
    spin_sleep::sleep(pause);

    let chunk_count = chunks.len();
    let mut sequence: u16 = 0;
    for chunk in chunks {
        sequence = sequence.wrapping_add(1);
        let frame = chunk_frame(sequence, chunk, TF1_TAG, 0).expect("Frame too long");
        debug!("chunk {}(cmd18): {} bytes", sequence, frame.len());
        port.write_all(&frame).expect("Failed to send chunk");
        // The firmware's UART buffer is small; give it room to drain.
        spin_sleep::sleep(pause);
    }

    println!(
        "Sent {} bytes in {} chunks to {}",
        payload.len(),
        chunk_count,
        cmd.port
    );
}
