//! FLV Dump - Prints a one-line summary of every tag in an FLV file
//!
//! Run with: cargo run --example flv_dump -- input.flv
//!
//! This example demonstrates:
//! - Implementing `FlvHandler` to receive tags as they are decoded
//! - Reading `onMetaData` fields from the script data tree
//! - Reporting where a damaged file stops parsing
//!
//! Set `RUST_LOG=flv_parser=debug` to trace each decoded tag.

use std::path::PathBuf;

use flv_parser::flv::{AudioTag, FileHeader, FlvHandler, ScriptTag, VideoTag};
use flv_parser::{FlvReader, ScriptValue};

#[derive(Default)]
struct Dump {
    audio: usize,
    video: usize,
    script: usize,
    keyframes: usize,
}

impl FlvHandler for Dump {
    fn on_header(&mut self, header: &FileHeader, _previous_tag_size: u32) {
        println!(
            "FLV v{} audio={} video={} header={}B",
            header.version, header.has_audio, header.has_video, header.data_offset
        );
    }

    fn on_audio(&mut self, tag: &AudioTag) {
        self.audio += 1;
        println!(
            "{:>10} audio  {:>7}ms format={:<2} rate={}Hz aac={:?} {}B",
            tag.header.offset,
            tag.header.full_timestamp(),
            tag.sub_header.sound_format,
            tag.sub_header.sound_rate.to_hz(),
            tag.sub_header.aac_packet_type,
            tag.payload.len()
        );
    }

    fn on_video(&mut self, tag: &VideoTag) {
        self.video += 1;
        if tag.sub_header.is_keyframe() {
            self.keyframes += 1;
        }
        println!(
            "{:>10} video  {:>7}ms codec={:?} key={} avc={:?} {}B",
            tag.header.offset,
            tag.header.full_timestamp(),
            tag.sub_header.codec(),
            tag.sub_header.is_keyframe(),
            tag.sub_header.avc.map(|a| a.packet_type),
            tag.payload.len()
        );
    }

    fn on_script(&mut self, tag: &ScriptTag) {
        self.script += 1;
        let Some(data) = &tag.data else {
            println!("{:>10} script (not decoded)", tag.header.offset);
            return;
        };
        println!(
            "{:>10} script {}",
            tag.header.offset,
            data.name().unwrap_or("<unnamed>")
        );
        if let Some(body) = data.body() {
            for entry in body.entries().unwrap_or_default() {
                println!(
                    "{:>18} = {}",
                    entry.key_str().unwrap_or("<binary>"),
                    summarize(&entry.value)
                );
            }
        }
    }
}

fn summarize(value: &ScriptValue) -> String {
    match value {
        ScriptValue::Number(n) => n.to_string(),
        ScriptValue::Boolean(b) => b.to_string(),
        ScriptValue::String(_) | ScriptValue::LongString(_) => {
            format!("{:?}", value.as_str().unwrap_or("<binary>"))
        }
        ScriptValue::Object(entries) | ScriptValue::EcmaArray(entries) => {
            format!("{{{} entries}}", entries.len())
        }
        ScriptValue::StrictArray(items) => format!("[{} items]", items.len()),
        other => format!("{other:?}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flv_parser=info".parse()?),
        )
        .init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: flv_dump <file.flv>");
        std::process::exit(2);
    };

    let mut reader = FlvReader::open(&path)?;
    let mut dump = Dump::default();
    let result = reader.parse(&mut dump);

    println!();
    println!(
        "{} audio, {} video ({} keyframes), {} script tags",
        dump.audio, dump.video, dump.keyframes, dump.script
    );

    if let Err(e) = result {
        eprintln!("stopped at offset {:?}: {e}", e.offset());
        std::process::exit(1);
    }
    Ok(())
}
