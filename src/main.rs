use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info};

use video_notes_rust::config::Config;
use video_notes_rust::library::VideoLibrary;
use video_notes_rust::notes::NoteGenerator;
use video_notes_rust::transcription::{ParaformerRecognizer, Transcriber};
use video_notes_rust::NoteStyle;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("video_notes_rust=info,warn")
        .init();

    let matches = Command::new("Video Notes (Rust)")
        .version("0.1.0")
        .about("AI-assisted video note generation")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
                .global(true),
        )
        .arg(
            Arg::new("media-root")
                .short('m')
                .long("media-root")
                .value_name("DIR")
                .help("Override the media library root")
                .global(true),
        )
        .subcommand(
            Command::new("transcribe")
                .about("Transcribe an audio file into a word-segmented SRT subtitle")
                .arg(
                    Arg::new("audio")
                        .short('a')
                        .long("audio")
                        .value_name("FILE")
                        .help("Audio file to transcribe")
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("SRT output path (defaults to saved_srt/<stem>.srt)"),
                ),
        )
        .subcommand(
            Command::new("notes")
                .about("Generate illustrated notes for a library video")
                .arg(
                    Arg::new("video-id")
                        .short('i')
                        .long("video-id")
                        .value_name("ID")
                        .help("Video id in the library index")
                        .required(true),
                )
                .arg(
                    Arg::new("style")
                        .short('s')
                        .long("style")
                        .value_name("STYLE")
                        .help("Note style: professional, blog or tutorial")
                        .default_value("professional"),
                ),
        )
        .subcommand_required(true)
        .get_matches();

    let config = load_config(&matches)?;
    config.validate()?;
    info!("🚀 Video Notes (Rust) starting...");
    info!("{}", config.summary());

    match matches.subcommand() {
        Some(("transcribe", sub)) => run_transcribe(&config, sub).await,
        Some(("notes", sub)) => run_notes(&config, sub).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;

    if let Some(media_root) = matches.get_one::<String>("media-root") {
        config.media.media_root = PathBuf::from(media_root);
    }

    Ok(config)
}

async fn run_transcribe(config: &Config, matches: &ArgMatches) -> Result<()> {
    let audio_path = PathBuf::from(matches.get_one::<String>("audio").unwrap());
    let output_path = match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(path),
        None => {
            let stem = audio_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "transcription".to_string());
            config.media.srt_dir().join(format!("{}.srt", stem))
        }
    };

    let recognizer = ParaformerRecognizer::new(config.recognition.clone())?;
    let transcriber = Transcriber::new(Box::new(recognizer));

    match transcriber.transcribe(&audio_path).await {
        Ok(document) => {
            if let Some(parent) = output_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            document.save_to_file(&output_path).await?;
            info!("💾 Saved {} cues to {}", document.len(), output_path.display());

            print_envelope(serde_json::json!({
                "success": true,
                "data": {
                    "srt_path": output_path,
                    "cues": document.len(),
                },
                "message": format!("transcribed {} subtitle cues", document.len()),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }
        Err(e) => {
            error!("❌ Transcription failed: {:#}", e);
            print_envelope(serde_json::json!({
                "success": false,
                "error": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))?;
            std::process::exit(1);
        }
    }
}

async fn run_notes(config: &Config, matches: &ArgMatches) -> Result<()> {
    let video_id = matches.get_one::<String>("video-id").unwrap();
    let style: NoteStyle = matches
        .get_one::<String>("style")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let library = VideoLibrary::load(&config.media.media_root).await?;
    let generator = NoteGenerator::new(config.clone(), library)?;

    match generator.generate(video_id, style).await {
        Ok(result) => print_envelope(serde_json::json!({
            "success": true,
            "data": result.notes,
            "message": result.message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            error!("❌ Note generation failed for {}: {:#}", video_id, e);
            print_envelope(serde_json::json!({
                "success": false,
                "error": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))?;
            std::process::exit(1);
        }
    }
}

/// Print the uniform response envelope to stdout
fn print_envelope(envelope: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
