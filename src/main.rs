//! tubegrab - YouTube video and audio downloader
//!
//! Fetches stream lists through yt-dlp, picks a stream by resolution and
//! merges separate video and audio with ffmpeg. Runs as a desktop GUI, a
//! small web server or a plain command line tool.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use path_absolutize::Absolutize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tubegrab::downloader::{
    DownloadProgress, DownloadRequest, DownloadStatus, Downloader, OutputMode, ProgressReporter,
};
use tubegrab::gui::{self, GuiFlags};
use tubegrab::selector::{available_resolutions, Criterion};
use tubegrab::utils::{scratch_dir, AppSettings};
use tubegrab::web::WebServer;

#[derive(Parser)]
#[command(name = "tubegrab", version, about = "Download YouTube videos and audio")]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output; repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the streams a video offers
    Streams {
        url: String,
    },
    /// Download one video
    Download {
        url: String,
        /// best, highest, audio-only or a resolution such as 1080p or 4K
        #[arg(short, long)]
        resolution: Option<String>,
        /// Destination folder
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep a video-only stream without merging audio
        #[arg(long)]
        video_only: bool,
    },
    /// Run the web front end
    Serve {
        /// Bind address such as 127.0.0.1:8501
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Open the desktop window (default)
    Gui,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings_path = args.config.clone().unwrap_or_else(AppSettings::default_path);
    let settings = AppSettings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?
        .apply_env();

    let downloader = Arc::new(Downloader::from_settings(&settings)?);

    match args.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            gui::run(GuiFlags {
                downloader,
                settings,
                settings_path,
            })?;
        }
        Commands::Streams { url } => runtime()?.block_on(list_streams(&downloader, &url))?,
        Commands::Download {
            url,
            resolution,
            output,
            video_only,
        } => {
            let criterion: Criterion = resolution
                .as_deref()
                .unwrap_or(settings.preferred_quality.as_str())
                .parse()?;
            let destination = output
                .unwrap_or_else(|| settings.download_location.clone())
                .absolutize()?
                .to_path_buf();
            let request = DownloadRequest {
                video_url: url,
                criterion,
                destination,
                output: if video_only {
                    OutputMode::VideoOnly
                } else {
                    OutputMode::Combined
                },
            };
            runtime()?.block_on(download(downloader, request))?;
        }
        Commands::Serve { addr } => {
            let addr = match addr {
                Some(addr) => addr,
                None => settings
                    .web_addr
                    .parse()
                    .with_context(|| format!("invalid web_addr {:?}", settings.web_addr))?,
            };
            let server = WebServer::new(
                addr,
                downloader,
                scratch_dir(),
                settings.preferred_quality.clone(),
                settings.web_max_connections,
            );
            runtime()?.block_on(server.run())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}

async fn list_streams(downloader: &Downloader, url: &str) -> Result<()> {
    let video = downloader.video(url).await?;

    println!("{}", video.title);
    if let Some(uploader) = &video.uploader {
        println!("by {}", uploader);
    }
    if let Some(duration) = video.duration_label() {
        println!("duration {}", duration);
    }
    println!();
    println!("{:<8} {:<10} {:<6} {:<12} {:>10}", "ITAG", "RES", "EXT", "TRACKS", "SIZE");
    for stream in &video.streams {
        let tracks = match (stream.has_video, stream.has_audio) {
            (true, true) => "video+audio",
            (true, false) => "video",
            _ => "audio",
        };
        let size = stream
            .approximate_size_bytes
            .map(|b| format!("{:.1} MiB", b as f64 / (1024.0 * 1024.0)))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{:<8} {:<10} {:<6} {:<12} {:>10}",
            stream.itag,
            stream.resolution.as_deref().unwrap_or("-"),
            stream.container,
            tracks,
            size
        );
    }
    println!();
    println!("Resolutions: {}", available_resolutions(&video.streams).join(", "));
    Ok(())
}

async fn download(downloader: Arc<Downloader>, request: DownloadRequest) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<DownloadProgress>(64);
    let printer = tokio::spawn(async move {
        let mut last_line = String::new();
        while let Some(progress) = rx.recv().await {
            let line = match &progress.status {
                DownloadStatus::Downloading => format!(
                    "[{}/{}] {:>5.1}%",
                    progress.part + 1,
                    progress.parts,
                    progress.percentage() * 100.0
                ),
                DownloadStatus::Failed(_) => continue,
                other => other.label().to_string(),
            };
            if line != last_line {
                eprintln!("{}", line);
                last_line = line;
            }
        }
    });

    let result = downloader
        .download(&request, &ProgressReporter::new(tx))
        .await;
    // The reporter is gone, so the printer drains and exits
    let _ = printer.await;

    let path = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    info!("Download finished");
    println!("{}", path.display());
    Ok(())
}
