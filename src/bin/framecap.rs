use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "framecap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a captured frame and its layers into JPEG stills.
    Compose(ComposeArgs),
    /// Print the capture record embedded in a JPEG.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Captured video frame (PNG).
    #[arg(long)]
    frame: PathBuf,

    /// Rendered subtitle layer (PNG, same size as the frame).
    #[arg(long)]
    subtitle: Option<PathBuf>,

    /// Broadcaster overlay layer (PNG, same size as the frame).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Job description JSON: mode, metadata and optional comments.
    #[arg(long)]
    job: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Output file stem; `<stem>.jpg` and `<stem>_caption.jpg` are written.
    #[arg(long, default_value = "capture")]
    stem: String,

    /// JPEG quality (1-100). Overrides `FRAMECAP_JPEG_QUALITY`.
    #[arg(long)]
    quality: Option<u8>,

    /// Font used for comment text. Overrides `FRAMECAP_COMMENT_FONT`.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Produce the outputs one after the other.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// JPEG produced by `compose`.
    path: PathBuf,

    /// Also print the primitive Exif fields.
    #[arg(long)]
    fields: bool,
}

#[derive(Deserialize, Debug)]
struct JobFile {
    mode: framecap::CaptureMode,
    metadata: framecap::CaptureMetadata,
    #[serde(default)]
    comments: Option<framecap::CommentLayerSpec>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_job_json(path: &Path) -> anyhow::Result<JobFile> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let r = BufReader::new(f);
    let job: JobFile = serde_json::from_reader(r).with_context(|| "parse job JSON")?;
    Ok(job)
}

fn read_png(path: &Path) -> anyhow::Result<(u32, u32, Vec<u8>)> {
    let img = image::open(path)
        .with_context(|| format!("decode image '{}'", path.display()))?
        .into_rgba8();
    let (w, h) = img.dimensions();
    Ok((w, h, img.into_raw()))
}

fn read_layer(path: Option<&Path>) -> anyhow::Result<Option<framecap::RasterLayer>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let (w, h, data) = read_png(path)?;
    Ok(Some(framecap::RasterLayer::from_rgba8(w, h, data)?))
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let JobFile {
        mode,
        metadata,
        comments,
    } = read_job_json(&args.job)?;

    let mut opts = framecap::CaptureOpts::from_env()?.with_parallel(!args.sequential);
    if let Some(q) = args.quality {
        opts = opts.with_jpeg_quality(q);
    }
    if let Some(font) = &args.font {
        opts = opts.with_comment_font_file(font)?;
    }

    let (w, h, data) = read_png(&args.frame)?;
    let job = framecap::CaptureJob {
        mode,
        frame: framecap::VideoFrame::from_rgba8(w, h, data)?,
        subtitle_layer: read_layer(args.subtitle.as_deref())?,
        overlay_layer: read_layer(args.overlay.as_deref())?,
        comment_layer: comments,
        metadata,
    };

    let result = framecap::composite(job, &opts)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (bytes, suffix) in [(&result.normal, ""), (&result.captioned, "_caption")] {
        let Some(bytes) = bytes else {
            continue;
        };
        let out = args.out_dir.join(format!("{}{suffix}.jpg", args.stem));
        std::fs::write(&out, bytes).with_context(|| format!("write jpeg '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.path).with_context(|| format!("read '{}'", args.path.display()))?;

    if args.fields {
        let fields = framecap::read_exif_fields(&bytes)?;
        eprintln!("exif fields:");
        eprintln!("  date_time:            {}", fields.date_time.as_deref().unwrap_or("-"));
        eprintln!("  software:             {}", fields.software.as_deref().unwrap_or("-"));
        eprintln!(
            "  date_time_original:   {}",
            fields.date_time_original.as_deref().unwrap_or("-")
        );
        eprintln!(
            "  date_time_digitized:  {}",
            fields.date_time_digitized.as_deref().unwrap_or("-")
        );
    }

    let metadata = framecap::read_metadata(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
