use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use glimmer_impl::render::ImageBuffer;
use glimmer_impl::tracer::{DEFAULT_MAX_RECURSION, TracerKind};
use glimmer_samples::sample_scenes;

/// Renders the built-in sample scenes to PNG.
#[derive(Parser, Debug)]
#[command(name = "glimmer", version, about)]
struct Cli {
    /// Sample scene to render (see --list)
    #[arg(short, long, default_value = "spheres")]
    scene: String,

    /// List the available sample scenes and exit
    #[arg(long)]
    list: bool,

    /// Output image width in pixels
    #[arg(short = 'W', long, default_value_t = 1024)]
    width: usize,

    /// Output image height in pixels
    #[arg(short = 'H', long, default_value_t = 768)]
    height: usize,

    /// Worker thread count (0 renders on the main thread)
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Maximum reflection/transmission recursion depth
    #[arg(long, default_value_t = DEFAULT_MAX_RECURSION)]
    depth: u32,

    /// Skip building the BVH and trace against the flat geometry list
    #[arg(long)]
    no_bvh: bool,

    /// Where to write the rendered PNG
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Log more detail (worker/tile timings)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let scenes = sample_scenes();
    if cli.list {
        for sample in &scenes {
            println!("{:<14} {}", sample.name, sample.summary);
        }
        return Ok(());
    }

    let sample = scenes
        .iter()
        .find(|sample| sample.name == cli.scene)
        .with_context(|| format!("unknown scene '{}' (try --list)", cli.scene))?;

    let setup = (sample.build)()
        .with_context(|| format!("failed to assemble scene '{}'", sample.name))?;

    let mut scene = setup.scene;
    if !cli.no_bvh {
        scene.build_bvh();
    }

    let camera = setup
        .camera
        .resolution(cli.width, cli.height)
        .multithreading(cli.threads)
        .max_recursion(cli.depth)
        .ray_tracer(Arc::new(scene), TracerKind::Simple)
        .build()
        .context("invalid camera configuration")?;

    let buffer = ImageBuffer::new(cli.width, cli.height);
    camera.render_image(&buffer);

    let image = image::RgbImage::from_raw(
        cli.width as u32,
        cli.height as u32,
        buffer.to_rgb8(),
    )
    .context("rendered buffer size mismatch")?;
    image
        .save(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    log::info!("wrote {}", cli.output.display());
    Ok(())
}
