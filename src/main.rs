mod animations;
mod args;
mod core;
mod error;
mod geometry;
mod scenes;

use args::Args;
use clap::Parser;
use color_eyre::Result;
use geometry::text::Fonts;

fn main() -> Result<()> {
    pollster::block_on(run())
}

async fn run() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();

    let fonts = Fonts::load(args.font.as_deref(), args.bold_font.as_deref())?;
    let mut scene = scenes::cyber_attack::build(&fonts);
    if let Some(background) = args.background {
        scene.set_background(background);
    }
    log::info!(
        "Scene has {} segments, {:.1}s total",
        scene.segments().len(),
        scene.duration()
    );

    if args.dry_run {
        let mut start = 0.;
        for segment in scene.segments() {
            log::info!("{start:>6.2}s {}", segment.describe());
            start += segment.duration();
        }
        return Ok(());
    }

    let size = args.quality.size();
    if args.preview {
        core::preview(scene, size).await?;
    } else {
        let settings = core::OutputSettings {
            dir: args.output_dir,
            size,
            fps: args.quality.frame_rate(),
            single_frame: args.single_frame,
        };
        core::render_to_files(scene, &settings).await?;
    }
    Ok(())
}
