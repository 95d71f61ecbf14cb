use std::{fmt::Display, path::PathBuf, str::FromStr};

use clap::Parser;

use crate::core::color::Color;

/// Renders the cyber attack simulation scene
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Plays the scene in a window instead of writing frames.
    #[clap(short, long)]
    pub preview: bool,

    /// Output quality: low (854x480, 15fps), medium (1280x720, 30fps),
    /// high (1920x1080, 60fps), production (2560x1440, 60fps) or 4k (3840x2160, 60fps).
    #[clap(short, long, default_value_t = Quality::Low)]
    pub quality: Quality,

    /// Directory the PNG frames are written to.
    #[clap(short, long, default_value = "media/cyber_attack")]
    pub output_dir: PathBuf,

    /// Only writes the last frame.
    #[clap(short, long)]
    pub single_frame: bool,

    /// Builds the timeline and logs it without rendering.
    #[clap(long)]
    pub dry_run: bool,

    #[clap(long, env = "CYBERSCENE_FONT")]
    pub font: Option<PathBuf>,

    #[clap(long, env = "CYBERSCENE_BOLD_FONT")]
    pub bold_font: Option<PathBuf>,

    /// Overrides the scene background, as a hex color.
    #[clap(long, value_parser = parse_color)]
    pub background: Option<Color>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    FourK,
    Production,
    High,
    Medium,
    Low,
}

impl Quality {
    pub fn size(self) -> (u32, u32) {
        match self {
            Quality::FourK => (3840, 2160),
            Quality::Production => (2560, 1440),
            Quality::High => (1920, 1080),
            Quality::Medium => (1280, 720),
            Quality::Low => (854, 480),
        }
    }

    pub fn frame_rate(self) -> u32 {
        match self {
            Quality::High | Quality::Production | Quality::FourK => 60,
            Quality::Medium => 30,
            Quality::Low => 15,
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quality::FourK => "4k",
            Quality::Production => "production",
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        };
        f.write_str(name)
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" | "hi" | "h" => Ok(Self::High),
            "medium" | "mid" | "m" => Ok(Self::Medium),
            "low" | "lo" | "l" => Ok(Self::Low),
            "production" | "prod" | "p" => Ok(Self::Production),
            "fourk" | "4k" => Ok(Self::FourK),
            _ => Err(format!("Invalid quality: {s}")),
        }
    }
}
