//! Valhalla UTM link generator
//!
//! Standalone binary that prints tagged landing links for one or more videos.

use clap::Parser;
use valhalla::{attribution::extract_video_id, config::Config, error::Result, utm::UtmLink};

#[derive(Parser)]
#[command(name = "valhalla-utm")]
#[command(author, version, about = "Generate UTM-tagged landing links for YouTube videos")]
struct Args {
    /// Video ids or URLs
    #[arg(required = true)]
    videos: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Landing page (default from config)
    #[arg(long)]
    base_url: Option<String>,

    /// Campaign tag (default from config)
    #[arg(long)]
    campaign: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    if let Some(base_url) = args.base_url {
        config.utm.base_url = base_url;
    }
    config.validate()?;

    for video in &args.videos {
        let id = extract_video_id(video).unwrap_or_else(|| video.trim().to_string());
        let mut link = UtmLink::for_video(&config.utm, &id)?;
        if let Some(ref campaign) = args.campaign {
            link = link.with_campaign(campaign.clone());
        }
        if args.videos.len() > 1 {
            println!("{id}\t{}", link.build());
        } else {
            println!("{}", link.build());
        }
    }

    Ok(())
}
