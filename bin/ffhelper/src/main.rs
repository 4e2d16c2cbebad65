use std::{num::NonZeroU32, path::PathBuf, time::Duration};

use anyhow::bail;
use clap::Parser;
use fake_user_agent::get_chrome_rua;
use kagami::{Config, DownloadOptions, Pipeline};
use reqwest::{Client, ClientBuilder};

/// FFmpeg helper to download HLS streams faster in asynchronous mode.
#[derive(Parser, Debug, Clone)]
#[clap(version)]
pub struct FfhelperArgs {
    /// Location of temporary files
    #[clap(short, long, default_value = "tmp")]
    path: PathBuf,

    /// Process ID
    #[clap(short, long)]
    id: Option<String>,

    /// Link of master m3u8 file
    #[clap(short, long)]
    url: Option<String>,

    /// Get available video resolutions
    #[clap(short, long)]
    extract: bool,

    /// Download ID
    #[clap(short, long)]
    download: Option<usize>,

    /// Number of simultaneous downloads
    #[clap(short, long, default_value = "5")]
    tasks: NonZeroU32,

    /// FFmpeg arguments
    #[clap(short, long)]
    ffmpeg: Option<String>,

    /// Output file path
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Show process details
    #[clap(short, long)]
    log: bool,

    /// Do not download if the video already exists
    #[clap(short, long)]
    skip: bool,

    /// Clean up all temporary files
    #[clap(short, long)]
    clear: bool,
}

impl FfhelperArgs {
    fn client(&self) -> Client {
        ClientBuilder::new()
            .user_agent(get_chrome_rua())
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap()
    }

    fn config(&self) -> anyhow::Result<Config> {
        let Some(run_id) = self.id.clone() else {
            bail!("No process id defined.");
        };
        let Some(url) = self.url.clone() else {
            bail!("No url defined.");
        };

        Ok(Config {
            root: self.path.clone(),
            run_id,
            url,
            tasks: self.tasks,
            verbose: self.log,
            skip: self.skip,
        })
    }

    fn download_options(&self, rendition: usize) -> anyhow::Result<DownloadOptions> {
        let Some(output) = self.output.clone() else {
            bail!("No output file defined.");
        };
        let muxer_args = match self.ffmpeg.clone() {
            Some(args) => args,
            None => {
                log::warn!("No FFmpeg argument. Using the default configuration.");
                "-c copy".to_string()
            }
        };

        Ok(DownloadOptions {
            rendition,
            output,
            muxer_args,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = FfhelperArgs::parse();

    pretty_env_logger::formatted_builder()
        .filter_level(if args.log {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if args.clear {
        kagami::pipeline::clear(&args.path).await?;
        return Ok(());
    }

    let pipeline = Pipeline::new(args.config()?, args.client());

    if args.extract {
        let renditions = pipeline.extract().await?;
        println!("{:<6} {:<14} {:<10}", "ID", "Resolution", "Bandwidth");
        for rendition in renditions {
            println!(
                "{:<6} {:<14} {:<10}",
                rendition.id, rendition.resolution, rendition.bandwidth
            );
        }
    } else if let Some(rendition) = args.download {
        let options = args.download_options(rendition)?;
        pipeline.download(&options).await?;
    } else {
        bail!("Nothing to do. Pass --extract, --download or --clear.");
    }

    Ok(())
}
