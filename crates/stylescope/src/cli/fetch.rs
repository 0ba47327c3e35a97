//! The `stylescope fetch` command for downloading sample images.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use stylescope_core::{Config, ImageFetcher};

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Image URLs; falls back to `[fetch] urls` when empty
    pub urls: Vec<String>,

    /// Filename base; files are saved as `<PREFIX>_<index>.jpg`
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Execute the fetch command.
///
/// Individual download failures are reported but do not fail the command.
pub async fn execute(args: FetchArgs, config: Config) -> anyhow::Result<()> {
    let mut fetch = config.fetch;
    if !args.urls.is_empty() {
        fetch.urls = args.urls;
    }
    if let Some(prefix) = args.prefix {
        fetch.output_prefix = prefix;
    }
    if fetch.urls.is_empty() {
        anyhow::bail!("No URLs given. Pass them as arguments or set [fetch] urls in the config.");
    }

    let fetcher = ImageFetcher::new(fetch)?;

    let progress = ProgressBar::new(fetcher.urls().len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let report = fetcher
        .fetch_all_with(|url, outcome| {
            if let Ok(path) = outcome {
                progress.set_message(path.display().to_string());
            } else {
                progress.set_message(format!("failed: {url}"));
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    for path in &report.saved {
        println!("{}", path.display());
    }
    eprintln!(
        "Downloaded {}/{} images ({} failed)",
        report.saved.len(),
        report.total(),
        report.failed.len()
    );
    Ok(())
}
