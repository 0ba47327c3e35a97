//! The `stylescope models` command for managing the CLIP model files.

use std::path::Path;

use clap::{Args, Subcommand};
use stylescope_core::acquire::download_to;
use stylescope_core::embedding::{TEXT_MODEL_FILENAME, TOKENIZER_FILENAME, VISUAL_MODEL_FILENAME};
use stylescope_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the CLIP vision encoder, text encoder and tokenizer
    Download,

    /// List installed model files
    List,

    /// Show model directory path
    Path,
}

/// Hugging Face repository holding the ONNX export of CLIP ViT-B/32.
const MODEL_REPO: &str = "Xenova/clip-vit-base-patch32";

/// One file of the model, remote path → local name.
struct ModelFile {
    label: &'static str,
    remote_path: &'static str,
    local_name: &'static str,
}

const MODEL_FILES: &[ModelFile] = &[
    ModelFile {
        label: "Vision encoder",
        remote_path: "onnx/vision_model.onnx",
        local_name: VISUAL_MODEL_FILENAME,
    },
    ModelFile {
        label: "Text encoder",
        remote_path: "onnx/text_model.onnx",
        local_name: TEXT_MODEL_FILENAME,
    },
    ModelFile {
        label: "Tokenizer",
        remote_path: "tokenizer.json",
        local_name: TOKENIZER_FILENAME,
    },
];

fn file_url(file: &ModelFile) -> String {
    format!(
        "https://huggingface.co/{}/resolve/main/{}",
        MODEL_REPO, file.remote_path
    )
}

/// Download every missing model file into the model directory.
///
/// An interrupted download never looks installed: [`download_to`] only
/// renames a file into place once its body is complete.
pub async fn download(config: &Config, client: &reqwest::Client) -> anyhow::Result<()> {
    let model_dir = config.model_files_dir();
    std::fs::create_dir_all(&model_dir)?;

    for file in MODEL_FILES {
        let dest = model_dir.join(file.local_name);
        if dest.exists() {
            tracing::info!("{} already exists at {:?}", file.label, dest);
            continue;
        }

        let url = file_url(file);
        tracing::info!("Downloading {}...", file.label);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        let bytes = download_to(client, &url, &dest).await?;
        tracing::info!(
            "  {} complete ({:.1} MB)",
            file.label,
            bytes as f64 / (1024.0 * 1024.0)
        );
    }

    Ok(())
}

/// Print the install status of each model file.
fn list(model_dir: &Path) {
    if !model_dir.exists() {
        println!("No models installed.");
        println!("Run `stylescope models download` to download the CLIP model.");
        return;
    }

    println!("Installed models:");
    println!("  Directory: {}\n", model_dir.display());
    for file in MODEL_FILES {
        let status = if model_dir.join(file.local_name).exists() {
            "ready"
        } else {
            "not installed"
        };
        println!("    - {:30} {}", file.local_name, status);
    }
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Download => {
            let client = reqwest::Client::new();
            download(config, &client).await?;
            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => list(&config.model_files_dir()),

        ModelsCommand::Path => {
            println!("{}", config.model_files_dir().display());
        }
    }

    Ok(())
}
