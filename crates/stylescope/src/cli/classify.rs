//! The `stylescope classify` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use stylescope_core::{
    classify_with_timeout, ClassificationEngine, Classifier, ClassifyMode, ClipProvider, Config,
    DevicePreference, LabelVocabulary, MockEngine, OutputWriter,
};

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// The single most probable label
    #[default]
    Dominant,
    /// A JSON object mapping every label to its probability
    Distribution,
}

impl From<ModeArg> for ClassifyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Dominant => ClassifyMode::DominantLabel,
            ModeArg::Distribution => ClassifyMode::FullDistribution,
        }
    }
}

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image to classify
    pub image: PathBuf,

    /// Output mode
    #[arg(short, long, value_enum, default_value_t = ModeArg::Dominant)]
    pub mode: ModeArg,

    /// Style label to score against (repeatable); replaces the configured labels
    #[arg(short, long = "label", value_name = "LABEL")]
    pub labels: Vec<String>,

    /// File with one label per line ('#' comments and blank lines ignored)
    #[arg(long, value_name = "FILE", conflicts_with = "labels")]
    pub labels_file: Option<PathBuf>,

    /// Multiplier applied to cosine similarities before the softmax
    #[arg(long)]
    pub logit_scale: Option<f32>,

    /// Inference device: auto, cpu, cuda or cuda:<id>
    #[arg(long, env = "STYLESCOPE_DEVICE")]
    pub device: Option<String>,

    /// Use the synthetic classifier instead of the model
    #[arg(long)]
    pub mock: bool,

    /// Randomize which label the mock makes dominant
    #[arg(long, requires = "mock")]
    pub shuffle: bool,

    /// Seed for --shuffle
    #[arg(long, requires = "shuffle")]
    pub seed: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the classify command, printing to stdout.
pub async fn execute(args: ClassifyArgs, config: Config) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    run(args, config, stdout.lock()).await
}

/// Classify and write the result to `out`.
///
/// Nothing is written unless classification succeeds.
pub async fn run<W: Write>(args: ClassifyArgs, mut config: Config, out: W) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config)?;
    let vocabulary = Arc::new(vocabulary(&args, &config)?);
    tracing::debug!("Classifying against {} labels", vocabulary.len());

    let classifier: Arc<dyn Classifier> = if args.mock {
        let mock = MockEngine::from_config(&config.mock, args.shuffle);
        tracing::info!(
            "Using {} mock classifier",
            if mock.is_randomized() {
                "randomized"
            } else {
                "deterministic"
            }
        );
        Arc::new(mock)
    } else {
        let model_config = config.clone();
        let provider = tokio::task::spawn_blocking(move || ClipProvider::load(&model_config))
            .await
            .context("Model loading task failed")??;
        Arc::new(ClassificationEngine::new(provider, &config.scoring))
    };

    let result = classify_with_timeout(
        classifier,
        args.image.clone(),
        vocabulary,
        args.mode.into(),
        Duration::from_millis(config.limits.embed_timeout_ms),
    )
    .await?;

    let mut writer = OutputWriter::new(out, config.output.pretty);
    writer.write_result(&result)?;
    writer.flush()?;
    Ok(())
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(args: &ClassifyArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(scale) = args.logit_scale {
        if !scale.is_finite() || scale <= 0.0 {
            anyhow::bail!("--logit-scale must be a finite number > 0 (got {scale})");
        }
        config.scoring.logit_scale = scale;
    }
    if let Some(device) = &args.device {
        DevicePreference::parse(device).map_err(|e| anyhow::anyhow!("--device: {e}"))?;
        config.model.device = device.clone();
    }
    if args.seed.is_some() {
        config.mock.seed = args.seed;
    }
    config.output.pretty |= args.pretty;
    Ok(())
}

/// Labels from `--labels-file`, else `--label`, else `[vocabulary]`.
fn vocabulary(args: &ClassifyArgs, config: &Config) -> anyhow::Result<LabelVocabulary> {
    let vocabulary = if let Some(path) = &args.labels_file {
        LabelVocabulary::load(path)?
    } else if !args.labels.is_empty() {
        LabelVocabulary::new(args.labels.iter().map(String::as_str))?
    } else {
        config.label_vocabulary()?
    };
    Ok(vocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ClassifyArgs,
    }

    fn parse(argv: &[&str]) -> ClassifyArgs {
        TestCli::parse_from(std::iter::once("classify").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["look.jpg"]);
        assert_eq!(args.mode, ModeArg::Dominant);
        assert!(!args.mock);
        assert_eq!(
            vocabulary(&args, &Config::default()).unwrap().len(),
            Config::default().vocabulary.labels.len()
        );
    }

    #[test]
    fn test_repeated_labels_replace_vocabulary() {
        let args = parse(&["look.jpg", "-l", "goth style", "-l", "emo style"]);
        let vocab = vocabulary(&args, &Config::default()).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of("emo style"), Some(1));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let args = parse(&["look.jpg", "-l", "goth style", "-l", "goth style"]);
        assert!(vocabulary(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "look.jpg",
            "--mock",
            "--shuffle",
            "--seed",
            "9",
            "--logit-scale",
            "1.5",
            "--pretty",
        ]);
        let mut config = Config::default();
        apply_overrides(&args, &mut config).unwrap();
        assert_eq!(config.scoring.logit_scale, 1.5);
        assert_eq!(config.mock.seed, Some(9));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut config = Config::default();
        let args = parse(&["look.jpg", "--logit-scale", "0"]);
        assert!(apply_overrides(&args, &mut config).is_err());

        let args = parse(&["look.jpg", "--device", "tpu"]);
        assert!(apply_overrides(&args, &mut config).is_err());
    }

    #[test]
    fn test_shuffle_requires_mock() {
        let result = TestCli::try_parse_from(["classify", "look.jpg", "--shuffle"]);
        assert!(result.is_err());
    }

    fn empty_model_dir() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        (dir, config)
    }

    #[tokio::test]
    async fn test_mock_prints_scenario_distribution() {
        let args = parse(&[
            "look.jpg",
            "--mock",
            "--mode",
            "distribution",
            "-l",
            "chic style",
            "-l",
            "goth style",
            "-l",
            "kawaii style",
            "-l",
            "vintage style",
        ]);
        let mut out = Vec::new();
        run(args, Config::default(), &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"chic style\":0.05,\"goth style\":0.85,\"kawaii style\":0.05,\"vintage style\":0.05}\n"
        );
    }

    #[tokio::test]
    async fn test_mock_prints_dominant_label() {
        let args = parse(&["look.jpg", "--mock"]);
        let mut out = Vec::new();
        run(args, Config::default(), &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "goth style\n");
    }

    #[tokio::test]
    async fn test_missing_model_writes_nothing() {
        let (_dir, config) = empty_model_dir();
        let args = parse(&["/definitely/not/here.jpg"]);
        let mut out = Vec::new();
        let err = run(args, config, &mut out).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<stylescope_core::ClassifyError>(),
            Some(stylescope_core::ClassifyError::ModelUnavailable { .. })
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_mock_without_dominant_value_writes_nothing() {
        let mut config = Config::default();
        config.mock.dominant_probability = 0.3;
        let args = parse(&["look.jpg", "--mock"]);
        let mut out = Vec::new();
        assert!(run(args, config, &mut out).await.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_mode_maps_to_core() {
        assert_eq!(ClassifyMode::from(ModeArg::Dominant), ClassifyMode::DominantLabel);
        assert_eq!(
            ClassifyMode::from(ModeArg::Distribution),
            ClassifyMode::FullDistribution
        );
    }
}
