use std::{env, fs::File, io::BufWriter};

use anyhow::Context;
use env_logger::Env;
use log::info;

use gaussian_gan::{GanConfig, GanTrainer, data::write_samples_csv, stats};

const CONFIG_VAR: &str = "GAN_CONFIG";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = env::args().nth(1).or_else(|| env::var(CONFIG_VAR).ok());
    let config = match path {
        Some(path) => {
            info!("loading config from {path}");
            GanConfig::from_json_file(&path)
                .with_context(|| format!("failed to load config from {path}"))?
        }
        None => {
            info!("no config given, using defaults");
            GanConfig::default()
        }
    };

    let mut trainer = GanTrainer::from_config(&config).context("failed to build the gan")?;
    let report = trainer.train().context("training failed")?;

    let (w, b) = trainer.gan().generator().affine()?;
    info!(
        "generator weights={} bias={b}, target covariance={}",
        w.to_string().replace('\n', ""),
        trainer.source().covariance().to_string().replace('\n', "")
    );
    info!(
        "generator covariance Wᵀ·W={}",
        w.t().dot(&w).to_string().replace('\n', "")
    );

    if let (Some(out), Some(last)) = (&config.samples_out, report.last()) {
        let file = File::create(out)
            .with_context(|| format!("failed to create {}", out.display()))?;

        write_samples_csv(BufWriter::new(file), trainer.real_samples(), last.samples.view())
            .with_context(|| format!("failed to write samples to {}", out.display()))?;

        let real_mean = stats::mean(trainer.real_samples());
        info!("wrote samples to {} (real mean={real_mean})", out.display());
    }

    Ok(())
}
