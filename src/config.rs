use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// IPL second-innings win probability predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-win-predictor", version, about)]
pub struct Config {
    /// Address the prediction form listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8501")]
    pub listen_addr: String,

    /// Exported classifier artifact (JSON)
    #[arg(long, env = "MODEL_PATH", default_value = "models/pipe.json")]
    pub model_path: PathBuf,

    /// Directory holding team and league logo assets
    #[arg(long, env = "LOGOS_DIR", default_value = "logos")]
    pub logos_dir: PathBuf,

    /// Ignore the artifact's Platt calibration and serve raw probabilities
    #[arg(long, env = "NO_CALIBRATION", default_value = "false")]
    pub no_calibration: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr '{}' is not a valid socket address (e.g. 0.0.0.0:8501)",
                self.listen_addr
            );
        }
        if !self.model_path.is_file() {
            anyhow::bail!(
                "model artifact not found at {}. Set MODEL_PATH or --model-path.",
                self.model_path.display()
            );
        }
        Ok(())
    }
}
