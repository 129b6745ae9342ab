use clap::{command, Parser};

const EMA_DATA_PATH: &str = "TongueMocapData/ema/npy/0899.npy";
const CONFIG_FILE_PATH: &str = "./rig.json";

#[derive(Parser, Debug)]
#[command(version, about = "Plots EMA sensor trajectories", long_about = None)]
pub struct Cli {
    /// EMA data (.npy, or delimited text) to inspect
    #[arg(long = "emaData", default_value_t = String::from(EMA_DATA_PATH))]
    pub ema_data: String,

    /// Only the part colours are used from this config
    #[arg(long = "configPath", default_value_t = String::from(CONFIG_FILE_PATH))]
    pub config_path: String,

    /// Part shown first
    #[arg(long = "part", default_value_t = String::from("td"))]
    pub part: String,

    /// Plot raw sensor-space positions instead of demeaned, reprojected ones
    #[arg(long = "raw")]
    pub raw: bool,

    #[arg(long = "loglevel", default_value_t = String::from("info"))]
    pub log_level: String,
}
