use clap::{command, Parser};

// Some defaults; some of which can be overriden via CLI args
const EMA_DATA_PATH: &str = "../TongueMocapData/ema/npy/0899.npy";
const INPUT_WAV_PATH: &str = "../TongueMocapData/wav/0899.wav";
const OUTPUT_SCENE_PATH: &str = "./0899.mb";
const CONFIG_FILE_PATH: &str = "./rig.json";

#[derive(Parser, Debug)]
#[command(version, about = "Generates and renders a mouth rig from input data", long_about = None)]
pub struct Cli {
    /// Input EMA data (.npy, or delimited text) used to build the rig
    #[arg(long = "emaData", default_value_t = String::from(EMA_DATA_PATH))]
    pub ema_data: String,

    /// Reference audio muxed into the final video
    #[arg(long = "inputWav", default_value_t = String::from(INPUT_WAV_PATH))]
    pub input_wav: String,

    /// Where the host saves the animated scene
    #[arg(long = "outputMb", default_value_t = String::from(OUTPUT_SCENE_PATH))]
    pub output_mb: String,

    /// Render/encode settings; defaults are used if the file is missing
    #[arg(long = "configPath", default_value_t = String::from(CONFIG_FILE_PATH))]
    pub config_path: String,

    /// Write the effective config back to configPath (creates it with defaults)
    #[arg(long = "writeConfig")]
    pub write_config: bool,

    #[arg(long = "loglevel", default_value_t = String::from("info"))]
    pub log_level: String,

    /// Fail on NaN or infinite samples instead of passing them through
    #[arg(long = "strict")]
    pub strict: bool,

    /// Centre each part on its own mean instead of the pooled mean
    #[arg(long = "perPartDemean")]
    pub per_part_demean: bool,

    /// Where to write the host script; defaults to the scene path with .mel
    #[arg(long = "scriptOut")]
    pub script_out: Option<String>,

    /// Also export the computed keyframes (.json, or .msgpack)
    #[arg(long = "keyframesOut")]
    pub keyframes_out: Option<String>,

    /// Host executable; if given, the script is run in batch mode
    #[arg(long = "mayaBin")]
    pub maya_bin: Option<String>,

    /// Skip encoding and muxing the rendered frames
    #[arg(long = "skipEncode")]
    pub skip_encode: bool,
}
