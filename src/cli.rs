use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tablebox", version, about = "Browse JSON records in a terminal table")]
pub struct Args {
    /// JSON file with an array of records (or an object with --kv)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory screenshots are written to
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,

    /// Show a JSON object as a key/value table
    #[arg(long)]
    pub kv: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["tablebox", "--data", "rows.json", "--kv"]);
        assert_eq!(args.data, Some(PathBuf::from("rows.json")));
        assert!(args.kv);
        assert!(args.config.is_none());
    }
}
