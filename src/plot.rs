use super::VERSION;
use clap::{App, Arg};
use std::path::{Path, PathBuf};

/// The clap app of the plot binary: a single positional csv path.
pub fn app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("csv file with job,start,avg,p50,p90,p99 rows after a header line")
        .index(1)
        .required(true);
    App::new("readlat_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the read time windows of each job")
        .arg(arg_csvin)
}

/// Takes the CLI argument for the input csv and derives the png path from it.
pub fn parse_cli() -> (PathBuf, PathBuf) {
    let cli_args = app().get_matches();
    let csvin = PathBuf::from(cli_args.value_of("input_csvfile").unwrap_or_default());
    let pngout = png_path(&csvin);
    (csvin, pngout)
}

/// Replaces the first ".csv" in the path with ".png".
/// A path without ".csv" comes back unchanged.
pub fn png_path(csvin: &Path) -> PathBuf {
    PathBuf::from(csvin.to_string_lossy().replacen(".csv", ".png", 1))
}
