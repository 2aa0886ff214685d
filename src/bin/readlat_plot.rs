use anyhow::Result;
use readlat::plot::parse_cli;
use readlat::ReadTimes;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let (csvin, pngout) = parse_cli();
    info!(
        "read data from {} and plot to {}",
        csvin.display(),
        pngout.display()
    );
    let rt = ReadTimes::from_csv(&csvin)?;
    rt.plot_scatter(&pngout)?;
    Ok(())
}
