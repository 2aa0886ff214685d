use crate::{Elapsed, Error, ReadTimes, Result, Series};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

pub const IMAGE_SIZE: (u32, u32) = (800, 600);

impl ReadTimes {
    /// plots the avg read time of every window against elapsed seconds, one series per job
    pub fn plot_scatter(&self, fout: &Path) -> Result<()> {
        let series = self.series(Elapsed::default())?;
        draw_scatter(&series, fout)
    }
}

/// Renders to a temporary png next to `fout` and renames it into place,
/// so `fout` is either the complete image or untouched.
pub fn draw_scatter(series: &[Series], fout: &Path) -> Result<()> {
    let dir = match fout.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".readlat")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;
    draw_png(series, tmp.path()).map_err(|e| Error::Render(e.to_string()))?;
    tmp.persist(fout).map_err(|e| Error::Persist {
        path: fout.to_path_buf(),
        source: e.error,
    })?;
    info!("plot written to {}", fout.display());
    Ok(())
}

fn draw_png(series: &[Series], fpng: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let xmax = upper_bound(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let ymax = upper_bound(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let root = BitMapBackend::new(fpng, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    // both axes start at zero whatever the data
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..xmax, 0f64..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style(("sans-serif", 16))
        .x_desc("seconds")
        .y_desc("read time (µs)")
        .draw()?;
    for (i, s) in series.iter().enumerate() {
        let style = Palette99::pick(i).stroke_width(1);
        chart.draw_series(s.points.iter().map(|&p| Cross::new(p, 4, style)))?;
    }
    root.present()?;
    Ok(())
}

/// 5% headroom over the largest value, 1 when there is nothing positive to show
fn upper_bound<I: Iterator<Item = f64>>(values: I) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    if max > 0. {
        max * 1.05
    } else {
        1.
    }
}
