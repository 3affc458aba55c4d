use anyhow::Result;
use tracing::info;

use crate::cli::{ClassifyArgs, Cli};
use crate::common::prepare_output_file;
use crate::config::Config;
use crate::io::{read_cells, write_classification_csv, write_classification_geojson, Crosswalk};
use crate::pipeline::Pipeline;

pub fn run(_cli: &Cli, args: &ClassifyArgs) -> Result<()> {
    // Check every output before doing any work
    prepare_output_file(&args.output, args.force)?;
    if let Some(path) = &args.geojson { prepare_output_file(path, args.force)?; }

    let config = match &args.config {
        Some(path) => Config::read(path)?,
        None => Config::default(),
    };
    let pipeline = Pipeline::new(&config)?;

    info!("[classify] cells={} -> {}", args.cells.display(), args.output.display());
    let mut cells = read_cells(&args.cells, &config.fields)?;

    if let (Some(path), Some(key)) = (&args.crosswalk, &args.crosswalk_key) {
        let joined = Crosswalk::read(path, key)?.apply(&mut cells);
        info!("[classify] crosswalk {} joined onto {joined} cells", path.display());
    }

    let classification = pipeline.run(cells)?;

    write_classification_csv(&classification, &args.output)?;
    if let Some(path) = &args.geojson { write_classification_geojson(&classification, path)?; }

    for (category, totals) in classification.summary() {
        info!("[classify] {category}: {} cells, pop {}", totals.cells, totals.pop);
    }
    let diagnostics = classification.diagnostics();
    println!(
        "Classified {} cells -> {} ({} no data, {} invalid geometry, {} degenerate, {} overridden)",
        classification.len(),
        args.output.display(),
        diagnostics.no_data.len(),
        diagnostics.invalid_geometry().count(),
        diagnostics.degenerate_area().count(),
        diagnostics.overridden.len(),
    );
    Ok(())
}
