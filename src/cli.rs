use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Community classification from local population density
#[derive(Parser, Debug)]
#[command(name = "densitas", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the cells of a GeoJSON file (forbids stdout)
    Classify(ClassifyArgs),

    /// Validate a configuration file and print it with defaults filled in
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Input cells (GeoJSON FeatureCollection of polygons)
    #[arg(value_hint = ValueHint::FilePath)]
    pub cells: PathBuf,

    /// JSON configuration (built-in defaults if omitted)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// CSV of extra attributes joined onto cells by id
    #[arg(long, value_hint = ValueHint::FilePath, requires = "crosswalk_key")]
    pub crosswalk: Option<PathBuf>,

    /// Cell-id column of the crosswalk table
    #[arg(long, requires = "crosswalk")]
    pub crosswalk_key: Option<String>,

    /// Output table (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Also write a labeled GeoJSON file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub geojson: Option<PathBuf>,

    /// Overwrite output files if they exist
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Configuration file to validate
    #[arg(value_hint = ValueHint::FilePath)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_classify() {
        let cli = Cli::try_parse_from([
            "densitas", "-vv", "classify", "cells.geojson", "-c", "config.json",
            "--crosswalk", "xw.csv", "--crosswalk-key", "cell", "-o", "out.csv", "--force",
        ]).unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Classify(args) = cli.command else { panic!("expected classify") };
        assert_eq!(args.cells, PathBuf::from("cells.geojson"));
        assert_eq!(args.crosswalk_key.as_deref(), Some("cell"));
        assert!(args.force);
        assert!(args.geojson.is_none());
    }

    #[test]
    fn crosswalk_needs_key() {
        assert!(Cli::try_parse_from(["densitas", "classify", "c.geojson", "--crosswalk", "x.csv", "-o", "o.csv"]).is_err());
    }
}
