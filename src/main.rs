//! CLI entry point for building swatch mosaics

use blockmap::io::cli::{Cli, MosaicProcessor, setup_logging};
use clap::Parser;

fn main() -> blockmap::Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(cli.log_level())?;
    let processor = MosaicProcessor::new(cli);
    processor.process()
}
