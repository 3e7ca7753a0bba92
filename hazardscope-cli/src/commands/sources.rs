//! Sources command - list configured report sources in report order.

use hazardscope::config::{SourceKindSettings, SourceSettings};

use crate::error::CliError;
use crate::runner::GlobalOptions;

/// Run the sources command.
pub fn run(options: &GlobalOptions) -> Result<(), CliError> {
    let config = options.load_config()?;

    if config.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Report Sources ({})", config.sources.len());
    println!("==================");
    println!();

    for (index, source) in config.sources.iter().enumerate() {
        for line in describe(index, source) {
            println!("{}", line);
        }
        println!();
    }

    Ok(())
}

/// Display lines for one source.
fn describe(index: usize, source: &SourceSettings) -> Vec<String> {
    let mut lines = vec![format!(
        "{}. {} [{}] ({})",
        index + 1,
        source.label,
        source.id,
        source.kind.keyword()
    )];

    match &source.kind {
        SourceKindSettings::Polygon(polygon) => {
            lines.push(format!("   url:   {}", polygon.url));
            lines.push(format!("   field: {}", polygon.field));
            if let Some(where_clause) = &polygon.where_clause {
                lines.push(format!("   where: {}", where_clause));
            }
        }
        SourceKindSettings::Raster(raster) => {
            let extract: Vec<_> = raster.extract.iter().map(|s| s.keyword()).collect();
            lines.push(format!("   url:        {}", raster.url));
            lines.push(format!("   endpoint:   {}", raster.endpoint.keyword()));
            lines.push(format!("   extract:    {}", extract.join(", ")));
            lines.push(format!("   classifier: {}", raster.classifier));
        }
        SourceKindSettings::Static { text } => {
            lines.push(format!("   text:  {}", text));
        }
    }

    lines
}
