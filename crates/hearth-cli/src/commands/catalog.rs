//! Catalog command implementation.

use crate::error::Result;
use crate::output::Formatter;
use hearth_detector::RelationshipCatalog;

/// Execute the catalog command.
pub async fn execute_catalog(formatter: &Formatter) -> Result<()> {
    let catalog = RelationshipCatalog::default_catalog();
    println!("{}", formatter.format_catalog(catalog.rules())?);
    Ok(())
}
