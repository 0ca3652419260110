//! Local snapshot query command

use crate::cli::args::{GlobalOptions, LocalQueryArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::query::{self, LocalResponse, MediaFilter, PageWindow};
use crate::snapshot::{Collection, SnapshotStore};

/// Query a stored snapshot. Needs no credentials.
pub fn run(opts: &GlobalOptions, collection: Collection, args: &LocalQueryArgs) -> Result<()> {
    let config = Config::load_at(opts.config_ref())?;
    let store = SnapshotStore::new(config.snapshot_dir());
    let snapshot = store.load(collection.name());

    let params = args.to_params();
    let filter = MediaFilter::from_params(&params);
    let window = PageWindow::from_params(&params);
    let result = query::query(&snapshot, &filter, &window);

    log::debug!(
        "Local query on '{}': {} of {} matching items",
        collection,
        result.returned,
        result.total
    );

    match opts.format {
        OutputFormat::Json => output::print_json(&LocalResponse::new(&snapshot, window, &result)),
        OutputFormat::Table => {
            println!("{}", output::format_item_table(&result.items));
            println!(
                "{} of {} items (offset {}), snapshot updated {}",
                result.returned,
                result.total,
                window.offset,
                snapshot.updated_at.as_deref().unwrap_or("never")
            );
            Ok(())
        }
    }
}
