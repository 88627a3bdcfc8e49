//! `king-setup clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use king_setup::ops::clean;
use king_setup::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let removed = clean(&ctx, args.all)?;

    if removed.is_empty() {
        tracing::info!("nothing to clean");
    }

    Ok(())
}
