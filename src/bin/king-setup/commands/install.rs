//! `king-setup install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use king_setup::ops::{install, InstallOptions};
use king_setup::GlobalContext;

pub fn execute(args: InstallArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let opts = InstallOptions {
        root: args.root,
        prefix: args.prefix,
        target_dir: args.target_dir,
        dry_run: args.dry_run,
        force: args.force,
    };

    let copies = install(&ctx, &opts)?;

    for copy in &copies {
        if opts.dry_run {
            println!(
                "would install {} -> {}",
                copy.source.display(),
                copy.destination().display()
            );
        } else {
            println!("{}", copy.destination().display());
        }
    }

    Ok(())
}
