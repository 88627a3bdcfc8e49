//! `king-setup flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use king_setup::ops::declare;
use king_setup::GlobalContext;

pub fn execute(args: FlagsArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let declaration = declare(&ctx)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(declaration.options())?);
        return Ok(());
    }

    println!("{}", declaration);
    for group in &declaration.data_files {
        println!(
            "# data files -> {}: {}",
            group.destination.display(),
            group.files.join(", ")
        );
    }

    Ok(())
}
