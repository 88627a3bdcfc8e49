//! `king-setup build-ext` command

use anyhow::Result;

use crate::cli::BuildExtArgs;
use king_setup::ops::{build_ext, BuildExtOptions};
use king_setup::GlobalContext;

pub fn execute(args: BuildExtArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let opts = BuildExtOptions {
        inplace: args.inplace,
        force: args.force,
        plan_only: args.plan,
    };

    let result = build_ext(&ctx, &opts)?;

    if args.plan {
        println!("{}", serde_json::to_string_pretty(&result.plan)?);
        return Ok(());
    }

    if let Some(copy) = result.inplace_copy {
        println!("{}", copy.display());
    } else {
        println!("{}", result.plan.artifact.display());
    }

    Ok(())
}
