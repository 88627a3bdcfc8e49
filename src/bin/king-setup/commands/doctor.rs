//! `king-setup doctor` command

use anyhow::{bail, Result};

use crate::cli::DoctorArgs;
use king_setup::ops::{doctor, format_report};
use king_setup::GlobalContext;

pub fn execute(_args: DoctorArgs, verbose: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let report = doctor(&ctx)?;

    print!("{}", format_report(&report, verbose));

    if !report.all_required_passed() {
        bail!(
            "{} required check(s) failed",
            report.required_failed_count()
        );
    }

    Ok(())
}
