//! Operation: report modules requested at several versions.

use crate::{project, ResolveOptions};

pub fn conflicts(opts: &ResolveOptions) -> miette::Result<()> {
    let result = project::resolve(opts)?;
    print!("{}", result.conflicts());
    if result.conflicts().is_empty() {
        println!();
    }
    Ok(())
}
