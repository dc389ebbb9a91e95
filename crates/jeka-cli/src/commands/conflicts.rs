//! Handler for `jeka conflicts`.

use miette::Result;

use jeka_ops::ops_conflicts;
use jeka_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions) -> Result<()> {
    ops_conflicts::conflicts(&resolve)
}
