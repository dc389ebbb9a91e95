//! Handler for `jeka why`.

use miette::Result;

use jeka_ops::ops_why::{self, WhyOptions};
use jeka_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, module: String) -> Result<()> {
    ops_why::why(&WhyOptions { resolve, module })
}
