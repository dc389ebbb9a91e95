//! Handler for `jeka classpath`.

use miette::Result;

use jeka_ops::ops_classpath::{self, ClasspathOptions};
use jeka_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, separator: Option<String>) -> Result<()> {
    ops_classpath::classpath(&ClasspathOptions { resolve, separator })
}
