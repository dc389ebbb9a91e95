//! Handler for `jeka tree`.

use miette::Result;

use jeka_ops::ops_tree::{self, TreeOptions};
use jeka_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, depth: Option<u32>, assert_no_error: bool, json: bool) -> Result<()> {
    let opts = TreeOptions {
        resolve,
        depth: depth.map(|d| d as usize),
        assert_no_error,
        json,
    };
    ops_tree::tree(&opts)
}
