use anyhow::Result;
use std::path::Path;

use crate::load::required_inputs;

/// List every required input and whether it is present.
pub fn list_sources(db_dir: &Path, media_root: &Path) -> Result<()> {
    println!("{:<18} {:<10} PATH", "INPUT", "STATUS");
    for input in required_inputs(db_dir, media_root) {
        let status = if input.is_present() { "OK" } else { "MISSING" };
        println!("{:<18} {:<10} {}", input.name, status, input.path.display());
    }
    Ok(())
}
