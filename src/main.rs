//! zotero-mirror: mirror a Zotero collection hierarchy onto the filesystem.

use anyhow::Result;

fn main() -> Result<()> {
    zotero_mirror::cli::run()
}
