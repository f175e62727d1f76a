//! Titles command implementation.

use anyhow::Result;
use xasset::title;

/// Print every supported title
pub fn run() -> Result<()> {
    for title in title::registry() {
        println!("{} ({})", title.name, title.id);
        println!("  processes: {}", title.process_names.join(", "));
        println!(
            "  layout: {:?}, {}-bit pointers, {} asset types",
            title.layout,
            title.pointer_width.size() * 8,
            title.asset_types.len()
        );
        for handler in title.handlers {
            println!(
                "  exports: {} ({}, type {}, header 0x{:X} bytes)",
                handler.display_name(),
                handler.type_name(),
                handler.type_index(),
                handler.header_size()
            );
        }
        println!();
    }
    Ok(())
}
