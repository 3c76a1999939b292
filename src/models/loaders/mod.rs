pub mod item_loader;

pub use item_loader::{load_items, load_list_file, load_manifest, scan_directory};
