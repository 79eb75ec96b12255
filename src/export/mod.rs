//! Export of compressed outputs: file naming, archive packing and delivery.

mod naming;
mod packager;
mod sink;

pub use naming::{NameParts, apply_naming_pattern, random_suffix, render_name};
pub use packager::{Download, ExportPackager, ZIP_MIME};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
