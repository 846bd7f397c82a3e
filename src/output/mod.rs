mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_summary;
pub use progress::FetchProgress;
use styling::{brand, label};
pub use summary::render_routes;

/// Prints the covhub banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("🧪 covhub"),
        label(env!("CARGO_PKG_VERSION")),
        label("Coverage aggregation hub")
    );
}
