//! Display module for formatted CLI output

pub mod colors;
pub mod events;
pub mod icons;
pub mod table;

pub use colors::ColorTheme;
pub use events::{render_diff, EventPrinter};
pub use icons::StatusIcon;
pub use table::TableRenderer;
