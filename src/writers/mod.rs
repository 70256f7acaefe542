pub mod chart_writer;
pub mod figures;

pub use chart_writer::{render_text, ChartWriter, DashboardIndex, CONCLUSIONS};
pub use figures::Figure;
