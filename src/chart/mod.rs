pub mod composer;
pub mod spec;

pub use composer::{compose, ComposeOptions, OverlayInput, PanelInput};
pub use spec::{ChartSpec, Dash, LineStyle};
