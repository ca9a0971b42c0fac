pub mod controls;
pub mod help;
pub mod prediction_panel;
pub mod scatter_chart;
pub mod trend_chart;
