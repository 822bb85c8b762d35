pub mod bar;
pub mod bar_series;
pub mod date_range;
pub mod ma_windows;
pub mod ticker;
