// ui/styles.rs
use crossterm::style::Color;

// Result lines
pub const SUCCESS_COLOR: Color = Color::Green;
pub const WARNING_COLOR: Color = Color::Yellow;
pub const ERROR_COLOR: Color = Color::Red;

// Tables
pub const HEADER_COLOR: Color = Color::Cyan;
pub const CURRENT_COLOR: Color = Color::Green;
