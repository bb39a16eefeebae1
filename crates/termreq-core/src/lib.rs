pub mod help_popup;
pub mod keybinds;
pub mod logging;
pub mod text_buffer;
pub mod tool;
pub mod ui;
