//! Text widgets over the engine.

pub mod menu_list;

pub use menu_list::{MenuList, MenuListTheme};
