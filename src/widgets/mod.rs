pub mod charts;
pub mod controls;
pub mod debug;
pub mod home;
pub mod radio_block;
pub mod select_list;
pub mod sidebar;
pub mod slider;
