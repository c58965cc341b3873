pub mod favorites_list;
pub mod show_detail;
pub mod show_list;
