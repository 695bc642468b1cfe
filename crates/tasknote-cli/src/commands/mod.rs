pub mod add;
pub mod delete;
pub mod done;
pub mod list;
pub mod preview;
pub mod show;
pub mod skip;
