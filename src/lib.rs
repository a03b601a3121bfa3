//! Process and resource console: list, filter, start, search and kill
//! processes, inspect memory, disks and sockets, and watch live CPU and
//! memory charts.

pub mod config;
pub mod console;
pub mod control;
pub mod event;
pub mod filter;
pub mod format;
pub mod logging;
pub mod sampling;
pub mod system;
pub mod table;
pub mod terminal;
pub mod ui;
