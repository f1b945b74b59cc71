// 服务器模块入口
// 提供监听器创建、连接处理和优雅关闭功能

pub mod accept_loop;
pub mod connection;
pub mod listener;
pub mod signal;

pub use accept_loop::{start_server_loop, wait_for_connections};
pub use listener::bind_listener;
pub use signal::start_signal_handler;
