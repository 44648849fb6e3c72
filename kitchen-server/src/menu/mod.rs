//! 菜单模块
//!
//! 菜品增删改与菜单版本号 (事务内原子递增)

pub mod service;

pub use service::MenuService;
