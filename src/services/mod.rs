//! 服务层模块
//!
//! 构建-发布周期的业务逻辑

pub mod build;
