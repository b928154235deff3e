//! classwork - 学生作业同步核心
//!
//! 探究式学习平台的客户端侧作业同步层：节点级保存/提交编排、
//! 自动保存、讨论区的班级回复同步与非破坏性审核、回复通知分发。
//!
//! 模块划分：
//! - **config**: 配置加载（文件 + 环境变量）
//! - **error**: 同步层错误定义
//! - **model**: 数据模型（组件状态、节点内容、批注、通知）
//! - **services**: 协作方接口与进程内实现（存储、名册、批注、通知）
//! - **node**: 节点编排器、脏集合、自动保存、连接组件
//! - **discussion**: 讨论组件控制器、讨论串索引、通知分发
//! - **push**: 推送通道抽象与进程内实现
//! - **observability**: 日志初始化

pub mod config;
pub mod discussion;
pub mod error;
pub mod model;
pub mod node;
pub mod observability;
pub mod push;
pub mod services;

pub use error::SyncError;
