//! 事件驱动的回测核心
//!
//! 一组封闭的不可变市场事件 (价格/汇率/成交/指标), 构造时校验输入,
//! 处理时对资产、汇率和投资组合施加一次性的状态变更,
//! 以及按时间顺序分发事件的驱动引擎。

pub mod clock;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_manager;
pub mod logging;
pub mod model;
pub mod portfolio;

pub use clock::Clock;
pub use engine::Engine;
pub use error::{EvQuantError, Result};
pub use event::{
    AssetPriceEvent, Event, FxRateEvent, IndicatorEvent, IndicatorValue, TradeEvent,
};
pub use event_manager::EventQueue;
pub use model::{FxRate, Stock, Trade};
pub use portfolio::{Portfolio, PortfolioRegistry};
