use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::event::Event;
use crate::event_manager::EventQueue;

/// 回测驱动
///
/// 持有事件队列和时钟, 按时间顺序逐个处理事件。
/// 事件处理是单线程顺序执行的; 处理失败立即中止并上抛。
pub struct Engine {
    queue: EventQueue,
    clock: Clock,
    processed_count: usize,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            queue: EventQueue::new(),
            clock: Clock::new(),
            processed_count: 0,
        }
    }

    /// 加入待处理事件
    pub fn add_event(&mut self, event: impl Into<Event>) {
        self.queue.push(event);
    }

    /// 当前模拟时间
    pub fn current_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.clock.now()
    }

    /// 已处理事件数
    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// 待处理事件数
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// 处理下一个事件, 队列为空时返回 Ok(false)
    pub fn step(&mut self) -> Result<bool> {
        let Some(mut event) = self.queue.pop() else {
            return Ok(false);
        };
        self.clock.update(event.datetime());
        debug!(target: "evquant::engine", "processing {}", event);
        event.process()?;
        self.processed_count += 1;
        Ok(true)
    }

    /// 处理队列中的全部事件, 返回本次处理的事件数
    pub fn run(&mut self) -> Result<usize> {
        let mut count = 0;
        while self.step()? {
            count += 1;
        }
        info!(target: "evquant::engine", "run complete, {} events processed", count);
        Ok(count)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AssetPriceEvent, IndicatorEvent, TradeEvent};
    use crate::model::{Stock, Trade};
    use crate::portfolio::Portfolio;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::{Arc, RwLock};

    #[test]
    fn test_empty_run() {
        let mut engine = Engine::new();
        assert_eq!(engine.run().unwrap(), 0);
        assert_eq!(engine.current_time(), None);
    }

    #[test]
    fn test_run_processes_in_order() {
        let mut engine = Engine::new();
        let stock = Arc::new(RwLock::new(
            Stock::new("XYZ AU", Some(Decimal::from(1)), "AUD").unwrap(),
        ));
        let d1 = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2020, 9, 1, 10, 0, 0).unwrap();
        let d3 = Utc.with_ymd_and_hms(2020, 9, 1, 11, 0, 0).unwrap();

        // Added out of order; the latest price must win
        engine.add_event(AssetPriceEvent::new(Arc::clone(&stock), d3, Decimal::from(4)).unwrap());
        engine.add_event(AssetPriceEvent::new(Arc::clone(&stock), d1, Decimal::from(2)).unwrap());
        engine.add_event(AssetPriceEvent::new(Arc::clone(&stock), d2, Decimal::from(3)).unwrap());

        assert_eq!(engine.pending_count(), 3);
        assert_eq!(engine.run().unwrap(), 3);
        assert_eq!(engine.processed_count(), 3);
        assert_eq!(engine.pending_count(), 0);
        assert_eq!(engine.current_time(), Some(d3));
        assert_eq!(stock.read().unwrap().price(), Some(Decimal::from(4)));
    }

    #[test]
    fn test_price_then_trade_same_run() {
        let mut engine = Engine::new();
        let portfolio = Arc::new(RwLock::new(Portfolio::new("USD").unwrap()));
        let goog = Arc::new(RwLock::new(
            Stock::new("GOOG US", Some(Decimal::from(1500)), "USD").unwrap(),
        ));
        let d1 = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2020, 9, 1, 10, 0, 0).unwrap();

        // The price update lands before the trade, so the trade settles at 1600
        engine.add_event(
            AssetPriceEvent::new(Arc::clone(&goog), d1, Decimal::from(1600)).unwrap(),
        );
        engine.add_event(TradeEvent::new(
            d2,
            Trade::new(Arc::clone(&portfolio), Arc::clone(&goog), Decimal::from(10)),
        ));

        engine.run().unwrap();
        let p = portfolio.read().unwrap();
        assert_eq!(p.get_holding_units("GOOG US"), Decimal::from(10));
        assert_eq!(p.get_holding_units("USD"), Decimal::from(-16_000));
    }

    #[test]
    fn test_step() {
        let mut engine = Engine::new();
        let d = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        engine.add_event(IndicatorEvent::new("signal", d, true).unwrap());

        assert!(engine.step().unwrap());
        assert_eq!(engine.current_time(), Some(d));
        assert!(!engine.step().unwrap());
    }

    #[test]
    fn test_run_aborts_on_error() {
        let mut engine = Engine::new();
        let portfolio = Arc::new(RwLock::new(Portfolio::new("USD").unwrap()));
        let unpriced = Arc::new(RwLock::new(Stock::new("AAA US", None, "USD").unwrap()));
        let d1 = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2020, 9, 1, 10, 0, 0).unwrap();

        engine.add_event(TradeEvent::new(
            d1,
            Trade::new(portfolio, Arc::clone(&unpriced), Decimal::from(1)),
        ));
        engine.add_event(IndicatorEvent::new("after", d2, 1i64).unwrap());

        assert!(engine.run().is_err());
        // The failing event was consumed, the later one is still pending
        assert_eq!(engine.pending_count(), 1);
        assert_eq!(engine.processed_count(), 0);
    }
}
