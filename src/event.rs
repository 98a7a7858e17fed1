use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EvQuantError, Result};
use crate::model::{FxRate, Stock, Trade};

/// 事件时间戳的规范文本形式
///
/// 格式: YYYY-MM-DD HH:MM:SS, 亚秒部分为零时不显示。
pub(crate) fn format_event_datetime(datetime: DateTime<Utc>) -> String {
    if datetime.nanosecond() == 0 {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// 指标事件携带的值
pub enum IndicatorValue {
    Integer(i64),
    Number(Decimal),
    Text(String),
    Boolean(bool),
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Text renders unquoted in the canonical event form
            IndicatorValue::Integer(i) => write!(f, "{}", i),
            IndicatorValue::Number(d) => write!(f, "{}", d.normalize()),
            IndicatorValue::Text(s) => write!(f, "{}", s),
            IndicatorValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for IndicatorValue {
    fn from(value: i64) -> Self {
        IndicatorValue::Integer(value)
    }
}

impl From<Decimal> for IndicatorValue {
    fn from(value: Decimal) -> Self {
        IndicatorValue::Number(value)
    }
}

impl From<&str> for IndicatorValue {
    fn from(value: &str) -> Self {
        IndicatorValue::Text(value.to_string())
    }
}

impl From<String> for IndicatorValue {
    fn from(value: String) -> Self {
        IndicatorValue::Text(value)
    }
}

impl From<bool> for IndicatorValue {
    fn from(value: bool) -> Self {
        IndicatorValue::Boolean(value)
    }
}

#[derive(Debug, Clone)]
/// 事件公共状态
///
/// 时间戳构造后不再变化; processed 只能经由 process() 从 false
/// 单向翻转到 true。
struct EventCore {
    datetime: DateTime<Utc>,
    processed: bool,
}

impl EventCore {
    fn new(datetime: DateTime<Utc>) -> Self {
        EventCore {
            datetime,
            processed: false,
        }
    }

    /// 已处理过的事件拒绝再次处理
    fn guard(&self) -> Result<()> {
        if self.processed {
            return Err(EvQuantError::AlreadyProcessed);
        }
        Ok(())
    }

    fn mark_processed(&mut self) {
        self.processed = true;
    }
}

#[derive(Debug)]
/// 资产价格事件
///
/// 处理时把标的的当前价格更新为 event_value。
/// 价格必须严格为正, 构造时校验。
pub struct AssetPriceEvent {
    core: EventCore,
    asset: Arc<RwLock<Stock>>,
    event_value: Decimal,
}

impl AssetPriceEvent {
    /// 创建价格事件
    pub fn new(
        asset: Arc<RwLock<Stock>>,
        datetime: DateTime<Utc>,
        event_value: Decimal,
    ) -> Result<Self> {
        if event_value <= Decimal::ZERO {
            return Err(EvQuantError::InvalidEventValue(format!(
                "asset price must be positive, got {}",
                event_value
            )));
        }
        Ok(AssetPriceEvent {
            core: EventCore::new(datetime),
            asset,
            event_value,
        })
    }

    pub fn asset(&self) -> &Arc<RwLock<Stock>> {
        &self.asset
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.core.datetime
    }

    pub fn event_value(&self) -> Decimal {
        self.event_value
    }

    pub fn processed(&self) -> bool {
        self.core.processed
    }

    /// 处理事件 (仅允许一次)
    pub fn process(&mut self) -> Result<()> {
        self.core.guard()?;
        self.asset.write().unwrap().set_price(self.event_value)?;
        self.core.mark_processed();
        Ok(())
    }
}

impl fmt::Display for AssetPriceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AssetPriceEvent({}, {}, {})",
            self.asset.read().unwrap(),
            format_event_datetime(self.core.datetime),
            self.event_value.normalize()
        )
    }
}

#[derive(Debug)]
/// 汇率事件
///
/// 处理时把汇率持有者的当前汇率更新为 event_value。
/// 汇率不作正负约束。
pub struct FxRateEvent {
    core: EventCore,
    fx_rate: Arc<RwLock<FxRate>>,
    event_value: Decimal,
}

impl FxRateEvent {
    /// 创建汇率事件
    pub fn new(
        fx_rate: Arc<RwLock<FxRate>>,
        datetime: DateTime<Utc>,
        event_value: Decimal,
    ) -> Self {
        FxRateEvent {
            core: EventCore::new(datetime),
            fx_rate,
            event_value,
        }
    }

    pub fn fx_rate(&self) -> &Arc<RwLock<FxRate>> {
        &self.fx_rate
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.core.datetime
    }

    pub fn event_value(&self) -> Decimal {
        self.event_value
    }

    pub fn processed(&self) -> bool {
        self.core.processed
    }

    /// 处理事件 (仅允许一次)
    pub fn process(&mut self) -> Result<()> {
        self.core.guard()?;
        self.fx_rate.write().unwrap().set_rate(self.event_value);
        self.core.mark_processed();
        Ok(())
    }
}

impl fmt::Display for FxRateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FxRateEvent('{}', {}, {})",
            self.fx_rate.read().unwrap().pair(),
            format_event_datetime(self.core.datetime),
            self.event_value.normalize()
        )
    }
}

#[derive(Debug)]
/// 成交事件
///
/// 处理时委托给成交指令自身的记账行为:
/// 持仓按带符号数量增加, 现金按数量乘以处理时的标的价格减少。
pub struct TradeEvent {
    core: EventCore,
    event_value: Trade,
}

impl TradeEvent {
    /// 创建成交事件
    pub fn new(datetime: DateTime<Utc>, event_value: Trade) -> Self {
        TradeEvent {
            core: EventCore::new(datetime),
            event_value,
        }
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.core.datetime
    }

    pub fn event_value(&self) -> &Trade {
        &self.event_value
    }

    pub fn processed(&self) -> bool {
        self.core.processed
    }

    /// 处理事件 (仅允许一次)
    ///
    /// 记账失败 (如标的价格未知) 时事件保持未处理状态。
    pub fn process(&mut self) -> Result<()> {
        self.core.guard()?;
        self.event_value.execute()?;
        self.core.mark_processed();
        Ok(())
    }
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TradeEvent({}, {})",
            format_event_datetime(self.core.datetime),
            self.event_value
        )
    }
}

#[derive(Debug)]
/// 指标事件
///
/// 可选的校验函数在构造时调用一次, 其错误原样作为构造失败返回。
/// 独立处理时不产生任何外部状态变化。
pub struct IndicatorEvent {
    core: EventCore,
    indicator_name: String,
    event_value: IndicatorValue,
}

impl IndicatorEvent {
    /// 创建指标事件
    pub fn new(
        indicator_name: &str,
        datetime: DateTime<Utc>,
        event_value: impl Into<IndicatorValue>,
    ) -> Result<Self> {
        if indicator_name.trim().is_empty() {
            return Err(EvQuantError::InvalidIndicatorName(
                indicator_name.to_string(),
            ));
        }
        Ok(IndicatorEvent {
            core: EventCore::new(datetime),
            indicator_name: indicator_name.to_string(),
            event_value: event_value.into(),
        })
    }

    /// 创建指标事件并在构造时校验取值
    pub fn with_validation<F>(
        indicator_name: &str,
        datetime: DateTime<Utc>,
        event_value: impl Into<IndicatorValue>,
        validate: F,
    ) -> Result<Self>
    where
        F: Fn(&IndicatorValue) -> Result<()>,
    {
        let event_value = event_value.into();
        validate(&event_value)?;
        Self::new(indicator_name, datetime, event_value)
    }

    pub fn indicator_name(&self) -> &str {
        &self.indicator_name
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.core.datetime
    }

    pub fn event_value(&self) -> &IndicatorValue {
        &self.event_value
    }

    pub fn processed(&self) -> bool {
        self.core.processed
    }

    /// 处理事件 (仅允许一次)
    ///
    /// 没有宿主回测时是受保护的空操作, 仍然翻转 processed 并返回成功;
    /// 对指标值的响应由驱动方负责。
    pub fn process(&mut self) -> Result<()> {
        self.core.guard()?;
        self.core.mark_processed();
        Ok(())
    }
}

impl fmt::Display for IndicatorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndicatorEvent('{}', {}, {})",
            self.indicator_name,
            format_event_datetime(self.core.datetime),
            self.event_value
        )
    }
}

#[derive(Debug)]
/// 事件 (封闭变体集)
pub enum Event {
    AssetPrice(AssetPriceEvent),
    FxRate(FxRateEvent),
    Trade(TradeEvent),
    Indicator(IndicatorEvent),
}

impl Event {
    pub fn datetime(&self) -> DateTime<Utc> {
        match self {
            Event::AssetPrice(e) => e.datetime(),
            Event::FxRate(e) => e.datetime(),
            Event::Trade(e) => e.datetime(),
            Event::Indicator(e) => e.datetime(),
        }
    }

    pub fn processed(&self) -> bool {
        match self {
            Event::AssetPrice(e) => e.processed(),
            Event::FxRate(e) => e.processed(),
            Event::Trade(e) => e.processed(),
            Event::Indicator(e) => e.processed(),
        }
    }

    /// 处理事件 (仅允许一次)
    pub fn process(&mut self) -> Result<()> {
        match self {
            Event::AssetPrice(e) => e.process(),
            Event::FxRate(e) => e.process(),
            Event::Trade(e) => e.process(),
            Event::Indicator(e) => e.process(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::AssetPrice(e) => e.fmt(f),
            Event::FxRate(e) => e.fmt(f),
            Event::Trade(e) => e.fmt(f),
            Event::Indicator(e) => e.fmt(f),
        }
    }
}

impl From<AssetPriceEvent> for Event {
    fn from(event: AssetPriceEvent) -> Self {
        Event::AssetPrice(event)
    }
}

impl From<FxRateEvent> for Event {
    fn from(event: FxRateEvent) -> Self {
        Event::FxRate(event)
    }
}

impl From<TradeEvent> for Event {
    fn from(event: TradeEvent) -> Self {
        Event::Trade(event)
    }
}

impl From<IndicatorEvent> for Event {
    fn from(event: IndicatorEvent) -> Self {
        Event::Indicator(event)
    }
}
