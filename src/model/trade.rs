use std::fmt;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;

use crate::error::{EvQuantError, Result};
use crate::model::Stock;
use crate::portfolio::Portfolio;

#[derive(Debug, Clone)]
/// 成交指令
///
/// 指向一个组合和一个标的, 带符号数量。不保存价格:
/// 成交金额在执行时按标的当前价格计算。
pub struct Trade {
    portfolio: Arc<RwLock<Portfolio>>,
    asset: Arc<RwLock<Stock>>,
    units: Decimal,
}

impl Trade {
    /// 创建成交指令
    pub fn new(
        portfolio: Arc<RwLock<Portfolio>>,
        asset: Arc<RwLock<Stock>>,
        units: Decimal,
    ) -> Self {
        Trade {
            portfolio,
            asset,
            units,
        }
    }

    pub fn portfolio(&self) -> &Arc<RwLock<Portfolio>> {
        &self.portfolio
    }

    pub fn asset(&self) -> &Arc<RwLock<Stock>> {
        &self.asset
    }

    pub fn units(&self) -> Decimal {
        self.units
    }

    /// 执行成交: 以标的当前价格对组合做复式记账
    ///
    /// 价格未知时报错, 组合不发生任何变化。
    pub fn execute(&self) -> Result<()> {
        let (symbol, price) = {
            let asset = self.asset.read().unwrap();
            (asset.symbol().to_string(), asset.price())
        };
        let price = price.ok_or(EvQuantError::MissingPrice(symbol.clone()))?;
        self.portfolio
            .write()
            .unwrap()
            .apply_trade(&symbol, self.units, price);
        Ok(())
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade({}, '{}', {})",
            self.portfolio.read().unwrap(),
            self.asset.read().unwrap().symbol(),
            self.units.normalize()
        )
    }
}
