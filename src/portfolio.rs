use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;

use crate::error::{EvQuantError, Result};
use crate::model::validate_currency_code;

#[derive(Debug, Clone)]
/// 投资组合
///
/// 持仓台账: symbol -> 数量, 现金以货币代码为键记在同一张表里。
/// 未知 symbol 的持仓视为零。
pub struct Portfolio {
    base_currency: String,
    holdings: HashMap<String, Decimal>,
}

impl Portfolio {
    /// 创建投资组合
    pub fn new(base_currency: &str) -> Result<Self> {
        validate_currency_code(base_currency)?;
        Ok(Portfolio {
            base_currency: base_currency.to_string(),
            holdings: HashMap::new(),
        })
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// 获取持仓数量 (未知 symbol 返回零)
    pub fn get_holding_units(&self, symbol: &str) -> Decimal {
        self.holdings.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// 调整某个 symbol 的持仓
    pub fn adjust_holding(&mut self, symbol: &str, units: Decimal) {
        let entry = self
            .holdings
            .entry(symbol.to_string())
            .or_insert(Decimal::ZERO);
        *entry += units;
    }

    /// 应用成交: 资产腿 + 现金腿的复式记账
    ///
    /// 持仓按带符号数量增加, 基础货币现金按 units * price 减少。
    pub fn apply_trade(&mut self, symbol: &str, units: Decimal, price: Decimal) {
        self.adjust_holding(symbol, units);
        let cash_code = self.base_currency.clone();
        self.adjust_holding(&cash_code, -(units * price));
    }

    pub fn holdings(&self) -> &HashMap<String, Decimal> {
        &self.holdings
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Portfolio('{}')", self.base_currency)
    }
}

/// 组合注册表
///
/// 显式句柄而非全局状态; reset 用于测试隔离。
#[derive(Default)]
pub struct PortfolioRegistry {
    portfolios: HashMap<String, Arc<RwLock<Portfolio>>>,
}

impl PortfolioRegistry {
    pub fn new() -> Self {
        PortfolioRegistry {
            portfolios: HashMap::new(),
        }
    }

    /// 注册组合, 代码重复时报错
    pub fn register(&mut self, code: &str, portfolio: Arc<RwLock<Portfolio>>) -> Result<()> {
        if self.portfolios.contains_key(code) {
            return Err(EvQuantError::DuplicatePortfolio(code.to_string()));
        }
        self.portfolios.insert(code.to_string(), portfolio);
        Ok(())
    }

    /// 按代码查找组合
    pub fn get(&self, code: &str) -> Option<Arc<RwLock<Portfolio>>> {
        self.portfolios.get(code).cloned()
    }

    /// 清空注册表
    pub fn reset(&mut self) {
        self.portfolios.clear();
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }
}
