use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EvQuantError, Result};

/// 校验货币代码 (3 位大写字母, 如 "USD")
pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(EvQuantError::InvalidCurrency(code.to_string()))
    }
}

/// 校验货币对 (6 位大写字母, 如 "AUDNZD")
pub fn validate_currency_pair(pair: &str) -> Result<()> {
    if pair.len() == 6 && pair.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(EvQuantError::InvalidPair(pair.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// 股票标的
///
/// 持有当前价格, 由价格事件在处理时更新。
/// 价格允许初始未知 (None), 已知时必须为正。
pub struct Stock {
    symbol: String,
    price: Option<Decimal>,
    currency_code: String,
}

impl Stock {
    /// 创建股票标的
    pub fn new(symbol: &str, price: Option<Decimal>, currency_code: &str) -> Result<Self> {
        if symbol.trim().is_empty() {
            return Err(EvQuantError::InvalidSymbol(symbol.to_string()));
        }
        validate_currency_code(currency_code)?;
        if let Some(p) = price {
            if p <= Decimal::ZERO {
                return Err(EvQuantError::InvalidEventValue(format!(
                    "stock price must be positive, got {}",
                    p
                )));
            }
        }
        Ok(Stock {
            symbol: symbol.to_string(),
            price,
            currency_code: currency_code.to_string(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// 更新当前价格 (必须为正)
    pub fn set_price(&mut self, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(EvQuantError::InvalidEventValue(format!(
                "stock price must be positive, got {}",
                price
            )));
        }
        self.price = Some(price);
        Ok(())
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stock('{}')", self.symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// 汇率
///
/// 持有一个货币对的当前汇率, 由汇率事件在处理时更新。
/// 汇率不作正负约束, 按给定值接受。
pub struct FxRate {
    pair: String,
    rate: Option<Decimal>,
}

impl FxRate {
    /// 创建汇率, 初始汇率未知
    pub fn new(pair: &str) -> Result<Self> {
        validate_currency_pair(pair)?;
        Ok(FxRate {
            pair: pair.to_string(),
            rate: None,
        })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// 基础货币 (货币对前三位)
    pub fn base_code(&self) -> &str {
        &self.pair[..3]
    }

    /// 计价货币 (货币对后三位)
    pub fn quote_code(&self) -> &str {
        &self.pair[3..]
    }

    pub fn rate(&self) -> Option<Decimal> {
        self.rate
    }

    /// 更新当前汇率
    pub fn set_rate(&mut self, rate: Decimal) {
        self.rate = Some(rate);
    }

    /// 按当前汇率换算金额 (汇率未知时返回 None)
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        self.rate.map(|r| amount * r)
    }
}

impl fmt::Display for FxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FxRate('{}')", self.pair)
    }
}
