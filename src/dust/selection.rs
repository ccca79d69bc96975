//! Choosing which holdings to aggregate.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::dust::types::{DustError, DustResult, TokenHolding};

/// Holdings with a per-symbol selection flag.
///
/// Starts with every dust holding selected.
#[derive(Debug, Clone)]
pub struct Selection {
    holdings: Vec<TokenHolding>,
    selected: BTreeSet<String>,
}

impl Selection {
    pub fn new(holdings: Vec<TokenHolding>) -> Self {
        let selected = holdings
            .iter()
            .filter(|h| h.is_dust)
            .map(|h| h.symbol.clone())
            .collect();
        Self { holdings, selected }
    }

    pub fn holdings(&self) -> &[TokenHolding] {
        &self.holdings
    }

    pub fn is_selected(&self, symbol: &str) -> bool {
        self.selected.contains(symbol)
    }

    /// Flip the flag for `symbol`, returning the new state.
    pub fn toggle(&mut self, symbol: &str) -> DustResult<bool> {
        self.ensure_known(symbol)?;
        if self.selected.remove(symbol) {
            Ok(false)
        } else {
            self.selected.insert(symbol.to_string());
            Ok(true)
        }
    }

    pub fn select(&mut self, symbol: &str) -> DustResult<()> {
        self.ensure_known(symbol)?;
        self.selected.insert(symbol.to_string());
        Ok(())
    }

    pub fn deselect(&mut self, symbol: &str) -> DustResult<()> {
        self.ensure_known(symbol)?;
        self.selected.remove(symbol);
        Ok(())
    }

    /// Selected holdings, in scan order.
    pub fn selected(&self) -> Vec<&TokenHolding> {
        self.holdings
            .iter()
            .filter(|h| self.selected.contains(&h.symbol))
            .collect()
    }

    pub fn total_usd(&self) -> f64 {
        self.selected().iter().map(|h| h.usd_value).sum()
    }

    fn ensure_known(&self, symbol: &str) -> DustResult<()> {
        if self.holdings.iter().any(|h| h.symbol == symbol) {
            Ok(())
        } else {
            Err(DustError::UnknownToken(symbol.to_string()))
        }
    }
}

/// What aggregating the current selection would yield.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationPlan {
    pub holdings: Vec<TokenHolding>,
    pub total_usd: f64,
    pub dot_price_usd: f64,
    pub estimated_dot: f64,
}

impl AggregationPlan {
    pub fn from_selection(selection: &Selection, dot_price_usd: f64) -> DustResult<Self> {
        let holdings: Vec<TokenHolding> = selection.selected().into_iter().cloned().collect();
        if holdings.is_empty() {
            return Err(DustError::NothingSelected);
        }

        let total_usd = selection.total_usd();
        let estimated_dot = if dot_price_usd > 0.0 { total_usd / dot_price_usd } else { 0.0 };

        Ok(Self {
            holdings,
            total_usd,
            dot_price_usd,
            estimated_dot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeToken;
    use alloy::primitives::{Address, U256};

    fn holding(symbol: &str, usd_value: f64, is_dust: bool) -> TokenHolding {
        TokenHolding {
            symbol: symbol.to_string(),
            token: if symbol == "ETH" {
                BridgeToken::Native
            } else {
                BridgeToken::Erc20(Address::repeat_byte(symbol.len() as u8))
            },
            raw_balance: U256::from(1u8),
            decimals: 18,
            balance: usd_value,
            usd_value,
            is_dust,
        }
    }

    fn sample() -> Selection {
        Selection::new(vec![
            holding("ETH", 2.54, true),
            holding("USDC", 0.45, true),
            holding("DAI", 250.0, false),
        ])
    }

    #[test]
    fn test_dust_preselected() {
        let selection = sample();
        assert!(selection.is_selected("ETH"));
        assert!(selection.is_selected("USDC"));
        assert!(!selection.is_selected("DAI"));
        assert!((selection.total_usd() - 2.99).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_and_unknown() {
        let mut selection = sample();
        assert_eq!(selection.toggle("USDC").unwrap(), false);
        assert_eq!(selection.toggle("DAI").unwrap(), true);
        assert!(matches!(selection.toggle("SOL"), Err(DustError::UnknownToken(_))));

        let symbols: Vec<_> = selection.selected().iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ETH", "DAI"]);
    }

    #[test]
    fn test_plan_estimates_dot() {
        let plan = AggregationPlan::from_selection(&sample(), 7.5).unwrap();
        assert_eq!(plan.holdings.len(), 2);
        assert!((plan.estimated_dot - 2.99 / 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut selection = sample();
        selection.deselect("ETH").unwrap();
        selection.deselect("USDC").unwrap();
        assert!(matches!(
            AggregationPlan::from_selection(&selection, 7.5),
            Err(DustError::NothingSelected)
        ));
    }
}
