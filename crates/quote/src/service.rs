use batch_swap_types::SwapRequest;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{compute_quote, find_pool, parse_amount, PoolReader, Quote, QuoteError};

/// Minimum movement, in percentage points, before a refreshed impact replaces
/// the advisory one
pub const DEFAULT_IMPACT_CHANGE_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Quote for a token pair plus the pool orientation it was computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairQuote {
    pub quote: Quote,
    pub reversed: bool,
}

/// Aggregate view of a batch before it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPreview {
    pub swap_count: usize,
    pub total_expected_output: Decimal,
    pub max_price_impact: Decimal,
    pub has_high_price_impact: bool,
}

/// Quotes swaps against live pool reserves
pub struct QuoteService {
    reader: Arc<dyn PoolReader>,
    impact_change_threshold: Decimal,
}

impl QuoteService {
    pub fn new(reader: Arc<dyn PoolReader>) -> Self {
        Self {
            reader,
            impact_change_threshold: DEFAULT_IMPACT_CHANGE_THRESHOLD,
        }
    }

    pub fn with_impact_change_threshold(mut self, threshold: Decimal) -> Self {
        self.impact_change_threshold = threshold;
        self
    }

    /// Quote `amount` of `input` into `output`
    pub async fn quote(
        &self,
        input: &str,
        output: &str,
        amount: &str,
    ) -> Result<PairQuote, QuoteError> {
        let amount = parse_amount(amount)?;
        let lookup = find_pool(self.reader.as_ref(), input, output)
            .await?
            .ok_or(QuoteError::InsufficientLiquidity)?;

        let quote = compute_quote(
            lookup.reserves.input_reserve,
            lookup.reserves.output_reserve,
            amount,
        )?;

        debug!(
            input = %input,
            output = %output,
            amount = %amount,
            output_amount = %quote.output_amount,
            price_impact = %quote.price_impact,
            "Quoted swap"
        );

        Ok(PairQuote {
            quote,
            reversed: lookup.reversed,
        })
    }

    /// Recompute the advisory quote of every request that swaps into `target`.
    ///
    /// A request is only updated when the output changed or the impact moved
    /// by more than the threshold. A failed quote leaves the request as it was.
    /// Returns how many requests were updated.
    pub async fn refresh_requests(&self, requests: &mut [SwapRequest], target: &str) -> usize {
        let mut changed = 0;

        for request in requests.iter_mut() {
            if request.input.address == target {
                continue;
            }
            if parse_amount(&request.amount).is_err() {
                continue;
            }

            let fresh = match self
                .quote(&request.input.address, target, &request.amount)
                .await
            {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!(symbol = %request.input.symbol, error = %e, "Quote refresh failed");
                    continue;
                }
            };

            let previous_impact = request.price_impact.unwrap_or(Decimal::ZERO);
            let impact_moved =
                (fresh.quote.price_impact - previous_impact).abs() > self.impact_change_threshold;

            if request.expected_output != Some(fresh.quote.output_amount) || impact_moved {
                request.expected_output = Some(fresh.quote.output_amount);
                request.price_impact = Some(fresh.quote.price_impact);
                request.reversed = fresh.reversed;
                changed += 1;
            }
        }

        changed
    }
}

/// Summarise the requests about to be submitted
pub fn preview(requests: &[SwapRequest], max_price_impact: Decimal) -> BatchPreview {
    let total_expected_output = requests
        .iter()
        .filter_map(|r| r.expected_output)
        .sum::<Decimal>();
    let highest_impact = requests
        .iter()
        .filter_map(|r| r.price_impact)
        .max()
        .unwrap_or(Decimal::ZERO);

    BatchPreview {
        swap_count: requests.len(),
        total_expected_output,
        max_price_impact: highest_impact,
        has_high_price_impact: highest_impact > max_price_impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPoolReader;
    use batch_swap_types::Token;
    use std::str::FromStr;

    const APT: &str = "0x1::aptos_coin::AptosCoin";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn apt() -> Token {
        Token::new(APT, "APT", 8)
    }

    fn usdc() -> Token {
        Token::new("0x1::usdc::USDC", "USDC", 6)
    }

    fn service() -> QuoteService {
        let reader = InMemoryPoolReader::new()
            .with_pool("0x1::usdc::USDC", APT, 1000, 2000)
            .with_pool(APT, "0x1::weth::WETH", 500, 500);
        QuoteService::new(Arc::new(reader))
    }

    #[tokio::test]
    async fn test_quote_direct_pool() {
        let quote = service().quote("0x1::usdc::USDC", APT, "10").await.unwrap();

        assert!(!quote.reversed);
        assert_eq!(quote.quote.output_amount, dec("19.74316069"));
    }

    #[tokio::test]
    async fn test_quote_reversed_pool() {
        let quote = service().quote("0x1::weth::WETH", APT, "1").await.unwrap();

        assert!(quote.reversed);
        assert!(quote.quote.output_amount < Decimal::ONE);
    }

    #[tokio::test]
    async fn test_quote_without_pool() {
        let err = service()
            .quote("0x1::dai::DAI", APT, "1")
            .await
            .unwrap_err();
        assert_eq!(err, QuoteError::InsufficientLiquidity);
    }

    #[tokio::test]
    async fn test_refresh_updates_stale_quotes() {
        let service = service();
        let mut requests = vec![
            SwapRequest::new(usdc(), apt(), "10"),
            SwapRequest::new(apt(), apt(), "5"),
            SwapRequest::new(Token::new("0x1::dai::DAI", "DAI", 8), apt(), "1"),
        ];

        let changed = service.refresh_requests(&mut requests, APT).await;

        assert_eq!(changed, 1);
        assert_eq!(requests[0].expected_output, Some(dec("19.74316069")));
        assert!(requests[1].expected_output.is_none());
        assert!(requests[2].expected_output.is_none());

        // nothing moved since the last refresh
        assert_eq!(service.refresh_requests(&mut requests, APT).await, 0);
    }

    #[tokio::test]
    async fn test_refresh_ignores_small_impact_drift() {
        let service = service();
        let fresh = service.quote("0x1::usdc::USDC", APT, "10").await.unwrap();
        let nudged = fresh.quote.price_impact + dec("0.05");

        let mut requests =
            vec![SwapRequest::new(usdc(), apt(), "10").with_quote(fresh.quote.output_amount, nudged)];

        assert_eq!(service.refresh_requests(&mut requests, APT).await, 0);
        assert_eq!(requests[0].price_impact, Some(nudged));
    }

    #[test]
    fn test_preview() {
        let requests = vec![
            SwapRequest::new(usdc(), apt(), "10").with_quote(dec("19.5"), dec("2")),
            SwapRequest::new(usdc(), apt(), "1000").with_quote(dec("600"), dec("33.4")),
        ];

        let summary = preview(&requests, dec("10"));
        assert_eq!(summary.swap_count, 2);
        assert_eq!(summary.total_expected_output, dec("619.5"));
        assert_eq!(summary.max_price_impact, dec("33.4"));
        assert!(summary.has_high_price_impact);

        let empty = preview(&[], dec("10"));
        assert_eq!(empty.max_price_impact, Decimal::ZERO);
        assert!(!empty.has_high_price_impact);
    }
}
