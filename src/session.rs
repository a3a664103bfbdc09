use batch_swap_config::{validate_config, AppConfig};
use batch_swap_metrics::{batch_span, BatchId};
use batch_swap_orchestrator::{
    BatchPolicy, BatchSummary, BatchSwapOrchestrator, BuilderError, SwapSubmitter,
};
use batch_swap_quote::{parse_amount, preview, BatchPreview, PairQuote, PoolReader, QuoteService};
use batch_swap_tracker::{StatusReader, TransactionTracker};
use batch_swap_types::{SwapNotifier, SwapRequest, Token, TransactionRecord, TxHash};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn, Instrument};

use crate::balances::{BalanceReader, SessionBalanceRefresher, SessionState, SwapSelection};
use crate::settings::{batch_policy, impact_change_threshold, tracker_config};
use crate::SessionError;

/// Builder for SwapSession
#[derive(Default)]
pub struct SwapSessionBuilder {
    config: Option<AppConfig>,
    pools: Option<Arc<dyn PoolReader>>,
    submitter: Option<Arc<dyn SwapSubmitter>>,
    ledger: Option<Arc<dyn StatusReader>>,
    balances: Option<Arc<dyn BalanceReader>>,
    notifier: Option<Arc<dyn SwapNotifier>>,
}

impl SwapSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration; defaults to [`AppConfig::default`]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_pool_reader(mut self, pools: Arc<dyn PoolReader>) -> Self {
        self.pools = Some(pools);
        self
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn SwapSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn with_status_reader(mut self, ledger: Arc<dyn StatusReader>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_balance_reader(mut self, balances: Arc<dyn BalanceReader>) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn SwapNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<SwapSession, SessionError> {
        let config = self.config.unwrap_or_default();
        validate_config(&config)?;

        let pools = self.pools.ok_or_else(|| missing("pool_reader"))?;
        let submitter = self.submitter.ok_or_else(|| missing("submitter"))?;
        let ledger = self.ledger.ok_or_else(|| missing("status_reader"))?;
        let balances = self.balances.ok_or_else(|| missing("balance_reader"))?;

        let policy = batch_policy(&config)?;
        let quotes =
            QuoteService::new(pools).with_impact_change_threshold(impact_change_threshold(&config)?);

        let tracker = Arc::new(TransactionTracker::with_config(
            ledger,
            tracker_config(&config),
        ));
        let state = Arc::new(RwLock::new(SessionState::default()));
        let refresher = Arc::new(SessionBalanceRefresher::new(
            balances.clone(),
            state.clone(),
        ));

        let mut orchestrator = BatchSwapOrchestrator::builder()
            .with_tracker(tracker.clone())
            .with_submitter(submitter)
            .with_refresher(refresher.clone());
        if let Some(notifier) = self.notifier {
            orchestrator = orchestrator.with_notifier(notifier);
        }

        Ok(SwapSession {
            config,
            policy,
            account: None,
            state,
            quotes,
            tracker,
            orchestrator: orchestrator.build()?,
            balances,
            refresher,
            running: AtomicBool::new(false),
        })
    }
}

fn missing(field: &str) -> SessionError {
    SessionError::Builder(BuilderError::MissingField {
        field: field.to_string(),
    })
}

/// State of one connected account: its tokens, what the user selected to
/// swap, and every transaction submitted along the way.
pub struct SwapSession {
    config: AppConfig,
    policy: BatchPolicy,
    account: Option<String>,
    state: Arc<RwLock<SessionState>>,
    quotes: QuoteService,
    tracker: Arc<TransactionTracker>,
    orchestrator: BatchSwapOrchestrator,
    balances: Arc<dyn BalanceReader>,
    refresher: Arc<SessionBalanceRefresher>,
    running: AtomicBool,
}

impl SwapSession {
    pub fn builder() -> SwapSessionBuilder {
        SwapSessionBuilder::new()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn tracker(&self) -> &Arc<TransactionTracker> {
        &self.tracker
    }

    // ==================== Account ====================

    /// Connect `account` and load its token list
    pub async fn connect(&mut self, account: impl Into<String>) -> Result<(), SessionError> {
        let account = account.into();
        let tokens = self.balances.get_balances(&account).await?;

        info!(account = %account, tokens = tokens.len(), "Account connected");
        self.state.write().await.reset(tokens);
        self.account = Some(account);
        Ok(())
    }

    /// Forget the account and its tokens. Transaction history is kept.
    pub async fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            info!(account = %account, "Account disconnected");
        }
        self.state.write().await.reset(Vec::new());
        self.tracker.stop_sweep().await;
    }

    /// Reload balances, keeping selections; returns the number of tokens
    pub async fn refresh_balances(&self) -> Result<usize, SessionError> {
        let account = self.account.as_deref().ok_or(SessionError::NotConnected)?;
        self.refresher.reload(account).await
    }

    // ==================== Tokens and Selections ====================

    /// Replace the token list; every selection starts over
    pub async fn set_tokens(&self, tokens: Vec<Token>) {
        self.state.write().await.reset(tokens);
    }

    pub async fn tokens(&self) -> Vec<Token> {
        self.state.read().await.tokens.clone()
    }

    pub async fn selections(&self) -> Vec<SwapSelection> {
        self.state.read().await.selections.clone()
    }

    /// Token every swap converts into, if the account holds it
    pub async fn target_token(&self) -> Option<Token> {
        self.state
            .read()
            .await
            .find_token(&self.config.dex.target_token)
            .cloned()
    }

    /// Select or deselect a token; deselecting clears its amount and quote
    pub async fn select(&self, address: &str, selected: bool) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let selection = state
            .selection_mut(address)
            .ok_or_else(|| SessionError::UnknownToken(address.to_string()))?;

        selection.selected = selected;
        if !selected {
            selection.amount.clear();
            selection.clear_quote();
        }
        Ok(())
    }

    /// Set the amount to swap and quote it against the target.
    ///
    /// Returns the quote, or `None` when the amount is not positive, the token
    /// is the target, the target is missing, or no pool could quote it. The
    /// advisory fields are cleared in every `None` case.
    pub async fn set_amount(
        &self,
        address: &str,
        amount: &str,
    ) -> Result<Option<PairQuote>, SessionError> {
        let target = self.config.dex.target_token.as_str();
        let has_target = {
            let mut state = self.state.write().await;
            let has_target = state.find_token(target).is_some();
            let selection = state
                .selection_mut(address)
                .ok_or_else(|| SessionError::UnknownToken(address.to_string()))?;
            selection.amount = amount.to_string();
            selection.clear_quote();
            has_target
        };

        if parse_amount(amount).is_err() || address == target || !has_target {
            return Ok(None);
        }

        let quote = match self.quotes.quote(address, target, amount).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(token = %address, error = %e, "Quote failed");
                return Ok(None);
            }
        };

        let mut state = self.state.write().await;
        if let Some(selection) = state.selection_mut(address) {
            // the amount may have been edited while the quote was in flight
            if selection.amount == amount {
                selection.expected_output = Some(quote.quote.output_amount);
                selection.price_impact = Some(quote.quote.price_impact);
                selection.reversed = quote.reversed;
            }
        }
        Ok(Some(quote))
    }

    /// Selected tokens with a positive amount and a known expected output
    pub async fn eligible_requests(&self) -> Vec<SwapRequest> {
        let state = self.state.read().await;
        let Some(target) = state.find_token(&self.config.dex.target_token) else {
            return Vec::new();
        };

        state
            .selections
            .iter()
            .filter(|s| s.selected && parse_amount(&s.amount).is_ok())
            .filter(|s| s.expected_output.is_some())
            .map(|s| request_for(s, target))
            .collect()
    }

    /// Re-quote every selected token; returns how many quotes changed
    pub async fn refresh_quotes(&self) -> usize {
        let (mut requests, target) = {
            let state = self.state.read().await;
            let Some(target) = state.find_token(&self.config.dex.target_token).cloned() else {
                return 0;
            };
            let requests: Vec<SwapRequest> = state
                .selections
                .iter()
                .filter(|s| s.selected && parse_amount(&s.amount).is_ok())
                .map(|s| request_for(s, &target))
                .collect();
            (requests, target)
        };

        let changed = self
            .quotes
            .refresh_requests(&mut requests, &target.address)
            .await;
        if changed == 0 {
            return 0;
        }

        let mut state = self.state.write().await;
        for request in requests {
            if let Some(selection) = state.selection_mut(&request.input.address) {
                if selection.amount == request.amount {
                    selection.expected_output = request.expected_output;
                    selection.price_impact = request.price_impact;
                    selection.reversed = request.reversed;
                }
            }
        }

        debug!(changed, "Quotes refreshed");
        changed
    }

    /// Totals for the requests the next batch would run
    pub async fn preview(&self) -> BatchPreview {
        preview(&self.eligible_requests().await, self.policy.max_price_impact)
    }

    // ==================== Transactions ====================

    /// Transaction history, newest first
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.tracker.transactions().await
    }

    /// Pending transactions the ledger already knows about
    pub async fn real_pending_count(&self) -> usize {
        self.tracker.pending_count().await
    }

    pub fn explorer_url(&self, hash: &TxHash) -> String {
        self.tracker.explorer_url(hash)
    }

    // ==================== Batch ====================

    /// Swap every eligible selection into the target token
    pub async fn run_batch(&self) -> Result<BatchSummary, SessionError> {
        let account = self.account.as_deref().ok_or(SessionError::NotConnected)?;
        let target =
            self.target_token()
                .await
                .ok_or_else(|| SessionError::TargetTokenMissing {
                    address: self.config.dex.target_token.clone(),
                })?;

        let _guard = RunGuard::acquire(&self.running)?;
        let requests = self.eligible_requests().await;
        let span = batch_span(BatchId::new(), account, requests.len());

        let summary = self
            .orchestrator
            .run_batch(&requests, &target, &self.policy, account)
            .instrument(span)
            .await?;
        Ok(summary)
    }
}

fn request_for(selection: &SwapSelection, target: &Token) -> SwapRequest {
    let mut request =
        SwapRequest::new(selection.token.clone(), target.clone(), selection.amount.clone())
            .with_reversed(selection.reversed);
    request.expected_output = selection.expected_output;
    request.price_impact = selection.price_impact;
    request
}

/// Marks a batch as running until dropped
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(SessionError::BatchInProgress);
        }
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
