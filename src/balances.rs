use async_trait::async_trait;
use batch_swap_orchestrator::{BalanceRefresher, RefreshError};
use batch_swap_types::Token;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::SessionError;

/// Reads the token balances held by an account
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn get_balances(&self, account: &str) -> Result<Vec<Token>, SessionError>;
}

/// A token in the session list together with what the user chose to do with it
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSelection {
    pub token: Token,
    pub selected: bool,
    /// Amount typed by the user, empty when unset
    pub amount: String,
    pub expected_output: Option<Decimal>,
    pub price_impact: Option<Decimal>,
    pub reversed: bool,
}

impl SwapSelection {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            selected: false,
            amount: String::new(),
            expected_output: None,
            price_impact: None,
            reversed: false,
        }
    }

    pub fn clear_quote(&mut self) {
        self.expected_output = None;
        self.price_impact = None;
        self.reversed = false;
    }
}

/// Token list and selections shared between the session and its refresher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub tokens: Vec<Token>,
    pub selections: Vec<SwapSelection>,
}

impl SessionState {
    /// Replace the token list and start over with nothing selected
    pub fn reset(&mut self, tokens: Vec<Token>) {
        self.selections = tokens.iter().cloned().map(SwapSelection::new).collect();
        self.tokens = tokens;
    }

    /// Replace the token list, updating the token carried by each selection.
    ///
    /// Selections whose token disappeared keep their last known token.
    pub fn apply_balances(&mut self, tokens: Vec<Token>) {
        for selection in self.selections.iter_mut() {
            if let Some(fresh) = tokens
                .iter()
                .find(|t| t.address == selection.token.address)
            {
                selection.token = fresh.clone();
            }
        }
        self.tokens = tokens;
    }

    pub fn selection_mut(&mut self, address: &str) -> Option<&mut SwapSelection> {
        self.selections
            .iter_mut()
            .find(|s| s.token.address == address)
    }

    pub fn find_token(&self, address: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.address == address)
    }
}

/// Balance refresher handed to the orchestrator.
///
/// Reloads the account's balances into the shared session state while
/// leaving the user's selections intact.
pub struct SessionBalanceRefresher {
    reader: Arc<dyn BalanceReader>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionBalanceRefresher {
    pub fn new(reader: Arc<dyn BalanceReader>, state: Arc<RwLock<SessionState>>) -> Self {
        Self { reader, state }
    }

    pub async fn reload(&self, account: &str) -> Result<usize, SessionError> {
        let tokens = self.reader.get_balances(account).await?;
        let count = tokens.len();
        self.state.write().await.apply_balances(tokens);

        debug!(account = %account, tokens = count, "Balances refreshed");
        Ok(count)
    }
}

#[async_trait]
impl BalanceRefresher for SessionBalanceRefresher {
    async fn refresh(&self, account: &str) -> Result<(), RefreshError> {
        self.reload(account)
            .await
            .map(|_| ())
            .map_err(|e| RefreshError::Failed(e.to_string()))
    }
}
