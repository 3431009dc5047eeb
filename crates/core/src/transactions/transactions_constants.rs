/// Transaction kind wire codes.
///
/// Each constant is the persisted code for one supported transaction kind.

/// Purchase of shares. Decreases cash and increases the position.
pub const TRANSACTION_KIND_BUY: &str = "BUY";

/// Disposal of shares. Increases cash and decreases the position.
pub const TRANSACTION_KIND_SELL: &str = "SELL";

/// Reverse rescale of the share count (N old shares become 1 new share).
/// Cost totals are untouched.
pub const TRANSACTION_KIND_MERGE: &str = "MERGE";

/// Forward rescale of the share count (1 old share becomes N new shares).
/// Cost totals are untouched.
pub const TRANSACTION_KIND_SPLIT: &str = "SPLIT";

/// Dividend event: a per-10-shares cash leg plus optional per-10-shares
/// stock legs (bonus shares, capitalization transfer).
pub const TRANSACTION_KIND_DIVIDEND: &str = "DIVIDEND";

/// Kinds that move money through the market.
pub const TRADE_TRANSACTION_KINDS: [&str; 2] = [TRANSACTION_KIND_BUY, TRANSACTION_KIND_SELL];

/// Kinds that rescale or augment the share count without a market trade.
pub const CORPORATE_ACTION_KINDS: [&str; 3] = [
    TRANSACTION_KIND_MERGE,
    TRANSACTION_KIND_SPLIT,
    TRANSACTION_KIND_DIVIDEND,
];
