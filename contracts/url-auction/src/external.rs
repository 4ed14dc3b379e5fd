use concordium_std::*;

#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// Account that receives all auction proceeds.
    pub beneficiary: AccountAddress,
    /// Smallest accepted first bid of an auction.
    pub min_starting_bid: Amount,
    /// Smallest accepted raise over the current highest bid.
    pub min_bid_increment: Amount,
    /// Length of the bidding window of every auction.
    pub auction_duration: Duration,
}

#[derive(Debug, Serialize, SchemaType)]
pub struct BidParams {
    /// Target url the bid pays to display.
    pub url: String,
}

/// Contract configuration values, used for updates and views.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub enum InternalValue {
    MinStartingBid(Amount),
    MinBidIncrement(Amount),
    Beneficiary(AccountAddress),
    AuctionDuration(Duration),
}

#[derive(Debug, Serialize, SchemaType)]
pub enum InternalViewParams {
    MinStartingBid,
    MinBidIncrement,
    Beneficiary,
    AuctionDuration,
}
