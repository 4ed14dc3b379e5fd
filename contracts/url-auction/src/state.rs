use commons::{Authority, CustomContractError};
use concordium_std::*;

use crate::external::InitParams;

/// One run of the bidding process, from start to settlement.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct AuctionRecord {
    /// Ordinal of this auction. 0 means no auction has ever started.
    pub sequence: u64,
    /// Slot time the auction was started.
    pub start: Timestamp,
    /// `start` plus the configured window, computed once at start.
    pub end: Timestamp,
    /// Leading escrowed bid, zero before the first bid.
    pub highest_bid: Amount,
    /// Leading bidder, `None` before the first bid.
    pub highest_bidder: Option<AccountAddress>,
    /// Url payload of the leading bid, empty before the first bid.
    pub target_url: String,
    /// Set exactly once, by settlement. Never reverses.
    pub is_ended: bool,
}

impl AuctionRecord {
    fn initial() -> Self {
        AuctionRecord {
            sequence: 0,
            start: Timestamp::from_timestamp_millis(0),
            end: Timestamp::from_timestamp_millis(0),
            highest_bid: Amount::zero(),
            highest_bidder: None,
            target_url: String::new(),
            is_ended: false,
        }
    }

    /// Started and not yet settled. An expired but unsettled record is still
    /// open and blocks the next start.
    pub fn is_open(&self) -> bool {
        self.sequence != 0 && !self.is_ended
    }

    /// Open and inside the bidding window. The window is half-open:
    /// `now == end` is already expired.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.is_open() && now < self.end
    }

    pub fn time_remaining(&self, now: Timestamp) -> Duration {
        if self.is_active(now) {
            self.end.duration_between(now)
        } else {
            Duration::from_millis(0)
        }
    }
}

/// Settlement outcome. The proceeds must be transferred to the beneficiary.
#[must_use]
pub struct Settlement {
    pub sequence: u64,
    pub winner: Option<AccountAddress>,
    pub proceeds: Amount,
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Contract maintenance rights.
    pub authority: Authority<S>,
    /// Receives all auction proceeds. Fixed at init.
    pub beneficiary: AccountAddress,
    /// Smallest accepted first bid of an auction.
    pub min_starting_bid: Amount,
    /// Smallest accepted raise over the current highest bid.
    pub min_bid_increment: Amount,
    /// Length of the bidding window. Fixed at init.
    pub auction_duration: Duration,
    /// The current auction. Replaced wholesale by `start`, retained as
    /// read-only history once settled.
    pub current: AuctionRecord,
    /// Refunds owed to displaced bidders, paid out through `withdraw`.
    pub pending_returns: StateMap<AccountAddress, Amount, S>,
}

impl<S: HasStateApi> State<S> {
    pub fn new(
        state_builder: &mut StateBuilder<S>,
        origin: AccountAddress,
        params: InitParams,
    ) -> Self {
        State {
            authority: Authority::new(state_builder, Address::Account(origin)),
            beneficiary: params.beneficiary,
            min_starting_bid: params.min_starting_bid,
            min_bid_increment: params.min_bid_increment,
            auction_duration: params.auction_duration,
            current: AuctionRecord::initial(),
            pending_returns: state_builder.new_map(),
        }
    }

    /// Replace the settled record with the next one in sequence.
    pub fn start(&mut self, now: Timestamp) -> Result<&AuctionRecord, CustomContractError> {
        ensure!(
            !self.current.is_open(),
            CustomContractError::AuctionAlreadyActive
        );

        let end = now
            .checked_add(self.auction_duration)
            .ok_or(CustomContractError::InvalidDuration)?;

        self.current = AuctionRecord {
            sequence: self.current.sequence + 1,
            start: now,
            end,
            highest_bid: Amount::zero(),
            highest_bidder: None,
            target_url: String::new(),
            is_ended: false,
        };

        Ok(&self.current)
    }

    /// Accept a bid, banking the displaced leader's refund.
    pub fn bid(
        &mut self,
        now: Timestamp,
        bidder: AccountAddress,
        amount: Amount,
        url: String,
    ) -> Result<(), CustomContractError> {
        ensure!(
            self.current.is_active(now),
            CustomContractError::AuctionNotActive
        );
        ensure!(!url.is_empty(), CustomContractError::EmptyUrl);

        if self.current.highest_bid == Amount::zero() {
            ensure!(
                amount >= self.min_starting_bid,
                CustomContractError::BidTooLow
            );
        } else {
            ensure!(
                amount >= self.current.highest_bid + self.min_bid_increment,
                CustomContractError::BidTooLow
            );
        }

        // Bank the displaced escrow before the record forgets the leader
        let displaced_amount = self.current.highest_bid;
        if let Some(displaced) = self.current.highest_bidder.replace(bidder) {
            self.credit_return(displaced, displaced_amount);
        }
        self.current.highest_bid = amount;
        self.current.target_url = url;

        Ok(())
    }

    /// Close the window, marking the record settled.
    pub fn finalize(&mut self, now: Timestamp) -> Result<Settlement, CustomContractError> {
        ensure!(self.current.is_open(), CustomContractError::NoActiveAuction);
        ensure!(
            now >= self.current.end,
            CustomContractError::AuctionNotEnded
        );

        self.current.is_ended = true;

        Ok(Settlement {
            sequence: self.current.sequence,
            winner: self.current.highest_bidder,
            proceeds: self.current.highest_bid,
        })
    }

    /// Take the caller's banked refunds. The caller must receive exactly the
    /// returned amount.
    pub fn withdraw(&mut self, account: &AccountAddress) -> Result<Amount, CustomContractError> {
        let owed = self.pending_returns.get(account).map(|owed| *owed);
        match owed {
            Some(owed) if owed > Amount::zero() => {
                self.pending_returns.remove(account);
                Ok(owed)
            }
            _ => Err(CustomContractError::NothingToWithdraw),
        }
    }

    pub fn pending_return(&self, account: &AccountAddress) -> Amount {
        self.pending_returns
            .get(account)
            .map(|owed| *owed)
            .unwrap_or_else(Amount::zero)
    }

    fn credit_return(&mut self, account: AccountAddress, amount: Amount) {
        if amount == Amount::zero() {
            return;
        }
        let owed = self.pending_return(&account);
        self.pending_returns.insert(account, owed + amount);
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    const WINDOW_MS: u64 = 1_000;

    fn open_record(start_ms: u64) -> AuctionRecord {
        AuctionRecord {
            sequence: 1,
            start: Timestamp::from_timestamp_millis(start_ms),
            end: Timestamp::from_timestamp_millis(start_ms + WINDOW_MS),
            highest_bid: Amount::zero(),
            highest_bidder: None,
            target_url: String::new(),
            is_ended: false,
        }
    }

    #[concordium_test]
    fn test_initial_record_is_closed() {
        let record = AuctionRecord::initial();
        claim!(!record.is_open());
        claim!(!record.is_active(Timestamp::from_timestamp_millis(0)));
        claim_eq!(record.sequence, 0);
        claim_eq!(record.highest_bid, Amount::zero());
        claim_eq!(record.highest_bidder, None);
        claim_eq!(record.target_url, "");
    }

    #[concordium_test]
    fn test_window_is_half_open() {
        let record = open_record(100);

        claim!(record.is_active(Timestamp::from_timestamp_millis(100)));
        claim!(record.is_active(Timestamp::from_timestamp_millis(100 + WINDOW_MS - 1)));
        // The end instant itself is already expired
        claim!(!record.is_active(Timestamp::from_timestamp_millis(100 + WINDOW_MS)));
        // An expired record stays open until settled
        claim!(record.is_open());
    }

    #[concordium_test]
    fn test_settled_record_is_inactive() {
        let mut record = open_record(100);
        record.is_ended = true;

        claim!(!record.is_open());
        claim!(!record.is_active(Timestamp::from_timestamp_millis(150)));
    }

    #[concordium_test]
    fn test_time_remaining() {
        let record = open_record(100);

        claim_eq!(
            record.time_remaining(Timestamp::from_timestamp_millis(100)),
            Duration::from_millis(WINDOW_MS)
        );
        claim_eq!(
            record.time_remaining(Timestamp::from_timestamp_millis(700)),
            Duration::from_millis(400)
        );
        claim_eq!(
            record.time_remaining(Timestamp::from_timestamp_millis(100 + WINDOW_MS)),
            Duration::from_millis(0)
        );
    }
}
