use concordium_std::*;

pub const AUCTION_STARTED_TAG: u8 = 0;
pub const BID_PLACED_TAG: u8 = 1;
pub const AUCTION_ENDED_TAG: u8 = 2;

/// Auction opening event data.
#[derive(Debug, Serial)]
pub struct AuctionStartedEvent {
    /// Ordinal of the freshly started auction.
    pub sequence: u64,
    /// Opening slot time.
    pub start: Timestamp,
    /// Slot time at which bidding closes.
    pub end: Timestamp,
}

/// Accepted bid event data.
#[derive(Debug, Serial)]
pub struct BidPlacedEvent<'a> {
    /// Ordinal of the auction the bid belongs to.
    pub sequence: u64,
    /// Bidder account address.
    pub bidder: &'a AccountAddress,
    /// Escrowed bid amount.
    pub amount: Amount,
    /// Target url carried by the bid.
    pub url: &'a String,
    /// Slot time the bid was accepted.
    pub timestamp: Timestamp,
}

/// Settlement event data.
#[derive(Debug, Serial)]
pub struct AuctionEndedEvent<'a> {
    /// Ordinal of the settled auction.
    pub sequence: u64,
    /// Winning account, if any bid was placed.
    pub winner: &'a Option<AccountAddress>,
    /// Proceeds paid to the beneficiary.
    pub amount: Amount,
    /// Url that won the auction, empty if no bid was placed.
    pub url: &'a String,
}

/// Tagged event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvent<'a> {
    Started(AuctionStartedEvent),
    Bid(BidPlacedEvent<'a>),
    Ended(AuctionEndedEvent<'a>),
}

impl<'a> AuctionEvent<'a> {
    pub fn started(sequence: u64, start: Timestamp, end: Timestamp) -> Self {
        Self::Started(AuctionStartedEvent {
            sequence,
            start,
            end,
        })
    }

    pub fn bid(
        sequence: u64,
        bidder: &'a AccountAddress,
        amount: Amount,
        url: &'a String,
        timestamp: Timestamp,
    ) -> Self {
        Self::Bid(BidPlacedEvent {
            sequence,
            bidder,
            amount,
            url,
            timestamp,
        })
    }

    pub fn ended(
        sequence: u64,
        winner: &'a Option<AccountAddress>,
        amount: Amount,
        url: &'a String,
    ) -> Self {
        Self::Ended(AuctionEndedEvent {
            sequence,
            winner,
            amount,
            url,
        })
    }
}

impl<'a> Serial for AuctionEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvent::Started(event) => {
                out.write_u8(AUCTION_STARTED_TAG)?;
                event.serial(out)
            }
            AuctionEvent::Bid(event) => {
                out.write_u8(BID_PLACED_TAG)?;
                event.serial(out)
            }
            AuctionEvent::Ended(event) => {
                out.write_u8(AUCTION_ENDED_TAG)?;
                event.serial(out)
            }
        }
    }
}
