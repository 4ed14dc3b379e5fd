use super::*;

/// The custom errors the contracts can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Sender is not allowed to perform this operation (Error code: -4).
    Unauthorized,
    /// Only account addresses can perform this operation (Error code: -5).
    OnlyAccountAddress,
    /// Attempt to start an auction while the current one is not settled
    /// (Error code: -6).
    AuctionAlreadyActive,
    /// Attempt to bid with no open, unexpired auction (Error code: -7).
    AuctionNotActive,
    /// The bid carries an empty target url (Error code: -8).
    EmptyUrl,
    /// Bid is below the starting or increment threshold (Error code: -9).
    BidTooLow,
    /// Attempt to settle when no auction was started or it already settled
    /// (Error code: -10).
    NoActiveAuction,
    /// Attempt to settle before the auction window elapsed (Error code: -11).
    AuctionNotEnded,
    /// No refund balance to withdraw (Error code: -12).
    NothingToWithdraw,
    /// Auction window end does not fit in a timestamp (Error code: -13).
    InvalidDuration,
    /// Failed to invoke a transfer (Error code: -14).
    InvokeTransferError,
    /// Operation not permitted (Error code: -15).
    OperationNotPermitted,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to transfer invocations to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::InvokeTransferError
    }
}
