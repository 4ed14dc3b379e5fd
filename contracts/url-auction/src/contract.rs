use commons::{CustomContractError, OperatorUpdateParams, OperatorViewParams};
use concordium_std::*;

use crate::events::*;
use crate::external::*;
use crate::state::{AuctionRecord, State};

/// Initialize the auction platform with no auction started yet.
#[init(contract = "UrlAuction", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params =
        InitParams::deserial(&mut ctx.parameter_cursor()).map_err(CustomContractError::from)?;

    Ok(State::new(state_builder, ctx.init_origin(), params))
}

/// Open the next auction window. Operators only.
#[receive(mutable, contract = "UrlAuction", name = "start", enable_logger)]
fn start<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    ensure!(
        host.state().authority.has_operator_rights(&ctx.sender()),
        CustomContractError::Unauthorized.into()
    );

    let now = ctx.metadata().slot_time();
    let record = host.state_mut().start(now)?;

    logger.log(&AuctionEvent::started(
        record.sequence,
        record.start,
        record.end,
    ))?;

    Ok(())
}

/// Place a bid on the current auction. The attached amount is escrowed by
/// the contract; a displaced leader is credited a refund balance that can be
/// taken back with `withdraw`.
#[receive(
    mutable,
    payable,
    contract = "UrlAuction",
    name = "bid",
    parameter = "BidParams",
    enable_logger
)]
fn bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let params =
        BidParams::deserial(&mut ctx.parameter_cursor()).map_err(CustomContractError::from)?;

    // A contract cannot take a refund back with a plain transfer
    let bidder = match ctx.sender() {
        Address::Account(bidder) => bidder,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };

    let now = ctx.metadata().slot_time();
    host.state_mut().bid(now, bidder, amount, params.url)?;

    let record = &host.state().current;
    logger.log(&AuctionEvent::bid(
        record.sequence,
        &bidder,
        amount,
        &record.target_url,
        now,
    ))?;

    Ok(())
}

/// Settle the elapsed auction, paying the proceeds to the beneficiary.
///
/// Deliberately open to any caller: settlement can only move the winning
/// amount to the beneficiary fixed at init.
#[receive(mutable, contract = "UrlAuction", name = "finalize", enable_logger)]
fn finalize<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let now = ctx.metadata().slot_time();
    let settlement = host.state_mut().finalize(now)?;

    let state = host.state();
    logger.log(&AuctionEvent::ended(
        settlement.sequence,
        &settlement.winner,
        settlement.proceeds,
        &state.current.target_url,
    ))?;

    // An auction without bids settles with zero proceeds
    if settlement.proceeds > Amount::zero() {
        host.invoke_transfer(&state.beneficiary, settlement.proceeds)?;
    }

    Ok(())
}

/// Pay out the caller's banked refunds.
#[receive(mutable, contract = "UrlAuction", name = "withdraw")]
fn withdraw<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    let caller = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };

    // The balance is cleared before the transfer; a failed transfer rolls
    // the whole operation back
    let owed = host.state_mut().withdraw(&caller)?;
    host.invoke_transfer(&caller, owed)?;

    Ok(())
}

/// Url of the current leading bid, empty when there is none.
#[receive(contract = "UrlAuction", name = "getCurrentUrl", return_value = "String")]
fn get_current_url<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<String> {
    Ok(host.state().current.target_url.clone())
}

#[receive(contract = "UrlAuction", name = "isAuctionActive", return_value = "bool")]
fn is_auction_active<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().current.is_active(ctx.metadata().slot_time()))
}

#[receive(
    contract = "UrlAuction",
    name = "getTimeRemaining",
    return_value = "Duration"
)]
fn get_time_remaining<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Duration> {
    Ok(host
        .state()
        .current
        .time_remaining(ctx.metadata().slot_time()))
}

#[receive(
    contract = "UrlAuction",
    name = "viewCurrentAuction",
    return_value = "AuctionRecord"
)]
fn view_current_auction<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<AuctionRecord> {
    Ok(host.state().current.clone())
}

/// Refund balance a displaced bidder can take back with `withdraw`.
#[receive(
    contract = "UrlAuction",
    name = "viewPendingReturn",
    parameter = "AccountAddress",
    return_value = "Amount"
)]
fn view_pending_return<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    let account =
        AccountAddress::deserial(&mut ctx.parameter_cursor()).map_err(CustomContractError::from)?;

    Ok(host.state().pending_return(&account))
}

/// Function to manage addresses that are allowed to start auctions and
/// adjust the bidding thresholds.
///
///  It rejects if:
///  - Fails to parse `OperatorUpdateParams` parameters.
///  - Sender is not one of the operators.
#[receive(
    mutable,
    contract = "UrlAuction",
    name = "updateAuthority",
    parameter = "OperatorUpdateParams"
)]
fn update_authority<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    let state = host.state_mut();
    let params = OperatorUpdateParams::deserial(&mut ctx.parameter_cursor())
        .map_err(CustomContractError::from)?;
    let sender = ctx.sender();
    state.authority.handle_update(sender, params)
}

/// Function to view addresses that are allowed to start auctions and adjust
/// the bidding thresholds.
#[receive(
    contract = "UrlAuction",
    name = "viewAuthority",
    parameter = "OperatorViewParams",
    return_value = "Vec<Address>"
)]
fn view_authority<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Vec<Address>> {
    let params = OperatorViewParams::deserial(&mut ctx.parameter_cursor())
        .map_err(CustomContractError::from)?;
    Ok(host.state().authority.handle_view(params))
}

/// Function to update the bidding thresholds. Operators only.
///
/// The new value takes effect on the next bid evaluation; the beneficiary
/// and the window length are fixed at init and cannot be updated.
#[receive(
    mutable,
    contract = "UrlAuction",
    name = "updateInternalValue",
    parameter = "InternalValue"
)]
fn update_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    if !host.state().authority.has_operator_rights(&ctx.sender()) {
        return Err(CustomContractError::Unauthorized.into());
    }

    let params =
        InternalValue::deserial(&mut ctx.parameter_cursor()).map_err(CustomContractError::from)?;

    let state = host.state_mut();
    match params {
        InternalValue::MinStartingBid(amount) => state.min_starting_bid = amount,
        InternalValue::MinBidIncrement(amount) => state.min_bid_increment = amount,
        InternalValue::Beneficiary(_) | InternalValue::AuctionDuration(_) => {
            bail!(CustomContractError::OperationNotPermitted.into())
        }
    }

    Ok(())
}

/// Function to view the configuration values of the contract.
#[receive(
    contract = "UrlAuction",
    name = "viewInternalValue",
    parameter = "InternalViewParams",
    return_value = "InternalValue"
)]
fn view_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<InternalValue> {
    let params = InternalViewParams::deserial(&mut ctx.parameter_cursor())
        .map_err(CustomContractError::from)?;

    let state = host.state();
    let value = match params {
        InternalViewParams::MinStartingBid => InternalValue::MinStartingBid(state.min_starting_bid),
        InternalViewParams::MinBidIncrement => {
            InternalValue::MinBidIncrement(state.min_bid_increment)
        }
        InternalViewParams::Beneficiary => InternalValue::Beneficiary(state.beneficiary),
        InternalViewParams::AuctionDuration => {
            InternalValue::AuctionDuration(state.auction_duration)
        }
    };

    Ok(value)
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::OperatorUpdateKind;
    use concordium_std::test_infrastructure::*;

    const AUCTION_DURATION_MS: u64 = 24 * 60 * 60 * 1000;
    const MIN_STARTING_BID: Amount = Amount::from_micro_ccd(10_000);
    const MIN_BID_INCREMENT: Amount = Amount::from_micro_ccd(1_000);

    const OPERATOR: AccountAddress = AccountAddress([1; 32]);
    const PLATFORM: AccountAddress = AccountAddress([2; 32]);
    const ALICE: AccountAddress = AccountAddress([16; 32]);
    const BOB: AccountAddress = AccountAddress([17; 32]);

    fn auction_start() -> Timestamp {
        Timestamp::from_timestamp_millis(1_650_000_000_000)
    }

    fn mid_auction() -> Timestamp {
        Timestamp::from_timestamp_millis(1_650_000_000_000 + AUCTION_DURATION_MS / 2)
    }

    /// The end instant itself; the window is half-open, so this is expired.
    fn auction_end() -> Timestamp {
        Timestamp::from_timestamp_millis(1_650_000_000_000 + AUCTION_DURATION_MS)
    }

    fn default_host() -> TestHost<State<TestStateApi>> {
        let params = InitParams {
            beneficiary: PLATFORM,
            min_starting_bid: MIN_STARTING_BID,
            min_bid_increment: MIN_BID_INCREMENT,
            auction_duration: Duration::from_millis(AUCTION_DURATION_MS),
        };
        let parameter_bytes = to_bytes(&params);

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OPERATOR)
            .set_parameter(&parameter_bytes);

        let mut state_builder = TestStateBuilder::new();
        let state = init(&ctx, &mut state_builder).expect_report("Failed during init_UrlAuction");

        TestHost::new(state, state_builder)
    }

    fn receive_ctx<'a>(sender: AccountAddress, slot_time: Timestamp) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(sender));
        ctx.set_metadata_slot_time(slot_time);
        ctx
    }

    fn start_auction(host: &mut TestHost<State<TestStateApi>>, slot_time: Timestamp) {
        let ctx = receive_ctx(OPERATOR, slot_time);
        let mut logger = TestLogger::init();
        start(&ctx, host, &mut logger).expect_report("Starting the auction should succeed");
    }

    fn place_bid(
        host: &mut TestHost<State<TestStateApi>>,
        bidder: AccountAddress,
        amount: Amount,
        url: &str,
        slot_time: Timestamp,
    ) -> ReceiveResult<()> {
        let parameter_bytes = to_bytes(&BidParams {
            url: url.to_string(),
        });
        let mut ctx = receive_ctx(bidder, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        bid(&ctx, host, amount, &mut logger)
    }

    #[concordium_test]
    fn test_init() {
        let host = default_host();
        let state = host.state();

        claim_eq!(state.beneficiary, PLATFORM);
        claim_eq!(state.min_starting_bid, MIN_STARTING_BID);
        claim_eq!(state.min_bid_increment, MIN_BID_INCREMENT);
        claim_eq!(
            state.auction_duration,
            Duration::from_millis(AUCTION_DURATION_MS)
        );
        claim_eq!(state.current.sequence, 0);
        claim!(state
            .authority
            .has_operator_rights(&Address::Account(OPERATOR)));

        let ctx = receive_ctx(ALICE, auction_start());
        let active = is_auction_active(&ctx, &host).expect_report("Query should succeed");
        claim!(!active);

        let url = get_current_url(&ctx, &host).expect_report("Query should succeed");
        claim_eq!(url, "");
    }

    #[concordium_test]
    fn test_start() {
        let mut host = default_host();

        let ctx = receive_ctx(OPERATOR, auction_start());
        let mut logger = TestLogger::init();
        let result = start(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));

        let record = &host.state().current;
        claim_eq!(record.sequence, 1);
        claim_eq!(record.start, auction_start());
        claim_eq!(record.end, auction_end());
        claim_eq!(record.highest_bid, Amount::zero());
        claim_eq!(record.highest_bidder, None);
        claim!(!record.is_ended);

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], AUCTION_STARTED_TAG);

        let active = is_auction_active(&receive_ctx(ALICE, mid_auction()), &host)
            .expect_report("Query should succeed");
        claim!(active);
    }

    #[concordium_test]
    fn test_start_unauthorized() {
        let mut host = default_host();

        let ctx = receive_ctx(ALICE, auction_start());
        let mut logger = TestLogger::init();
        let result = start(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim_eq!(host.state().current.sequence, 0);
    }

    #[concordium_test]
    fn test_start_while_current_not_settled() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let ctx = receive_ctx(OPERATOR, mid_auction());
        let mut logger = TestLogger::init();
        let result = start(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::AuctionAlreadyActive.into()));

        // An expired but unsettled auction still blocks the next start
        let ctx = receive_ctx(OPERATOR, auction_end());
        let result = start(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::AuctionAlreadyActive.into()));
    }

    #[concordium_test]
    fn test_first_bid() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Ok(()));

        let record = &host.state().current;
        claim_eq!(record.highest_bid, MIN_STARTING_BID);
        claim_eq!(record.highest_bidder, Some(ALICE));
        claim_eq!(record.target_url, "https://example.com");

        let url = get_current_url(&receive_ctx(BOB, mid_auction()), &host)
            .expect_report("Query should succeed");
        claim_eq!(url, "https://example.com");
    }

    #[concordium_test]
    fn test_first_bid_below_minimum() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let result = place_bid(
            &mut host,
            ALICE,
            Amount::from_micro_ccd(9_000),
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Err(CustomContractError::BidTooLow.into()));
        claim_eq!(host.state().current.highest_bidder, None);

        // A bid of exactly the minimum is accepted
        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_bid_empty_url() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let result = place_bid(&mut host, ALICE, MIN_STARTING_BID, "", mid_auction());
        claim_eq!(result, Err(CustomContractError::EmptyUrl.into()));

        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_bid_below_increment() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            mid_auction(),
        );
        claim_eq!(result, Ok(()));

        let result = place_bid(
            &mut host,
            BOB,
            MIN_STARTING_BID + Amount::from_micro_ccd(999),
            "https://bob.example",
            mid_auction(),
        );
        claim_eq!(result, Err(CustomContractError::BidTooLow.into()));
        claim_eq!(host.state().current.highest_bidder, Some(ALICE));

        // Exactly the previous bid plus the increment is accepted
        let result = place_bid(
            &mut host,
            BOB,
            MIN_STARTING_BID + MIN_BID_INCREMENT,
            "https://bob.example",
            mid_auction(),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_bid_outside_window() {
        let mut host = default_host();

        // No auction was ever started
        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Err(CustomContractError::AuctionNotActive.into()));

        start_auction(&mut host, auction_start());

        // The end instant is already expired
        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            auction_end(),
        );
        claim_eq!(result, Err(CustomContractError::AuctionNotActive.into()));
    }

    #[concordium_test]
    fn test_displacement_credits_refund() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            mid_auction(),
        )
        .expect_report("First bid should succeed");

        let outbid = MIN_STARTING_BID + MIN_BID_INCREMENT;
        place_bid(&mut host, BOB, outbid, "https://bob.example", mid_auction())
            .expect_report("Outbidding should succeed");

        let state = host.state();
        claim_eq!(state.current.highest_bid, outbid);
        claim_eq!(state.current.highest_bidder, Some(BOB));
        claim_eq!(state.current.target_url, "https://bob.example");
        // The displaced escrow is banked in full, not transferred
        claim_eq!(state.pending_return(&ALICE), MIN_STARTING_BID);
        claim_eq!(host.get_transfers().len(), 0);

        let parameter_bytes = to_bytes(&ALICE);
        let mut ctx = receive_ctx(BOB, mid_auction());
        ctx.set_parameter(&parameter_bytes);
        let owed = view_pending_return(&ctx, &host).expect_report("Query should succeed");
        claim_eq!(owed, MIN_STARTING_BID);
    }

    #[concordium_test]
    fn test_leader_may_outbid_themselves() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            mid_auction(),
        )
        .expect_report("First bid should succeed");

        let raise = MIN_STARTING_BID + MIN_BID_INCREMENT;
        place_bid(&mut host, ALICE, raise, "https://alice.example/v2", mid_auction())
            .expect_report("Raising own bid should succeed");

        let state = host.state();
        claim_eq!(state.current.highest_bid, raise);
        claim_eq!(state.current.highest_bidder, Some(ALICE));
        claim_eq!(state.current.target_url, "https://alice.example/v2");
        // The earlier escrow becomes withdrawable like any displaced bid
        claim_eq!(state.pending_return(&ALICE), MIN_STARTING_BID);
    }

    #[concordium_test]
    fn test_withdraw() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            mid_auction(),
        )
        .expect_report("First bid should succeed");
        let outbid = MIN_STARTING_BID + MIN_BID_INCREMENT;
        place_bid(&mut host, BOB, outbid, "https://bob.example", mid_auction())
            .expect_report("Outbidding should succeed");

        host.set_self_balance(MIN_STARTING_BID + outbid);

        let ctx = receive_ctx(ALICE, mid_auction());
        let result = withdraw(&ctx, &mut host);
        claim_eq!(result, Ok(()));
        claim_eq!(host.get_transfers(), [(ALICE, MIN_STARTING_BID)]);
        claim_eq!(host.state().pending_return(&ALICE), Amount::zero());

        // Nothing left to withdraw a second time
        let result = withdraw(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::NothingToWithdraw.into()));
        claim_eq!(host.get_transfers().len(), 1);
    }

    #[concordium_test]
    fn test_withdraw_without_balance() {
        let mut host = default_host();

        let ctx = receive_ctx(ALICE, auction_start());
        let result = withdraw(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::NothingToWithdraw.into()));
    }

    #[concordium_test]
    fn test_finalize_before_end() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let ctx = receive_ctx(OPERATOR, mid_auction());
        let mut logger = TestLogger::init();
        let result = finalize(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::AuctionNotEnded.into()));
        claim!(!host.state().current.is_ended);
    }

    #[concordium_test]
    fn test_finalize_without_start() {
        let mut host = default_host();

        let ctx = receive_ctx(OPERATOR, auction_end());
        let mut logger = TestLogger::init();
        let result = finalize(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::NoActiveAuction.into()));
    }

    #[concordium_test]
    fn test_finalize() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://winner.example",
            mid_auction(),
        )
        .expect_report("Bid should succeed");

        host.set_self_balance(MIN_STARTING_BID);

        // Settlement is an open call; any caller may trigger it once expired
        let ctx = receive_ctx(BOB, auction_end());
        let mut logger = TestLogger::init();
        let result = finalize(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));

        claim!(host.state().current.is_ended);
        claim_eq!(host.get_transfers(), [(PLATFORM, MIN_STARTING_BID)]);
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], AUCTION_ENDED_TAG);

        let active = is_auction_active(&receive_ctx(ALICE, auction_end()), &host)
            .expect_report("Query should succeed");
        claim!(!active);

        // Settling a second time never re-transfers funds
        let result = finalize(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::NoActiveAuction.into()));
        claim_eq!(host.get_transfers().len(), 1);
    }

    #[concordium_test]
    fn test_finalize_without_bids() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let ctx = receive_ctx(OPERATOR, auction_end());
        let mut logger = TestLogger::init();
        let result = finalize(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));

        claim!(host.state().current.is_ended);
        claim_eq!(host.state().current.target_url, "");
        claim_eq!(host.get_transfers().len(), 0);
    }

    #[concordium_test]
    fn test_restart_after_settlement() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            mid_auction(),
        )
        .expect_report("Bid should succeed");
        let outbid = MIN_STARTING_BID + MIN_BID_INCREMENT;
        place_bid(&mut host, BOB, outbid, "https://bob.example", mid_auction())
            .expect_report("Outbidding should succeed");

        host.set_self_balance(MIN_STARTING_BID + outbid);

        let mut logger = TestLogger::init();
        finalize(&receive_ctx(OPERATOR, auction_end()), &mut host, &mut logger)
            .expect_report("Settlement should succeed");

        start_auction(&mut host, auction_end());

        let record = &host.state().current;
        claim_eq!(record.sequence, 2);
        claim_eq!(record.highest_bid, Amount::zero());
        claim_eq!(record.highest_bidder, None);
        claim_eq!(record.target_url, "");
        claim!(!record.is_ended);

        // Refunds banked during the previous auction survive the restart
        claim_eq!(host.state().pending_return(&ALICE), MIN_STARTING_BID);
        let ctx = receive_ctx(ALICE, auction_end());
        let result = withdraw(&ctx, &mut host);
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_update_internal_value() {
        let mut host = default_host();

        let parameter_bytes = to_bytes(&InternalValue::MinBidIncrement(Amount::from_micro_ccd(
            2_000,
        )));
        let mut ctx = receive_ctx(OPERATOR, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().min_bid_increment,
            Amount::from_micro_ccd(2_000)
        );

        let parameter_bytes = to_bytes(&InternalValue::MinStartingBid(Amount::from_micro_ccd(
            20_000,
        )));
        let mut ctx = receive_ctx(OPERATOR, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Ok(()));

        // The change is visible on the immediately following view
        let view_bytes = to_bytes(&InternalViewParams::MinStartingBid);
        let mut ctx = receive_ctx(ALICE, auction_start());
        ctx.set_parameter(&view_bytes);
        let value = view_internal_value(&ctx, &host).expect_report("View should succeed");
        claim_eq!(
            value,
            InternalValue::MinStartingBid(Amount::from_micro_ccd(20_000))
        );

        // The raised starting bid governs the next first bid
        start_auction(&mut host, auction_start());
        let result = place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://example.com",
            mid_auction(),
        );
        claim_eq!(result, Err(CustomContractError::BidTooLow.into()));
    }

    #[concordium_test]
    fn test_update_internal_value_unauthorized() {
        let mut host = default_host();

        let parameter_bytes = to_bytes(&InternalValue::MinBidIncrement(Amount::from_micro_ccd(
            2_000,
        )));
        let mut ctx = receive_ctx(ALICE, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim_eq!(host.state().min_bid_increment, MIN_BID_INCREMENT);
    }

    #[concordium_test]
    fn test_fixed_values_cannot_be_updated() {
        let mut host = default_host();

        let parameter_bytes = to_bytes(&InternalValue::Beneficiary(ALICE));
        let mut ctx = receive_ctx(OPERATOR, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(
            result,
            Err(CustomContractError::OperationNotPermitted.into())
        );
        claim_eq!(host.state().beneficiary, PLATFORM);

        let parameter_bytes = to_bytes(&InternalValue::AuctionDuration(Duration::from_millis(1)));
        let mut ctx = receive_ctx(OPERATOR, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(
            result,
            Err(CustomContractError::OperationNotPermitted.into())
        );
        claim_eq!(
            host.state().auction_duration,
            Duration::from_millis(AUCTION_DURATION_MS)
        );
    }

    #[concordium_test]
    fn test_added_operator_can_start() {
        let mut host = default_host();

        let parameter_bytes = to_bytes(&OperatorUpdateParams {
            kind: OperatorUpdateKind::Add,
            address: Address::Account(BOB),
        });
        let mut ctx = receive_ctx(OPERATOR, auction_start());
        ctx.set_parameter(&parameter_bytes);
        let result = update_authority(&ctx, &mut host);
        claim_eq!(result, Ok(()));

        let view_bytes = to_bytes(&OperatorViewParams { skip: 0, show: 10 });
        let mut ctx = receive_ctx(ALICE, auction_start());
        ctx.set_parameter(&view_bytes);
        let operators = view_authority(&ctx, &host).expect_report("View should succeed");
        claim_eq!(operators.len(), 2);

        let ctx = receive_ctx(BOB, auction_start());
        let mut logger = TestLogger::init();
        let result = start(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));
        claim_eq!(host.state().current.sequence, 1);
    }

    #[concordium_test]
    fn test_time_remaining_query() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        let remaining = get_time_remaining(&receive_ctx(ALICE, mid_auction()), &host)
            .expect_report("Query should succeed");
        claim_eq!(remaining, Duration::from_millis(AUCTION_DURATION_MS / 2));

        let remaining = get_time_remaining(&receive_ctx(ALICE, auction_end()), &host)
            .expect_report("Query should succeed");
        claim_eq!(remaining, Duration::from_millis(0));
    }

    #[concordium_test]
    /// A full platform cycle:
    /// 1. The operator starts auction 1.
    /// 2. Alice bids the minimum with her url.
    /// 3. Bob outbids by exactly the increment; Alice's escrow is banked.
    /// 4. Settlement after the window pays Bob's bid to the platform.
    /// 5. The next start produces auction 2 with zeroed bid fields.
    /// 6. Alice withdraws her banked refund.
    fn test_full_cycle() {
        let mut host = default_host();
        start_auction(&mut host, auction_start());

        place_bid(
            &mut host,
            ALICE,
            MIN_STARTING_BID,
            "https://alice.example",
            auction_start(),
        )
        .expect_report("Alice's bid should succeed");

        let winning = MIN_STARTING_BID + MIN_BID_INCREMENT;
        place_bid(&mut host, BOB, winning, "https://bob.example", mid_auction())
            .expect_report("Bob's bid should succeed");

        let url = get_current_url(&receive_ctx(ALICE, mid_auction()), &host)
            .expect_report("Query should succeed");
        claim_eq!(url, "https://bob.example");

        host.set_self_balance(MIN_STARTING_BID + winning);

        let mut logger = TestLogger::init();
        finalize(&receive_ctx(BOB, auction_end()), &mut host, &mut logger)
            .expect_report("Settlement should succeed");
        claim_eq!(host.get_transfers(), [(PLATFORM, winning)]);

        start_auction(&mut host, auction_end());
        claim_eq!(host.state().current.sequence, 2);
        claim_eq!(host.state().current.highest_bid, Amount::zero());

        let result = withdraw(&receive_ctx(ALICE, auction_end()), &mut host);
        claim_eq!(result, Ok(()));
        claim_eq!(
            host.get_transfers(),
            [(PLATFORM, winning), (ALICE, MIN_STARTING_BID)]
        );
    }
}
