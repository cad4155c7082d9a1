// VRF request/fulfillment protocol for the raffle program.
//
// A request is a message to the off-chain coordinator; the answer arrives later
// as a separate `FulfillRandomWords` instruction carrying the same request id.
use solana_program::{
    clock::UnixTimestamp,
    hash::hashv,
    msg,
    pubkey::Pubkey,
};

use crate::{
    events::RaffleEvent,
    raffle_error::RaffleError,
    raffle_state::{Raffle, RaffleState, RequestId},
    upkeep::UpkeepStatus,
};

/// Everything the coordinator needs to answer a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomWordsRequest {
    pub request_id: RequestId,
    pub requester: Pubkey,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

impl RandomWordsRequest {
    pub fn event(&self) -> RaffleEvent {
        RaffleEvent::RandomWordsRequested {
            request_id: self.request_id.to_bytes(),
            key_hash: self.key_hash,
            subscription_id: self.subscription_id,
            request_confirmations: self.request_confirmations,
            callback_gas_limit: self.callback_gas_limit,
            num_words: self.num_words,
            requester: self.requester,
        }
    }
}

/// Request ids are unique per raffle and nonce, so every round gets its own.
pub fn derive_request_id(
    raffle_key: &Pubkey,
    key_hash: &[u8; 32],
    subscription_id: u64,
    nonce: u64,
) -> RequestId {
    hashv(&[
        b"vrf-request",
        raffle_key.as_ref(),
        key_hash,
        &subscription_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ])
}

/// Closes entry and issues a single randomness request for the round.
///
/// Re-checks the upkeep predicate, so a stale automation call racing another
/// close or an empty round fails with `UpkeepNotNeeded`.
pub fn request_close(
    raffle_key: &Pubkey,
    raffle: &mut Raffle,
    now: UnixTimestamp,
) -> Result<RandomWordsRequest, RaffleError> {
    let status = UpkeepStatus::of(raffle, now);
    if !status.upkeep_needed() {
        msg!(
            "Upkeep not needed: balance={}, players={}, state={:?}, elapsed={}",
            raffle.pooled_balance,
            raffle.entrant_count,
            raffle.state,
            now.saturating_sub(raffle.last_timestamp)
        );
        return Err(RaffleError::UpkeepNotNeeded);
    }

    let vrf = raffle.config.vrf;
    let request_id =
        derive_request_id(raffle_key, &vrf.key_hash, vrf.subscription_id, raffle.request_nonce);

    raffle.request_nonce = raffle.request_nonce.wrapping_add(1);
    raffle.pending_request = Some(request_id);
    raffle.state = RaffleState::Calculating;

    Ok(RandomWordsRequest {
        request_id,
        requester: *raffle_key,
        key_hash: vrf.key_hash,
        subscription_id: vrf.subscription_id,
        request_confirmations: vrf.request_confirmations,
        callback_gas_limit: vrf.callback_gas_limit,
        num_words: vrf.num_words,
    })
}

/// Checks that a fulfillment answers the outstanding request of this round.
pub fn match_fulfillment(raffle: &Raffle, request_id: &RequestId) -> Result<(), RaffleError> {
    if raffle.state != RaffleState::Calculating {
        return Err(RaffleError::RequestIdMismatch);
    }
    match raffle.pending_request {
        Some(pending) if pending == *request_id => Ok(()),
        _ => Err(RaffleError::RequestIdMismatch),
    }
}
