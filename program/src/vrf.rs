// Randomness provider interface and the mock VRF coordinator account
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    hash::hashv,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::{
    constants::{FIRST_REQUEST_ID, MAX_PENDING_REQUESTS, MAX_RANDOM_WORDS},
    error::RaffleError,
};

/// Source of verifiable randomness for a raffle draw.
///
/// `request_random_words` is called synchronously while starting a draw and
/// must return a unique request id. The words themselves are delivered
/// later, once per request, to the raffle's fulfillment entry point.
pub trait RandomnessProvider {
    fn request_random_words(&mut self, consumer: &Pubkey, num_words: u32)
        -> Result<u64, RaffleError>;
}

/// An outstanding randomness request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomnessRequest {
    pub request_id: u64,
    /// Raffle account that asked for the randomness
    pub consumer: Pubkey,
    pub num_words: u32,
}

impl RandomnessRequest {
    const LEN: usize = 1 + 8 + 32 + 4;
}

/// Mock VRF coordinator account.
///
/// Keeps the request table for local testing: ids are handed out in
/// increasing order and only the configured oracle may deliver words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VrfCoordinator {
    pub is_initialized: bool,
    /// Signer allowed to fulfill requests
    pub oracle: Pubkey,
    pub next_request_id: u64,
    pub requests: [Option<RandomnessRequest>; MAX_PENDING_REQUESTS],
}

const REQUESTS_LEN: usize = RandomnessRequest::LEN * MAX_PENDING_REQUESTS;

impl VrfCoordinator {
    pub fn new(oracle: Pubkey) -> Self {
        Self {
            is_initialized: true,
            oracle,
            next_request_id: FIRST_REQUEST_ID,
            requests: [None; MAX_PENDING_REQUESTS],
        }
    }

    pub fn pending(&self, request_id: u64) -> Option<&RandomnessRequest> {
        self.requests
            .iter()
            .flatten()
            .find(|request| request.request_id == request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.requests.iter().flatten().count()
    }

    /// Removes a request once its words have been delivered to `consumer`.
    pub fn complete_request(
        &mut self,
        request_id: u64,
        consumer: &Pubkey,
    ) -> Result<RandomnessRequest, RaffleError> {
        let slot = self
            .requests
            .iter_mut()
            .find(|slot| matches!(slot, Some(request) if request.request_id == request_id))
            .ok_or(RaffleError::UnknownRequest)?;
        let request = slot.ok_or(RaffleError::UnknownRequest)?;

        if request.consumer != *consumer {
            return Err(RaffleError::ConsumerMismatch);
        }
        *slot = None;
        Ok(request)
    }

    /// Words delivered for `request_id`: the oracle's own words when it
    /// supplies any, otherwise words derived from the request id the way the
    /// local mock does it.
    pub fn random_words_for(&self, request_id: u64, supplied: &[u64]) -> Vec<u64> {
        if !supplied.is_empty() {
            return supplied.to_vec();
        }
        let num_words = self
            .pending(request_id)
            .map_or(1, |request| request.num_words as usize)
            .min(MAX_RANDOM_WORDS);
        derive_random_words(request_id, num_words)
    }
}

impl RandomnessProvider for VrfCoordinator {
    fn request_random_words(
        &mut self,
        consumer: &Pubkey,
        num_words: u32,
    ) -> Result<u64, RaffleError> {
        let request_id = self.next_request_id;
        let next_request_id = request_id
            .checked_add(1)
            .ok_or(RaffleError::MathOverflow)?;
        let slot = self
            .requests
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(RaffleError::RequestTableFull)?;

        *slot = Some(RandomnessRequest {
            request_id,
            consumer: *consumer,
            num_words,
        });
        self.next_request_id = next_request_id;
        Ok(request_id)
    }
}

impl Sealed for VrfCoordinator {}

impl IsInitialized for VrfCoordinator {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for VrfCoordinator {
    const LEN: usize = 1 + 32 + 8 + REQUESTS_LEN;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, VrfCoordinator::LEN];
        let (is_initialized, oracle, next_request_id, table) =
            array_refs![src, 1, 32, 8, REQUESTS_LEN];

        let mut requests = [None; MAX_PENDING_REQUESTS];
        for (slot, chunk) in requests
            .iter_mut()
            .zip(table.chunks_exact(RandomnessRequest::LEN))
        {
            let chunk = array_ref![chunk, 0, RandomnessRequest::LEN];
            let (active, request_id, consumer, num_words) = array_refs![chunk, 1, 8, 32, 4];
            *slot = match active[0] {
                0 => None,
                1 => Some(RandomnessRequest {
                    request_id: u64::from_le_bytes(*request_id),
                    consumer: Pubkey::new_from_array(*consumer),
                    num_words: u32::from_le_bytes(*num_words),
                }),
                _ => return Err(ProgramError::InvalidAccountData),
            };
        }

        Ok(VrfCoordinator {
            is_initialized: is_initialized[0] != 0,
            oracle: Pubkey::new_from_array(*oracle),
            next_request_id: u64::from_le_bytes(*next_request_id),
            requests,
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, VrfCoordinator::LEN];
        let (is_initialized_dst, oracle_dst, next_request_id_dst, table_dst) =
            mut_array_refs![dst, 1, 32, 8, REQUESTS_LEN];

        is_initialized_dst[0] = self.is_initialized as u8;
        oracle_dst.copy_from_slice(self.oracle.as_ref());
        *next_request_id_dst = self.next_request_id.to_le_bytes();

        for (slot, chunk) in self
            .requests
            .iter()
            .zip(table_dst.chunks_exact_mut(RandomnessRequest::LEN))
        {
            let chunk = array_mut_ref![chunk, 0, RandomnessRequest::LEN];
            let (active_dst, request_id_dst, consumer_dst, num_words_dst) =
                mut_array_refs![chunk, 1, 8, 32, 4];
            let request = slot.unwrap_or_default();
            active_dst[0] = slot.is_some() as u8;
            *request_id_dst = request.request_id.to_le_bytes();
            consumer_dst.copy_from_slice(request.consumer.as_ref());
            *num_words_dst = request.num_words.to_le_bytes();
        }
    }
}

/// Deterministic words for a request: word `i` is the first eight bytes of
/// `sha256(request_id || i)`.
pub fn derive_random_words(request_id: u64, num_words: usize) -> Vec<u64> {
    (0..num_words as u64)
        .map(|index| {
            let hash = hashv(&[&request_id.to_le_bytes(), &index.to_le_bytes()]);
            random_value_from_bytes(&hash.to_bytes())
        })
        .collect()
}

/// Little-endian u64 from the first eight bytes of a randomness buffer
pub fn random_value_from_bytes(bytes: &[u8]) -> u64 {
    let mut random_value = 0u64;
    for (i, byte) in bytes.iter().take(8).enumerate() {
        random_value |= (*byte as u64) << (8 * i);
    }
    random_value
}

/// Index of the winning entry, or `None` when there are no entries
pub fn get_random_winner_index(random_value: u64, total_entries: u64) -> Option<u64> {
    random_value.checked_rem(total_entries)
}
