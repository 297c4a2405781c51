multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::funds::FundsLedger;

// ============================================================
// Configuration, fixed at deploy
// ============================================================

pub const DEFAULT_ALLOCATION_PER_EPOCH: u64 = 10;
pub const DEFAULT_EPOCH_LENGTH: u64 = 86_400;
pub const DEFAULT_MAX_BROKERS: u64 = 5;
pub const DEFAULT_MIN_CONTRIBUTION: u64 = 5;
pub const DEFAULT_MIN_EPOCHS: u64 = 28;
pub const DEFAULT_MIN_HORIZON: u64 = 7;
pub const DEFAULT_MIN_PAYERS: u64 = 1;
pub const DEFAULT_MIN_BROKERS: u64 = 1;
pub const DEFAULT_MIN_STAKE: u64 = 5;

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct InverterConfig<M: ManagedTypeApi> {
    /// Value handed to all brokers together each epoch, in unit of account.
    pub allocation_per_epoch: BigUint<M>,
    /// Seconds per epoch. Informational for the epoch driver.
    pub epoch_length: u64,
    pub min_brokers: u64,
    pub max_brokers: u64,
    /// Minimum stake value, in unit of account.
    pub min_stake: BigUint<M>,
    /// Minimum contribution value per payment, in unit of account.
    pub min_contribution: BigUint<M>,
    /// Epochs a broker must stay to get the stake back on leave.
    pub min_epochs: u64,
    /// Epochs of runway required to start and to keep running.
    pub min_horizon: u64,
    pub min_payers: u64,
    /// Consecutive below-minimum epochs tolerated before a forced cancel.
    /// Zero cancels on the first failing epoch.
    pub cancel_grace_epochs: u64,
}

impl<M: ManagedTypeApi> Default for InverterConfig<M> {
    fn default() -> Self {
        InverterConfig {
            allocation_per_epoch: BigUint::from(DEFAULT_ALLOCATION_PER_EPOCH),
            epoch_length: DEFAULT_EPOCH_LENGTH,
            min_brokers: DEFAULT_MIN_BROKERS,
            max_brokers: DEFAULT_MAX_BROKERS,
            min_stake: BigUint::from(DEFAULT_MIN_STAKE),
            min_contribution: BigUint::from(DEFAULT_MIN_CONTRIBUTION),
            min_epochs: DEFAULT_MIN_EPOCHS,
            min_horizon: DEFAULT_MIN_HORIZON,
            min_payers: DEFAULT_MIN_PAYERS,
            cancel_grace_epochs: 0,
        }
    }
}

// ============================================================
// Call outcome
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Done,
    /// Not admitted yet. The caller now sits on the waitlist.
    NotWhitelisted,
    MaxBrokersReached,
    AlreadyMember,
    BelowMinimumStake,
    BelowMinimumContribution,
    AlreadyCancelled,
    Unauthorized,
    NotAMember,
}

// ============================================================
// Roles: which whitelist instance a subject belongs to
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Broker,
    Payer,
}

// ============================================================
// Agreements
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct BrokerAgreement<M: ManagedTypeApi> {
    pub epoch_joined: u64,
    /// Stake locked at join; refunded or forfeited on leave.
    pub stake: FundsLedger<M>,
    /// Claimable now.
    pub allocated_funds: FundsLedger<M>,
    /// Everything claimed so far.
    pub claimed_funds: FundsLedger<M>,
}

impl<M: ManagedTypeApi> BrokerAgreement<M> {
    pub fn new(epoch_joined: u64, stake: FundsLedger<M>) -> Self {
        BrokerAgreement {
            epoch_joined,
            stake,
            allocated_funds: FundsLedger::new(),
            claimed_funds: FundsLedger::new(),
        }
    }
}

/// Per-epoch contributions live in their own map; this record keeps the
/// running sum used as voting weight and as refund weight on cancel.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct PayerAgreement<M: ManagedTypeApi> {
    pub total_contributed: FundsLedger<M>,
    pub allocated_funds: FundsLedger<M>,
    pub claimed_funds: FundsLedger<M>,
}

impl<M: ManagedTypeApi> Default for PayerAgreement<M> {
    fn default() -> Self {
        PayerAgreement {
            total_contributed: FundsLedger::new(),
            allocated_funds: FundsLedger::new(),
            claimed_funds: FundsLedger::new(),
        }
    }
}
