multiversx_sc::imports!();

use crate::funds::FundsLedger;
use crate::types::{InverterConfig, Outcome, Role};

#[multiversx_sc::module]
pub trait EventsModule {
    #[event("deployed")]
    fn deployed_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        config: &InverterConfig<Self::Api>,
    );

    #[event("funded")]
    fn funded_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] epoch: u64,
        funds: &FundsLedger<Self::Api>,
    );

    #[event("joined")]
    fn joined_event(
        &self,
        #[indexed] broker: &ManagedAddress,
        #[indexed] epoch: u64,
        stake: &FundsLedger<Self::Api>,
    );

    #[event("left")]
    fn left_event(
        &self,
        #[indexed] broker: &ManagedAddress,
        #[indexed] stake_refunded: bool,
        stake: &FundsLedger<Self::Api>,
    );

    #[event("paid")]
    fn paid_event(
        &self,
        #[indexed] payer: &ManagedAddress,
        #[indexed] epoch: u64,
        contribution: &FundsLedger<Self::Api>,
    );

    #[event("claimed")]
    fn claimed_event(
        &self,
        #[indexed] claimant: &ManagedAddress,
        #[indexed] role: Role,
        amount: &FundsLedger<Self::Api>,
    );

    #[event("voted")]
    fn voted_event(
        &self,
        #[indexed] role: Role,
        #[indexed] voter: &ManagedAddress,
        #[indexed] subject: &ManagedAddress,
        approve: bool,
    );

    #[event("whitelisted")]
    fn whitelisted_event(&self, #[indexed] role: Role, #[indexed] subject: &ManagedAddress);

    #[event("waitlisted")]
    fn waitlisted_event(&self, #[indexed] role: Role, #[indexed] subject: &ManagedAddress);

    #[event("epochAdvanced")]
    fn epoch_advanced_event(
        &self,
        #[indexed] epoch: u64,
        allocation: &FundsLedger<Self::Api>,
    );

    #[event("started")]
    fn started_event(&self, #[indexed] epoch: u64);

    #[event("cancelled")]
    fn cancelled_event(
        &self,
        #[indexed] epoch: u64,
        #[indexed] forced: bool,
        horizon_funds: &FundsLedger<Self::Api>,
    );

    #[event("rejected")]
    fn rejected_event(&self, #[indexed] caller: &ManagedAddress, #[indexed] reason: Outcome);
}
