#![no_std]

multiversx_sc::imports!();

pub mod accounting;
pub mod events;
pub mod funds;
pub mod storage;
pub mod types;
pub mod whitelist;

use funds::{FundsLedger, PriceOracle};
use types::{BrokerAgreement, InverterConfig, Outcome, PayerAgreement, Role};
use whitelist::WhitelistPolicy;

// ============================================================
// Errors
// ============================================================

pub const ERR_INVALID_CONFIG: &str = "ERR_INVALID_CONFIG";
pub const ERR_INVALID_POLICY: &str = "ERR_INVALID_POLICY";
pub const ERR_INVALID_PRICE: &str = "ERR_INVALID_PRICE";

// ============================================================
// Contract
// ============================================================

/// Reverse-funding agreement. The owner and payers fill a pool, brokers stake
/// to join and draw an equal share of a fixed per-epoch allocation, and a
/// cancellation earmarks whatever is left to its claimants.
///
/// Policy rejections never revert: the attached payment goes back to the
/// caller, a `rejected` event is emitted, and the reason is returned.
#[multiversx_sc::contract]
pub trait ProposalInverter:
    storage::StorageModule
    + events::EventsModule
    + accounting::AccountingModule
    + whitelist::WhitelistModule
{
    // ========================================================
    // Init / Upgrade
    // ========================================================

    /// The deployer becomes the owner. Its seed funds arrive through `fund`,
    /// since a constructor only accepts EGLD.
    #[init]
    fn init(
        &self,
        config: InverterConfig<Self::Api>,
        unit_of_account: TokenIdentifier,
        broker_policy: WhitelistPolicy,
        payer_policy: WhitelistPolicy,
        prices: MultiValueEncoded<MultiValue2<TokenIdentifier, BigUint>>,
    ) {
        require!(config.max_brokers > 0, ERR_INVALID_CONFIG);
        require!(config.max_brokers >= config.min_brokers, ERR_INVALID_CONFIG);
        require!(config.allocation_per_epoch > 0u64, ERR_INVALID_CONFIG);
        require!(
            broker_policy.is_valid() && payer_policy.is_valid(),
            ERR_INVALID_POLICY
        );

        let mut oracle = PriceOracle::new(unit_of_account);
        for quote in prices.into_iter() {
            let (token, price) = quote.into_tuple();
            require!(price > 0u64, ERR_INVALID_PRICE);
            oracle = oracle.with_quote(token, price);
        }
        self.price_oracle().set(&oracle);
        self.config().set(&config);
        self.whitelist_policy(Role::Broker).set(broker_policy);
        self.whitelist_policy(Role::Payer).set(payer_policy);

        let owner = self.blockchain().get_caller();
        self.owner_address().set(&owner);
        self.cancelled().set(false);
        self.started().set(false);
        self.current_epoch().set(0u64);
        self.below_minimum_epochs().set(0u64);
        self.stake().set(FundsLedger::new());
        self.funds().set(FundsLedger::new());
        if payer_policy.tracks_state() {
            self.add_whitelist(Role::Payer, &owner);
        }

        self.deployed_event(&owner, &config);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: fund (owner only)
    // Seeds the pool as the owner's contribution at the current
    // epoch, then checks whether the agreement can start.
    // ========================================================

    #[endpoint(fund)]
    #[payable("*")]
    fn fund(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        let tokens = self.receive_payment();

        if caller != self.owner_address().get() {
            return self.reject(&caller, &tokens, Outcome::Unauthorized);
        }
        if tokens.is_empty() {
            return self.reject(&caller, &tokens, Outcome::BelowMinimumContribution);
        }
        if self.cancelled().get() {
            return self.reject(&caller, &tokens, Outcome::AlreadyCancelled);
        }

        let epoch = self.current_epoch().get();
        self.record_contribution(&caller, &tokens);
        self.funds().update(|funds| *funds = funds.plus(&tokens));
        self.funded_event(&caller, epoch, &tokens);

        if !self.started().get() && self.minimum_conditions_met() {
            self.started().set(true);
            self.started_event(epoch);
        }
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: join
    // Stake attached to the call; rejected stakes are returned.
    // ========================================================

    #[endpoint(join)]
    #[payable("*")]
    fn join(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        let stake = self.receive_payment();
        let config = self.config().get();

        if self.brokers().contains(&caller) {
            return self.reject(&caller, &stake, Outcome::AlreadyMember);
        }
        if self.brokers().len() as u64 + 1 > config.max_brokers {
            return self.reject(&caller, &stake, Outcome::MaxBrokersReached);
        }
        if self.value_of(&stake) < config.min_stake {
            return self.reject(&caller, &stake, Outcome::BelowMinimumStake);
        }
        if self.cancelled().get() {
            return self.reject(&caller, &stake, Outcome::AlreadyCancelled);
        }
        if !self.in_whitelist(Role::Broker, &caller) {
            self.add_waitlist(Role::Broker, &caller);
            return self.reject(&caller, &stake, Outcome::NotWhitelisted);
        }

        let epoch = self.current_epoch().get();
        self.stake().update(|pool| *pool = pool.plus(&stake));
        self.broker_agreement(&caller)
            .set(BrokerAgreement::new(epoch, stake.clone()));
        self.brokers().insert(caller.clone());

        self.joined_event(&caller, epoch, &stake);
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: pay
    // ========================================================

    #[endpoint(pay)]
    #[payable("*")]
    fn pay(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        let tokens = self.receive_payment();
        let config = self.config().get();

        if tokens.is_empty() || self.value_of(&tokens) < config.min_contribution {
            return self.reject(&caller, &tokens, Outcome::BelowMinimumContribution);
        }
        if self.cancelled().get() {
            return self.reject(&caller, &tokens, Outcome::AlreadyCancelled);
        }
        if !self.in_whitelist(Role::Payer, &caller) {
            self.add_waitlist(Role::Payer, &caller);
            return self.reject(&caller, &tokens, Outcome::NotWhitelisted);
        }

        self.record_contribution(&caller, &tokens);
        self.funds().update(|funds| *funds = funds.plus(&tokens));

        self.paid_event(&caller, self.current_epoch().get(), &tokens);
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: leave
    // Stake comes back after min_epochs or once cancelled,
    // otherwise it is forfeited to the pool.
    // ========================================================

    #[endpoint(leave)]
    fn leave(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        if !self.brokers().contains(&caller) {
            return self.reject(&caller, &FundsLedger::new(), Outcome::NotAMember);
        }

        let agreement = self.broker_agreement(&caller).get();
        let config = self.config().get();
        let served = self
            .current_epoch()
            .get()
            .saturating_sub(agreement.epoch_joined);
        let refund = self.cancelled().get() || served >= config.min_epochs;

        self.stake()
            .set(self.debit(&self.stake().get(), &agreement.stake));
        if refund {
            self.send_funds(&caller, &agreement.stake);
        } else {
            self.funds()
                .update(|funds| *funds = funds.plus(&agreement.stake));
        }

        self.pay_out_claims(&caller);
        self.broker_agreement(&caller).clear();
        self.brokers().swap_remove(&caller);

        self.left_event(&caller, refund, &agreement.stake);
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: claim
    // Pays out both the broker and the payer allocation.
    // ========================================================

    #[endpoint(claim)]
    fn claim(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        if !self.brokers().contains(&caller) && self.payer_agreement(&caller).is_empty() {
            return self.reject(&caller, &FundsLedger::new(), Outcome::NotAMember);
        }

        self.pay_out_claims(&caller);
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: cancel (owner only)
    // ========================================================

    #[endpoint(cancel)]
    fn cancel(&self) -> Outcome {
        let caller = self.blockchain().get_caller();
        if caller != self.owner_address().get() {
            return self.reject(&caller, &FundsLedger::new(), Outcome::Unauthorized);
        }
        if self.cancelled().get() {
            return self.reject(&caller, &FundsLedger::new(), Outcome::AlreadyCancelled);
        }

        self.cancel_agreement(false);
        Outcome::Done
    }

    // ========================================================
    // ENDPOINT: iterEpoch
    // Driven by an external scheduler; anyone may call it.
    // ========================================================

    #[endpoint(iterEpoch)]
    fn iter_epoch(&self, epochs: u64) {
        for _ in 0..epochs {
            self.advance_epoch();
        }
    }

    // ========================================================
    // ENDPOINTS: votes
    // ========================================================

    #[endpoint(voteBroker)]
    fn vote_broker(&self, broker: ManagedAddress, approve: bool) -> Outcome {
        let caller = self.blockchain().get_caller();
        let outcome = self.cast_vote(Role::Broker, &caller, &broker, approve);
        if outcome != Outcome::Done {
            self.rejected_event(&caller, outcome);
        }
        outcome
    }

    #[endpoint(votePayer)]
    fn vote_payer(&self, payer: ManagedAddress, approve: bool) -> Outcome {
        let caller = self.blockchain().get_caller();
        let outcome = self.cast_vote(Role::Payer, &caller, &payer, approve);
        if outcome != Outcome::Done {
            self.rejected_event(&caller, outcome);
        }
        outcome
    }

    fn reject(
        &self,
        caller: &ManagedAddress,
        refund: &FundsLedger<Self::Api>,
        reason: Outcome,
    ) -> Outcome {
        self.send_funds(caller, refund);
        self.rejected_event(caller, reason);
        reason
    }

    // ========================================================
    // VIEWS: read-only queries
    // ========================================================

    #[view(getFunds)]
    fn get_funds(&self) -> FundsLedger<Self::Api> {
        self.funds().get()
    }

    #[view(getStake)]
    fn get_stake(&self) -> FundsLedger<Self::Api> {
        self.stake().get()
    }

    #[view(getCurrentEpoch)]
    fn get_current_epoch(&self) -> u64 {
        self.current_epoch().get()
    }

    #[view(isCancelled)]
    fn is_cancelled(&self) -> bool {
        self.cancelled().get()
    }

    #[view(isStarted)]
    fn is_started(&self) -> bool {
        self.started().get()
    }

    #[view(getOwner)]
    fn get_owner(&self) -> ManagedAddress {
        self.owner_address().get()
    }

    #[view(getConfig)]
    fn get_config(&self) -> InverterConfig<Self::Api> {
        self.config().get()
    }

    #[view(getPriceOracle)]
    fn get_price_oracle(&self) -> PriceOracle<Self::Api> {
        self.price_oracle().get()
    }

    #[view(getNumberOfBrokers)]
    fn get_number_of_brokers(&self) -> u64 {
        self.brokers().len() as u64
    }

    #[view(getNumberOfPayers)]
    fn get_number_of_payers(&self) -> u64 {
        self.payers().len() as u64
    }

    /// Allocation the brokers would share if an epoch were allocated now.
    #[view(getAllocation)]
    fn get_allocation(&self) -> FundsLedger<Self::Api> {
        self.epoch_allocation()
    }

    #[view(getHorizon)]
    fn get_horizon(&self) -> BigUint {
        self.horizon()
    }

    #[view(getAllocatedFunds)]
    fn get_allocated_funds(&self) -> FundsLedger<Self::Api> {
        self.allocated_funds()
    }

    #[view(getTotalAllocatedFunds)]
    fn get_total_allocated_funds(&self) -> BigUint {
        self.total_allocated_value()
    }

    #[view(minimumConditionsMet)]
    fn get_minimum_conditions_met(&self) -> bool {
        self.minimum_conditions_met()
    }

    #[view(getBrokerAgreement)]
    fn get_broker_agreement(
        &self,
        broker: ManagedAddress,
    ) -> OptionalValue<BrokerAgreement<Self::Api>> {
        let mapper = self.broker_agreement(&broker);
        if mapper.is_empty() {
            return OptionalValue::None;
        }
        OptionalValue::Some(mapper.get())
    }

    #[view(getPayerAgreement)]
    fn get_payer_agreement(
        &self,
        payer: ManagedAddress,
    ) -> OptionalValue<PayerAgreement<Self::Api>> {
        let mapper = self.payer_agreement(&payer);
        if mapper.is_empty() {
            return OptionalValue::None;
        }
        OptionalValue::Some(mapper.get())
    }

    #[view(getPayerContributions)]
    fn get_payer_contributions(
        &self,
        payer: ManagedAddress,
    ) -> MultiValueEncoded<MultiValue2<u64, FundsLedger<Self::Api>>> {
        let mut result = MultiValueEncoded::new();
        for (epoch, contribution) in self.contributions(&payer).iter() {
            result.push((epoch, contribution).into());
        }
        result
    }

    /// `(joined, paid, owned)` for one account.
    #[view(getWalletRoles)]
    fn get_wallet_roles(&self, wallet: ManagedAddress) -> MultiValue3<bool, bool, bool> {
        let joined = self.brokers().contains(&wallet);
        let paid = self.payers().contains(&wallet);
        let owned = wallet == self.owner_address().get();
        (joined, paid, owned).into()
    }

    #[view(inBrokerWhitelist)]
    fn in_broker_whitelist(&self, broker: ManagedAddress) -> bool {
        self.in_whitelist(Role::Broker, &broker)
    }

    #[view(inBrokerWaitlist)]
    fn in_broker_waitlist(&self, broker: ManagedAddress) -> bool {
        self.in_waitlist(Role::Broker, &broker)
    }

    #[view(inPayerWhitelist)]
    fn in_payer_whitelist(&self, payer: ManagedAddress) -> bool {
        self.in_whitelist(Role::Payer, &payer)
    }

    #[view(inPayerWaitlist)]
    fn in_payer_waitlist(&self, payer: ManagedAddress) -> bool {
        self.in_waitlist(Role::Payer, &payer)
    }

    #[view(getBrokerVotes)]
    fn get_broker_votes(
        &self,
        broker: ManagedAddress,
    ) -> MultiValueEncoded<MultiValue2<ManagedAddress, bool>> {
        let mut result = MultiValueEncoded::new();
        for (voter, approve) in self.votes(Role::Broker, &broker).iter() {
            result.push((voter, approve).into());
        }
        result
    }

    #[view(getPayerVotes)]
    fn get_payer_votes(
        &self,
        payer: ManagedAddress,
    ) -> MultiValueEncoded<MultiValue2<ManagedAddress, bool>> {
        let mut result = MultiValueEncoded::new();
        for (voter, approve) in self.votes(Role::Payer, &payer).iter() {
            result.push((voter, approve).into());
        }
        result
    }
}
