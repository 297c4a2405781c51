multiversx_sc::imports!();

use crate::funds::{FundsLedger, ERR_UNPRICED_TOKEN};
use crate::types::{PayerAgreement, Role};

pub const ERR_NON_FUNGIBLE: &str = "ERR_NON_FUNGIBLE";
pub const ERR_EGLD_NOT_ACCEPTED: &str = "ERR_EGLD_NOT_ACCEPTED";

/// Ledger bookkeeping for the pool: derived quantities, allocation,
/// cancellation, and moving value in and out of the contract.
///
/// Ledger errors are fatal here. Every helper that can fail aborts the
/// transaction with the ledger's message, so no partial state is committed.
#[multiversx_sc::module]
pub trait AccountingModule: crate::storage::StorageModule + crate::events::EventsModule {
    // ========================================================
    // Ledger helpers
    // ========================================================

    fn value_of(&self, ledger: &FundsLedger<Self::Api>) -> BigUint {
        let oracle = self.price_oracle().get();
        ledger
            .total(&oracle)
            .unwrap_or_else(|err| sc_panic!(err.message()))
    }

    fn debit(
        &self,
        from: &FundsLedger<Self::Api>,
        amount: &FundsLedger<Self::Api>,
    ) -> FundsLedger<Self::Api> {
        from.checked_sub(amount)
            .unwrap_or_else(|err| sc_panic!(err.message()))
    }

    /// Collects the ESDT transfers attached to the call. Only fungible,
    /// priced tokens can enter the pool.
    fn receive_payment(&self) -> FundsLedger<Self::Api> {
        require!(
            self.call_value().egld_value().clone_value() == 0u64,
            ERR_EGLD_NOT_ACCEPTED
        );

        let payments = self.call_value().all_esdt_transfers().clone_value();
        let oracle = self.price_oracle().get();
        for payment in payments.iter() {
            require!(payment.token_nonce == 0, ERR_NON_FUNGIBLE);
            require!(
                oracle.is_priced(&payment.token_identifier),
                ERR_UNPRICED_TOKEN
            );
        }
        FundsLedger::from_payments(&payments)
    }

    fn send_funds(&self, to: &ManagedAddress, ledger: &FundsLedger<Self::Api>) {
        for entry in ledger.entries().iter() {
            if entry.amount > 0u64 {
                self.send()
                    .direct_esdt(to, &entry.token_identifier, 0, &entry.amount);
            }
        }
    }

    // ========================================================
    // Derived quantities
    // ========================================================

    /// Unclaimed allocations of every broker and payer, in native tokens.
    fn allocated_funds(&self) -> FundsLedger<Self::Api> {
        let mut allocated = FundsLedger::new();
        for broker in self.brokers().iter() {
            let agreement = self.broker_agreement(&broker).get();
            allocated = allocated.plus(&agreement.allocated_funds);
        }
        for payer in self.payers().iter() {
            let agreement = self.payer_agreement(&payer).get();
            allocated = allocated.plus(&agreement.allocated_funds);
        }
        allocated
    }

    fn unallocated_funds(&self) -> FundsLedger<Self::Api> {
        self.debit(&self.funds().get(), &self.allocated_funds())
    }

    /// Unclaimed allocations converted agreement by agreement into unit of
    /// account.
    fn total_allocated_value(&self) -> BigUint {
        let mut total = BigUint::zero();
        for broker in self.brokers().iter() {
            total += self.value_of(&self.broker_agreement(&broker).get().allocated_funds);
        }
        for payer in self.payers().iter() {
            total += self.value_of(&self.payer_agreement(&payer).get().allocated_funds);
        }
        total
    }

    /// Epochs of runway at the configured allocation rate.
    fn horizon(&self) -> BigUint {
        let config = self.config().get();
        let funds_value = self.value_of(&self.funds().get());
        let allocated_value = self.total_allocated_value();
        if funds_value <= allocated_value {
            return BigUint::zero();
        }
        (funds_value - allocated_value) / config.allocation_per_epoch
    }

    /// This epoch's allocation for all brokers together, drawn from every
    /// unallocated token in proportion to its share of the unallocated value.
    fn epoch_allocation(&self) -> FundsLedger<Self::Api> {
        let unallocated = self.unallocated_funds();
        let unallocated_value = self.value_of(&unallocated);
        if unallocated_value == 0u64 {
            return FundsLedger::new();
        }

        let config = self.config().get();
        unallocated
            .scale(&config.allocation_per_epoch, &unallocated_value)
            .unwrap_or_else(|err| sc_panic!(err.message()))
            .capped_by(&unallocated)
    }

    fn minimum_conditions_met(&self) -> bool {
        let config = self.config().get();
        self.brokers().len() as u64 >= config.min_brokers
            && self.payers().len() as u64 >= config.min_payers
            && self.horizon() >= config.min_horizon
    }

    fn contribution_value(&self, payer: &ManagedAddress) -> BigUint {
        let agreement = self.payer_agreement(payer);
        if agreement.is_empty() {
            return BigUint::zero();
        }
        self.value_of(&agreement.get().total_contributed)
    }

    // ========================================================
    // State transitions
    // ========================================================

    fn record_contribution(&self, payer: &ManagedAddress, tokens: &FundsLedger<Self::Api>) {
        let epoch = self.current_epoch().get();

        let mut history = self.contributions(payer);
        let previous = history.get(&epoch).unwrap_or_default();
        history.insert(epoch, previous.plus(tokens));

        let mapper = self.payer_agreement(payer);
        let mut agreement = if mapper.is_empty() {
            PayerAgreement::default()
        } else {
            mapper.get()
        };
        agreement.total_contributed = agreement.total_contributed.plus(tokens);
        mapper.set(&agreement);

        self.payers().insert(payer.clone());
    }

    /// Splits `total` equally between the current brokers. Division dust
    /// stays unallocated. Returns what was actually handed out.
    fn allocate_to_brokers(&self, total: &FundsLedger<Self::Api>) -> FundsLedger<Self::Api> {
        let n_brokers = self.brokers().len() as u64;
        if n_brokers == 0 || total.is_empty() {
            return FundsLedger::new();
        }

        let n_brokers = BigUint::from(n_brokers);
        let per_broker = total
            .div_scalar(&n_brokers)
            .unwrap_or_else(|err| sc_panic!(err.message()));
        for broker in self.brokers().iter() {
            self.broker_agreement(&broker).update(|agreement| {
                agreement.allocated_funds = agreement.allocated_funds.plus(&per_broker);
            });
        }
        per_broker.mul_scalar(&n_brokers)
    }

    /// Earmarks everything still unallocated to the payers, weighted by
    /// their contribution value. The last payer takes the rounding dust.
    fn refund_payers(&self) {
        let remainder = self.unallocated_funds();
        let n_payers = self.payers().len();
        if remainder.is_empty() || n_payers == 0 {
            return;
        }

        let mut total_weight = BigUint::zero();
        for payer in self.payers().iter() {
            total_weight += self.contribution_value(&payer);
        }

        let mut distributed = FundsLedger::new();
        for (index, payer) in self.payers().iter().enumerate() {
            let share = if index + 1 == n_payers {
                self.debit(&remainder, &distributed)
            } else if total_weight == 0u64 {
                FundsLedger::new()
            } else {
                remainder
                    .scale(&self.contribution_value(&payer), &total_weight)
                    .unwrap_or_else(|err| sc_panic!(err.message()))
            };

            distributed = distributed.plus(&share);
            self.payer_agreement(&payer).update(|agreement| {
                agreement.allocated_funds = agreement.allocated_funds.plus(&share);
            });
        }
    }

    /// Terminal distribution: reserve `min_horizon` epochs of allocation for
    /// the brokers, hand the rest back to the payers, latch `cancelled`.
    fn cancel_agreement(&self, forced: bool) {
        let config = self.config().get();
        let mut horizon_funds = FundsLedger::new();

        if !self.brokers().is_empty() {
            let allocation = self.epoch_allocation();
            let spendable = self.unallocated_funds();
            for _ in 0..config.min_horizon {
                let remaining = self.debit(&spendable, &horizon_funds);
                if remaining.is_empty() || allocation.is_empty() {
                    break;
                }
                horizon_funds = horizon_funds.plus(&allocation.capped_by(&remaining));
            }
            self.allocate_to_brokers(&horizon_funds);
        }

        self.refund_payers();
        self.cancelled().set(true);

        self.cancelled_event(self.current_epoch().get(), forced, &horizon_funds);
    }

    /// One tick of the epoch clock.
    fn advance_epoch(&self) {
        let epoch = self.current_epoch().get();
        let mut allocation = FundsLedger::new();

        if !self.cancelled().get() {
            if !self.started().get() && self.minimum_conditions_met() {
                self.started().set(true);
                self.started_event(epoch);
            }

            if self.started().get() {
                if self.minimum_conditions_met() {
                    self.below_minimum_epochs().set(0);
                    allocation = self.allocate_to_brokers(&self.epoch_allocation());
                } else {
                    let streak = self.below_minimum_epochs().get() + 1;
                    self.below_minimum_epochs().set(streak);
                    if streak > self.config().get().cancel_grace_epochs {
                        self.cancel_agreement(true);
                    }
                }
            }
        }

        self.current_epoch().set(epoch + 1);
        self.epoch_advanced_event(epoch + 1, &allocation);
    }

    /// Moves every allocation held by `wallet` (as broker and as payer) out
    /// of the pool and into the wallet's account.
    fn pay_out_claims(&self, wallet: &ManagedAddress) -> FundsLedger<Self::Api> {
        let mut payout = FundsLedger::new();

        let broker_mapper = self.broker_agreement(wallet);
        if !broker_mapper.is_empty() {
            let claimed = broker_mapper.update(|agreement| {
                let claim = agreement.allocated_funds.clone();
                agreement.claimed_funds = agreement.claimed_funds.plus(&claim);
                agreement.allocated_funds = FundsLedger::new();
                claim
            });
            if !claimed.is_empty() {
                self.claimed_event(wallet, Role::Broker, &claimed);
                payout = payout.plus(&claimed);
            }
        }

        let payer_mapper = self.payer_agreement(wallet);
        if !payer_mapper.is_empty() {
            let claimed = payer_mapper.update(|agreement| {
                let claim = agreement.allocated_funds.clone();
                agreement.claimed_funds = agreement.claimed_funds.plus(&claim);
                agreement.allocated_funds = FundsLedger::new();
                claim
            });
            if !claimed.is_empty() {
                self.claimed_event(wallet, Role::Payer, &claimed);
                payout = payout.plus(&claimed);
            }
        }

        if !payout.is_empty() {
            self.funds().set(self.debit(&self.funds().get(), &payout));
            self.send_funds(wallet, &payout);
        }
        payout
    }
}
