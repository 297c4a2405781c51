multiversx_sc::imports!();

use crate::funds::{FundsLedger, PriceOracle};
use crate::types::{BrokerAgreement, InverterConfig, PayerAgreement};

#[multiversx_sc::module]
pub trait StorageModule {
    // ── Configuration ──

    #[storage_mapper("ownerAddress")]
    fn owner_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("config")]
    fn config(&self) -> SingleValueMapper<InverterConfig<Self::Api>>;

    #[storage_mapper("priceOracle")]
    fn price_oracle(&self) -> SingleValueMapper<PriceOracle<Self::Api>>;

    // ── Pool state ──

    #[storage_mapper("funds")]
    fn funds(&self) -> SingleValueMapper<FundsLedger<Self::Api>>;

    #[storage_mapper("stake")]
    fn stake(&self) -> SingleValueMapper<FundsLedger<Self::Api>>;

    #[storage_mapper("cancelled")]
    fn cancelled(&self) -> SingleValueMapper<bool>;

    #[storage_mapper("started")]
    fn started(&self) -> SingleValueMapper<bool>;

    #[storage_mapper("currentEpoch")]
    fn current_epoch(&self) -> SingleValueMapper<u64>;

    /// Consecutive started epochs that failed the minimum conditions.
    #[storage_mapper("belowMinimumEpochs")]
    fn below_minimum_epochs(&self) -> SingleValueMapper<u64>;

    // ── Brokers ──

    #[storage_mapper("brokers")]
    fn brokers(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("brokerAgreement")]
    fn broker_agreement(
        &self,
        broker: &ManagedAddress,
    ) -> SingleValueMapper<BrokerAgreement<Self::Api>>;

    // ── Payers ──

    #[storage_mapper("payers")]
    fn payers(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("payerAgreement")]
    fn payer_agreement(
        &self,
        payer: &ManagedAddress,
    ) -> SingleValueMapper<PayerAgreement<Self::Api>>;

    #[storage_mapper("contributions")]
    fn contributions(
        &self,
        payer: &ManagedAddress,
    ) -> MapMapper<u64, FundsLedger<Self::Api>>;
}
