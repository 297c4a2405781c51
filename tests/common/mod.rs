#![allow(dead_code, deprecated)]

use multiversx_sc::types::{
    Address, BigUint as ManagedBigUint, ManagedAddress, MultiValueEncoded, TokenIdentifier,
};
use multiversx_sc_scenario::{api::DebugApi, num_bigint::BigUint, whitebox_legacy::*};

use proposal_inverter::funds::{FundsLedger, PRICE_ONE};
use proposal_inverter::types::{
    InverterConfig, Outcome, DEFAULT_MAX_BROKERS, DEFAULT_MIN_CONTRIBUTION,
};
use proposal_inverter::whitelist::WhitelistPolicy;
use proposal_inverter::ProposalInverter;

pub const WASM_PATH: &str = "output/proposal-inverter.wasm";

pub const USD: &[u8] = b"USD-123456";
pub const ABC: &[u8] = b"ABC-123456";
pub const DEF: &[u8] = b"DEF-123456";

pub type InverterObj = proposal_inverter::ContractObj<DebugApi>;
pub type Builder = fn() -> InverterObj;

pub fn big(amount: u64) -> BigUint {
    BigUint::from(amount)
}

/// Managed single-token USD ledger. Only usable inside a tx or query.
pub fn usd(amount: u64) -> FundsLedger<DebugApi> {
    FundsLedger::single(
        TokenIdentifier::from_esdt_bytes(USD),
        ManagedBigUint::from(amount),
    )
}

pub fn managed(address: &Address) -> ManagedAddress<DebugApi> {
    ManagedAddress::from_address(address)
}

/// Deploy parameters on top of the default agreement configuration.
pub struct Deploy {
    pub owner_funds: u64,
    pub deposit: u64,
    pub broker_policy: WhitelistPolicy,
    pub payer_policy: WhitelistPolicy,
    pub max_brokers: u64,
    pub min_contribution: u64,
    pub cancel_grace_epochs: u64,
    /// Also quote ABC at 1.5 USD.
    pub quote_abc: bool,
    /// Raw DEF price scaled by `PRICE_ONE`; zero leaves DEF unpriced.
    pub def_price: u64,
}

impl Default for Deploy {
    fn default() -> Self {
        Deploy {
            owner_funds: 1_000,
            deposit: 500,
            broker_policy: WhitelistPolicy::NoVote,
            payer_policy: WhitelistPolicy::NoVote,
            max_brokers: DEFAULT_MAX_BROKERS,
            min_contribution: DEFAULT_MIN_CONTRIBUTION,
            cancel_grace_epochs: 0,
            quote_abc: false,
            def_price: 0,
        }
    }
}

pub struct InverterSetup {
    pub b_mock: BlockchainStateWrapper,
    pub owner: Address,
    pub inverter: ContractObjWrapper<InverterObj, Builder>,
}

impl InverterSetup {
    pub fn new(deploy: Deploy) -> Self {
        let rust_zero = big(0);
        let mut b_mock = BlockchainStateWrapper::new();
        let owner = b_mock.create_user_account(&rust_zero);
        b_mock.set_esdt_balance(&owner, USD, &big(deploy.owner_funds));

        let inverter = b_mock.create_sc_account(
            &rust_zero,
            Some(&owner),
            proposal_inverter::contract_obj as Builder,
            WASM_PATH,
        );

        let Deploy {
            deposit,
            broker_policy,
            payer_policy,
            max_brokers,
            min_contribution,
            cancel_grace_epochs,
            quote_abc,
            def_price,
            ..
        } = deploy;
        let init = move |sc: InverterObj| {
            let mut config = InverterConfig::default();
            config.max_brokers = max_brokers;
            config.min_contribution = ManagedBigUint::from(min_contribution);
            config.cancel_grace_epochs = cancel_grace_epochs;

            let mut prices = MultiValueEncoded::new();
            if quote_abc {
                prices.push(
                    (
                        TokenIdentifier::from_esdt_bytes(ABC),
                        ManagedBigUint::from(PRICE_ONE + PRICE_ONE / 2),
                    )
                        .into(),
                );
            }
            if def_price > 0 {
                prices.push(
                    (
                        TokenIdentifier::from_esdt_bytes(DEF),
                        ManagedBigUint::from(def_price),
                    )
                        .into(),
                );
            }

            sc.init(
                config,
                TokenIdentifier::from_esdt_bytes(USD),
                broker_policy,
                payer_policy,
                prices,
            );
        };

        b_mock
            .execute_tx(&owner, &inverter, &rust_zero, init)
            .assert_ok();

        let mut setup = InverterSetup {
            b_mock,
            owner,
            inverter,
        };
        if deposit > 0 {
            let owner = setup.owner.clone();
            setup.fund(&owner, deposit, Outcome::Done);
        }
        setup
    }

    pub fn wallet(&mut self, usd_funds: u64) -> Address {
        let wallet = self.b_mock.create_user_account(&big(0));
        self.b_mock.set_esdt_balance(&wallet, USD, &big(usd_funds));
        wallet
    }

    // ── Calls ──

    pub fn fund(&mut self, caller: &Address, amount: u64, expected: Outcome) {
        self.b_mock
            .execute_esdt_transfer(caller, &self.inverter, USD, 0, &big(amount), |sc| {
                assert_eq!(sc.fund(), expected);
            })
            .assert_ok();
    }

    pub fn join(&mut self, broker: &Address, stake: u64, expected: Outcome) {
        self.b_mock
            .execute_esdt_transfer(broker, &self.inverter, USD, 0, &big(stake), |sc| {
                assert_eq!(sc.join(), expected);
            })
            .assert_ok();
    }

    pub fn pay(&mut self, payer: &Address, amount: u64, expected: Outcome) {
        self.b_mock
            .execute_esdt_transfer(payer, &self.inverter, USD, 0, &big(amount), |sc| {
                assert_eq!(sc.pay(), expected);
            })
            .assert_ok();
    }

    pub fn leave(&mut self, broker: &Address, expected: Outcome) {
        self.b_mock
            .execute_tx(broker, &self.inverter, &big(0), |sc| {
                assert_eq!(sc.leave(), expected);
            })
            .assert_ok();
    }

    pub fn claim(&mut self, wallet: &Address, expected: Outcome) {
        self.b_mock
            .execute_tx(wallet, &self.inverter, &big(0), |sc| {
                assert_eq!(sc.claim(), expected);
            })
            .assert_ok();
    }

    pub fn cancel(&mut self, caller: &Address, expected: Outcome) {
        self.b_mock
            .execute_tx(caller, &self.inverter, &big(0), |sc| {
                assert_eq!(sc.cancel(), expected);
            })
            .assert_ok();
    }

    pub fn iter_epoch(&mut self, epochs: u64) {
        let caller = self.owner.clone();
        self.b_mock
            .execute_tx(&caller, &self.inverter, &big(0), |sc| {
                sc.iter_epoch(epochs);
            })
            .assert_ok();
    }

    pub fn vote_broker(&mut self, voter: &Address, broker: &Address, approve: bool, expected: Outcome) {
        let broker = broker.clone();
        self.b_mock
            .execute_tx(voter, &self.inverter, &big(0), |sc| {
                assert_eq!(sc.vote_broker(managed(&broker), approve), expected);
            })
            .assert_ok();
    }

    // ── Checks ──

    pub fn check_usd(&self, wallet: &Address, amount: u64) {
        self.b_mock.check_esdt_balance(wallet, USD, &big(amount));
    }

    /// Pool and stake ledgers, and the contract's real balance behind them.
    pub fn check_inverter(&mut self, funds: u64, stake: u64) {
        self.b_mock
            .execute_query(&self.inverter, |sc| {
                assert_eq!(sc.get_funds(), usd(funds));
                assert_eq!(sc.get_stake(), usd(stake));
            })
            .assert_ok();
        self.b_mock
            .check_esdt_balance(self.inverter.address_ref(), USD, &big(funds + stake));
    }

    pub fn check_number_of_brokers(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.inverter, |sc| {
                assert_eq!(sc.get_number_of_brokers(), expected);
            })
            .assert_ok();
    }

    pub fn check_allocated(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.inverter, |sc| {
                assert_eq!(sc.get_allocated_funds(), usd(expected));
            })
            .assert_ok();
    }

    pub fn check_broker_lists(&mut self, broker: &Address, whitelisted: bool, waitlisted: bool) {
        let broker = broker.clone();
        self.b_mock
            .execute_query(&self.inverter, |sc| {
                assert_eq!(sc.in_broker_whitelist(managed(&broker)), whitelisted);
                assert_eq!(sc.in_broker_waitlist(managed(&broker)), waitlisted);
            })
            .assert_ok();
    }
}
