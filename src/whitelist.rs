multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::types::{Outcome, Role};

/// Basis points denominator for vote thresholds.
pub const BPS: u64 = 10_000;

// ============================================================
// Admission policies
// ============================================================

/// How a role's whitelist is governed. Each variant only supplies its
/// admission and removal predicates; the vote bookkeeping is shared.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum WhitelistPolicy {
    /// Everyone is admitted and nothing is tracked.
    NoVote,
    /// Only the owner's vote counts.
    OwnerVote,
    /// One approving payer admits; removal needs every payer against.
    PayerVote,
    /// Share of current payers approving, in basis points.
    EqualVote(u64),
    /// Share of contribution value approving, in basis points.
    WeightedVote(u64),
    /// Every current payer must approve; one objection removes.
    UnanimousVote,
}

impl WhitelistPolicy {
    pub fn is_valid(&self) -> bool {
        match self {
            WhitelistPolicy::EqualVote(min_vote) | WhitelistPolicy::WeightedVote(min_vote) => {
                *min_vote <= BPS
            },
            _ => true,
        }
    }

    /// `false` for the identity policy, which keeps no lists or votes.
    pub fn tracks_state(&self) -> bool {
        *self != WhitelistPolicy::NoVote
    }

    pub fn accepts_voter(&self, is_owner: bool, is_payer: bool) -> bool {
        match self {
            WhitelistPolicy::NoVote => false,
            WhitelistPolicy::OwnerVote => is_owner,
            _ => is_payer,
        }
    }

    pub fn admits<M: ManagedTypeApi>(&self, tally: &VoteTally<M>) -> bool {
        match self {
            WhitelistPolicy::NoVote => true,
            WhitelistPolicy::OwnerVote => tally.owner_vote == Some(true),
            WhitelistPolicy::PayerVote => tally.payer_yes > 0,
            WhitelistPolicy::EqualVote(min_vote) => {
                tally.payers > 0 && tally.payer_yes * BPS >= *min_vote * tally.payers
            },
            WhitelistPolicy::WeightedVote(min_vote) => {
                tally.weight_total > 0u64
                    && &tally.weight_yes * &BigUint::<M>::from(BPS)
                        >= &tally.weight_total * &BigUint::<M>::from(*min_vote)
            },
            WhitelistPolicy::UnanimousVote => {
                tally.payers > 0 && tally.payer_yes == tally.payers
            },
        }
    }

    pub fn removes<M: ManagedTypeApi>(&self, tally: &VoteTally<M>) -> bool {
        match self {
            WhitelistPolicy::NoVote => false,
            WhitelistPolicy::OwnerVote => tally.owner_vote == Some(false),
            WhitelistPolicy::PayerVote => tally.payers > 0 && tally.payer_no == tally.payers,
            WhitelistPolicy::EqualVote(_) | WhitelistPolicy::WeightedVote(_) => !self.admits(tally),
            WhitelistPolicy::UnanimousVote => tally.payer_no > 0,
        }
    }
}

// ============================================================
// Vote tally
// ============================================================

/// Snapshot of the votes cast on one subject, measured against the payer
/// set and contributions as they are right now.
#[derive(Clone, Debug)]
pub struct VoteTally<M: ManagedTypeApi> {
    pub owner_vote: Option<bool>,
    pub payers: u64,
    pub payer_yes: u64,
    pub payer_no: u64,
    pub weight_total: BigUint<M>,
    pub weight_yes: BigUint<M>,
}

impl<M: ManagedTypeApi> VoteTally<M> {
    pub fn new(owner_vote: Option<bool>) -> Self {
        VoteTally {
            owner_vote,
            payers: 0,
            payer_yes: 0,
            payer_no: 0,
            weight_total: BigUint::zero(),
            weight_yes: BigUint::zero(),
        }
    }

    /// Counts one current payer, whether or not it has voted.
    pub fn record(&mut self, vote: Option<bool>, weight: &BigUint<M>) {
        self.payers += 1;
        self.weight_total += weight;
        match vote {
            Some(true) => {
                self.payer_yes += 1;
                self.weight_yes += weight;
            },
            Some(false) => self.payer_no += 1,
            None => {},
        }
    }
}

// ============================================================
// Whitelist module
// ============================================================

#[multiversx_sc::module]
pub trait WhitelistModule:
    crate::storage::StorageModule + crate::events::EventsModule + crate::accounting::AccountingModule
{
    fn in_whitelist(&self, role: Role, subject: &ManagedAddress) -> bool {
        if !self.whitelist_policy(role).get().tracks_state() {
            return true;
        }
        self.whitelist(role).contains(subject)
    }

    fn in_waitlist(&self, role: Role, subject: &ManagedAddress) -> bool {
        if !self.whitelist_policy(role).get().tracks_state() {
            return false;
        }
        self.waitlist(role).contains(subject)
    }

    /// Starts tracking a subject. Known subjects are left where they are.
    fn add_waitlist(&self, role: Role, subject: &ManagedAddress) {
        if !self.whitelist_policy(role).get().tracks_state()
            || self.whitelist(role).contains(subject)
        {
            return;
        }
        if self.waitlist(role).insert(subject.clone()) {
            self.waitlisted_event(role, subject);
        }
    }

    fn add_whitelist(&self, role: Role, subject: &ManagedAddress) {
        self.waitlist(role).swap_remove(subject);
        if self.whitelist(role).insert(subject.clone()) {
            self.whitelisted_event(role, subject);
        }
    }

    fn remove_whitelist(&self, role: Role, subject: &ManagedAddress) {
        self.whitelist(role).swap_remove(subject);
        if self.waitlist(role).insert(subject.clone()) {
            self.waitlisted_event(role, subject);
        }
    }

    fn tally_votes(&self, role: Role, subject: &ManagedAddress) -> VoteTally<Self::Api> {
        let votes = self.votes(role, subject);
        let owner = self.owner_address().get();

        let mut tally = VoteTally::new(votes.get(&owner));
        for payer in self.payers().iter() {
            let weight = self.contribution_value(&payer);
            tally.record(votes.get(&payer), &weight);
        }
        tally
    }

    /// Records `voter`'s latest opinion on `subject` and moves the subject
    /// between the lists if the policy's predicates now say so.
    fn cast_vote(
        &self,
        role: Role,
        voter: &ManagedAddress,
        subject: &ManagedAddress,
        approve: bool,
    ) -> Outcome {
        let policy = self.whitelist_policy(role).get();
        let is_owner = *voter == self.owner_address().get();
        let is_payer = self.payers().contains(voter);
        if !policy.tracks_state() || !policy.accepts_voter(is_owner, is_payer) {
            return Outcome::Unauthorized;
        }

        self.add_waitlist(role, subject);
        let mut votes = self.votes(role, subject);
        votes.insert(voter.clone(), approve);
        self.voted_event(role, voter, subject, approve);

        let tally = self.tally_votes(role, subject);
        if policy.admits(&tally) {
            if self.waitlist(role).contains(subject) {
                self.add_whitelist(role, subject);
            }
        } else if policy.removes(&tally) && self.whitelist(role).contains(subject) {
            self.remove_whitelist(role, subject);
        }

        Outcome::Done
    }

    // ── Storage ──

    #[storage_mapper("whitelistPolicy")]
    fn whitelist_policy(&self, role: Role) -> SingleValueMapper<WhitelistPolicy>;

    #[storage_mapper("whitelist")]
    fn whitelist(&self, role: Role) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("waitlist")]
    fn waitlist(&self, role: Role) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("votes")]
    fn votes(
        &self,
        role: Role,
        subject: &ManagedAddress,
    ) -> MapMapper<ManagedAddress, bool>;
}
