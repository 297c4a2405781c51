multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Constants
// ============================================================

/// A token quoted at `PRICE_ONE` is worth exactly one unit of account.
pub const PRICE_ONE: u64 = 1_000_000_000_000_000_000;

pub const ERR_NEGATIVE_BALANCE: &str = "ERR_NEGATIVE_BALANCE";
pub const ERR_INVALID_FACTOR: &str = "ERR_INVALID_FACTOR";
pub const ERR_UNPRICED_TOKEN: &str = "ERR_UNPRICED_TOKEN";

// ============================================================
// Ledger errors
// ============================================================

/// Arithmetic violations on a ledger. The ledger that produced the error is
/// left untouched; callers decide whether to abort the transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LedgerError {
    /// Some token would end up below zero.
    NegativeBalance,
    /// Scaling by a zero divisor.
    InvalidFactor,
    /// The price oracle has no quote for a token being converted.
    UnpricedToken,
}

impl LedgerError {
    pub fn message(&self) -> &'static str {
        match self {
            LedgerError::NegativeBalance => ERR_NEGATIVE_BALANCE,
            LedgerError::InvalidFactor => ERR_INVALID_FACTOR,
            LedgerError::UnpricedToken => ERR_UNPRICED_TOKEN,
        }
    }
}

// ============================================================
// Price oracle
// ============================================================

#[type_abi]
#[derive(ManagedVecItem, TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct PriceQuote<M: ManagedTypeApi> {
    pub token: TokenIdentifier<M>,
    /// Value of one token unit in unit of account, scaled by `PRICE_ONE`.
    pub price: BigUint<M>,
}

/// Immutable price table. Assembled once at deploy and handed to every
/// conversion explicitly; nothing mutates it afterwards.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct PriceOracle<M: ManagedTypeApi> {
    pub unit: TokenIdentifier<M>,
    pub quotes: ManagedVec<M, PriceQuote<M>>,
}

impl<M: ManagedTypeApi> PriceOracle<M> {
    /// Oracle that only knows the unit of account, quoted at `PRICE_ONE`.
    pub fn new(unit: TokenIdentifier<M>) -> Self {
        let mut quotes = ManagedVec::new();
        quotes.push(PriceQuote {
            token: unit.clone(),
            price: BigUint::from(PRICE_ONE),
        });
        PriceOracle { unit, quotes }
    }

    /// Returns a copy of the oracle with `token` quoted at `price`,
    /// replacing any previous quote for it.
    pub fn with_quote(&self, token: TokenIdentifier<M>, price: BigUint<M>) -> Self {
        let mut quotes = ManagedVec::new();
        for quote in self.quotes.iter() {
            if quote.token != token {
                quotes.push(PriceQuote {
                    token: quote.token.clone(),
                    price: quote.price.clone(),
                });
            }
        }
        quotes.push(PriceQuote { token, price });
        PriceOracle {
            unit: self.unit.clone(),
            quotes,
        }
    }

    pub fn price_of(&self, token: &TokenIdentifier<M>) -> Result<BigUint<M>, LedgerError> {
        for quote in self.quotes.iter() {
            if quote.token == *token {
                return Ok(quote.price.clone());
            }
        }
        Err(LedgerError::UnpricedToken)
    }

    pub fn is_priced(&self, token: &TokenIdentifier<M>) -> bool {
        self.price_of(token).is_ok()
    }

    /// `amount * price[from] / price[to]`
    pub fn convert(
        &self,
        from: &TokenIdentifier<M>,
        to: &TokenIdentifier<M>,
        amount: &BigUint<M>,
    ) -> Result<BigUint<M>, LedgerError> {
        let from_price = self.price_of(from)?;
        let to_price = self.price_of(to)?;
        if to_price == 0u64 {
            return Err(LedgerError::InvalidFactor);
        }
        Ok(amount * &from_price / &to_price)
    }

    pub fn to_unit(
        &self,
        from: &TokenIdentifier<M>,
        amount: &BigUint<M>,
    ) -> Result<BigUint<M>, LedgerError> {
        self.convert(from, &self.unit, amount)
    }
}

// ============================================================
// Funds ledger
// ============================================================

/// Multi-token balance. Amounts are unsigned, zero entries are never
/// stored, and every operation returns a new ledger so a failed step leaves
/// the receiver intact.
///
/// The `all_*` comparisons only look at the tokens held by the right-hand
/// side: `a.all_lt(b)` holds when every token of `b` is strictly larger than
/// what `a` holds of it, whatever else `a` carries. `PartialEq` is the
/// symmetric version (`a.all_eq(b) && b.all_eq(a)`).
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct FundsLedger<M: ManagedTypeApi> {
    pub entries: ManagedVec<M, EsdtTokenPayment<M>>,
}

impl<M: ManagedTypeApi> Default for FundsLedger<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ManagedTypeApi> PartialEq for FundsLedger<M> {
    fn eq(&self, other: &Self) -> bool {
        self.all_eq(other) && other.all_eq(self)
    }
}

impl<M: ManagedTypeApi> FundsLedger<M> {
    pub fn new() -> Self {
        FundsLedger {
            entries: ManagedVec::new(),
        }
    }

    pub fn single(token: TokenIdentifier<M>, amount: BigUint<M>) -> Self {
        Self::new().with_amount(&token, amount)
    }

    /// Merges a list of transfers; repeated tokens are summed.
    pub fn from_payments(payments: &ManagedVec<M, EsdtTokenPayment<M>>) -> Self {
        let mut ledger = Self::new();
        for payment in payments.iter() {
            let held = ledger.amount_of(&payment.token_identifier);
            ledger = ledger.with_amount(&payment.token_identifier, held + &payment.amount);
        }
        ledger
    }

    pub fn entries(&self) -> &ManagedVec<M, EsdtTokenPayment<M>> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.amount == 0u64)
    }

    pub fn amount_of(&self, token: &TokenIdentifier<M>) -> BigUint<M> {
        for entry in self.entries.iter() {
            if entry.token_identifier == *token {
                return entry.amount.clone();
            }
        }
        BigUint::zero()
    }

    /// Copy of the ledger with `token` set to `amount`.
    pub fn with_amount(&self, token: &TokenIdentifier<M>, amount: BigUint<M>) -> Self {
        let mut entries = ManagedVec::new();
        for entry in self.entries.iter() {
            if entry.token_identifier == *token {
                continue;
            }
            entries.push(EsdtTokenPayment::new(
                entry.token_identifier.clone(),
                0,
                entry.amount.clone(),
            ));
        }
        if amount > 0u64 {
            entries.push(EsdtTokenPayment::new(token.clone(), 0, amount));
        }
        FundsLedger { entries }
    }

    pub fn plus(&self, other: &Self) -> Self {
        let mut sum = self.clone();
        for entry in other.entries.iter() {
            let held = sum.amount_of(&entry.token_identifier);
            sum = sum.with_amount(&entry.token_identifier, held + &entry.amount);
        }
        sum
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, LedgerError> {
        if !self.all_ge(other) {
            return Err(LedgerError::NegativeBalance);
        }

        let mut rest = self.clone();
        for entry in other.entries.iter() {
            let held = rest.amount_of(&entry.token_identifier);
            rest = rest.with_amount(&entry.token_identifier, held - &entry.amount);
        }
        Ok(rest)
    }

    pub fn mul_scalar(&self, factor: &BigUint<M>) -> Self {
        let mut product = Self::new();
        for entry in self.entries.iter() {
            product = product.with_amount(&entry.token_identifier, &entry.amount * factor);
        }
        product
    }

    pub fn div_scalar(&self, divisor: &BigUint<M>) -> Result<Self, LedgerError> {
        if *divisor == 0u64 {
            return Err(LedgerError::InvalidFactor);
        }

        let mut quotient = Self::new();
        for entry in self.entries.iter() {
            quotient = quotient.with_amount(&entry.token_identifier, &entry.amount / divisor);
        }
        Ok(quotient)
    }

    /// Token-wise `amount * numerator / denominator`, rounded down.
    pub fn scale(
        &self,
        numerator: &BigUint<M>,
        denominator: &BigUint<M>,
    ) -> Result<Self, LedgerError> {
        if *denominator == 0u64 {
            return Err(LedgerError::InvalidFactor);
        }

        let mut scaled = Self::new();
        for entry in self.entries.iter() {
            let amount = &entry.amount * numerator / denominator;
            scaled = scaled.with_amount(&entry.token_identifier, amount);
        }
        Ok(scaled)
    }

    /// Token-wise minimum of `self` and `cap`, over the tokens of `self`.
    pub fn capped_by(&self, cap: &Self) -> Self {
        let mut capped = Self::new();
        for entry in self.entries.iter() {
            let limit = cap.amount_of(&entry.token_identifier);
            let amount = if entry.amount < limit {
                entry.amount.clone()
            } else {
                limit
            };
            capped = capped.with_amount(&entry.token_identifier, amount);
        }
        capped
    }

    /// Value of the whole ledger in the oracle's unit of account.
    pub fn total(&self, oracle: &PriceOracle<M>) -> Result<BigUint<M>, LedgerError> {
        let mut total = BigUint::zero();
        for entry in self.entries.iter() {
            total += oracle.to_unit(&entry.token_identifier, &entry.amount)?;
        }
        Ok(total)
    }

    pub fn all_lt(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) < entry.amount)
    }

    pub fn all_le(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) <= entry.amount)
    }

    /// Ledger equality over `other`'s tokens only; tokens held just by `self`
    /// are ignored. `==` on `FundsLedger` is the stricter symmetric closure.
    pub fn all_eq(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) == entry.amount)
    }

    pub fn all_ne(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) != entry.amount)
    }

    pub fn all_ge(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) >= entry.amount)
    }

    pub fn all_gt(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|entry| self.amount_of(&entry.token_identifier) > entry.amount)
    }
}
