#![no_std]
use soroban_sdk::{
    contract, contractimpl, contracterror, symbol_short, token, Address, BytesN, Env, Vec,
};

mod nft;
mod storage_types;

use storage_types::{
    DataKey, MintConfig, MAX_PER_WALLET, MAX_ROYALTY_BPS, ROYALTY_DENOMINATOR, STAKING_CLOSED,
    STAKING_OPEN,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    MintNotStart = 5,
    MintFinished = 6,
    OverLimit = 7,
    TokenNotMinted = 8,
    TransferFromIncorrectOwner = 9,
    TokenNotStaked = 10,
    IndexOutOfBounds = 11,
    MathOverflow = 12,
}

#[contract]
pub struct MintPassContract;

#[contractimpl]
impl MintPassContract {
    /// Set up the pass collection. Can only be called once.
    ///
    /// # Arguments
    /// * `admin` - Address with exclusive rights over configuration, royalty,
    ///   funds, staking state, and upgrades
    /// * `treasury` - Destination for withdrawn funds and royalty beneficiary
    /// * `payment_token` - SAC address of the token mints are paid in
    pub fn initialize(
        e: Env,
        admin: Address,
        treasury: Address,
        payment_token: Address,
    ) -> Result<(), Error> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::Treasury, &treasury);
        e.storage()
            .instance()
            .set(&DataKey::PaymentToken, &payment_token);
        e.storage()
            .instance()
            .set(&DataKey::StakingState, &STAKING_CLOSED);
        Ok(())
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// Replace the sale window and unit price. Admin only.
    ///
    /// No range validation: the window may lie in the past, the future, or be
    /// empty. Mints simply fail with the corresponding window error.
    pub fn set_mint_config(
        e: Env,
        caller: Address,
        price: i128,
        start_time: u64,
        end_time: u64,
    ) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        let config = MintConfig {
            price,
            start_time,
            end_time,
        };
        e.storage().instance().set(&DataKey::MintConfig, &config);
        e.events().publish((symbol_short!("cfg"),), config);
        Ok(())
    }

    // ── Issuance ────────────────────────────────────────────────────────────

    /// Mint `quantity` sequentially numbered passes to `minter`, pulling
    /// `price * quantity` of the payment token into the contract.
    ///
    /// Fails with `MintNotStart` / `MintFinished` outside the sale window and
    /// `OverLimit` when the caller's lifetime mint count would exceed the
    /// per-wallet cap. Any failure leaves every counter untouched.
    pub fn mint(e: Env, minter: Address, quantity: u32) -> Result<(), Error> {
        minter.require_auth();

        let config = Self::config_or_default(&e);
        let now = e.ledger().timestamp();
        if now < config.start_time {
            return Err(Error::MintNotStart);
        }
        if now > config.end_time {
            return Err(Error::MintFinished);
        }
        if quantity == 0 {
            return Err(Error::InvalidInput);
        }

        let ledger_key = DataKey::MintedOf(minter.clone());
        let already: u32 = e.storage().persistent().get(&ledger_key).unwrap_or(0);
        let new_count = already.checked_add(quantity).ok_or(Error::OverLimit)?;
        if new_count > MAX_PER_WALLET {
            return Err(Error::OverLimit);
        }

        let total = config
            .price
            .checked_mul(quantity as i128)
            .ok_or(Error::MathOverflow)?;
        if total > 0 {
            let payment_token: Address = e
                .storage()
                .instance()
                .get(&DataKey::PaymentToken)
                .ok_or(Error::NotInitialized)?;
            token::Client::new(&e, &payment_token).transfer(
                &minter,
                &e.current_contract_address(),
                &total,
            );
        }

        let minted: u32 = e.storage().instance().get(&DataKey::Minted).unwrap_or(0);
        let new_minted = minted.checked_add(quantity).ok_or(Error::MathOverflow)?;
        for i in 0..quantity {
            nft::issue(&e, &minter, minted + 1 + i);
        }
        e.storage().instance().set(&DataKey::Minted, &new_minted);
        e.storage().persistent().set(&ledger_key, &new_count);

        e.events()
            .publish((symbol_short!("mint"), minter), (minted + 1, quantity));
        Ok(())
    }

    // ── Royalty & treasury ──────────────────────────────────────────────────

    /// Set the resale royalty rate in tenths of a percent. Admin only.
    pub fn set_royalty(e: Env, caller: Address, bps: u32) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        if bps > MAX_ROYALTY_BPS {
            return Err(Error::InvalidInput);
        }
        e.storage().instance().set(&DataKey::RoyaltyBps, &bps);
        e.events().publish((symbol_short!("royalty"),), bps);
        Ok(())
    }

    /// Royalty recipient and amount owed on a resale of `token_id` at
    /// `sale_price`. Floor division; fails for never-issued identifiers.
    pub fn royalty_info(e: Env, token_id: u32, sale_price: i128) -> Result<(Address, i128), Error> {
        let minted: u32 = e.storage().instance().get(&DataKey::Minted).unwrap_or(0);
        if token_id == 0 || token_id > minted {
            return Err(Error::TokenNotMinted);
        }
        let treasury: Address = e
            .storage()
            .instance()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)?;
        let bps: u32 = e.storage().instance().get(&DataKey::RoyaltyBps).unwrap_or(0);
        let amount = sale_price
            .checked_mul(bps as i128)
            .ok_or(Error::MathOverflow)?
            / ROYALTY_DENOMINATOR;
        Ok((treasury, amount))
    }

    /// Drain the contract's entire payment-token balance to the treasury.
    /// Admin only.
    pub fn withdraw(e: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        let treasury: Address = e
            .storage()
            .instance()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)?;
        let payment_token: Address = e
            .storage()
            .instance()
            .get(&DataKey::PaymentToken)
            .ok_or(Error::NotInitialized)?;

        let client = token::Client::new(&e, &payment_token);
        let amount = client.balance(&e.current_contract_address());
        if amount > 0 {
            client.transfer(&e.current_contract_address(), &treasury, &amount);
        }

        e.events().publish((symbol_short!("withdraw"), caller), amount);
        Ok(())
    }

    /// Point withdrawals and royalty payouts at a new address. Admin only;
    /// also reachable through the migration step of `upgrade`.
    pub fn set_treasury_address(e: Env, caller: Address, treasury: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        e.storage().instance().set(&DataKey::Treasury, &treasury);
        e.events().publish((symbol_short!("treasury"),), treasury);
        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Open or close the staking gate. Admin only. Any value is storable;
    /// only the open value accepts stakes.
    pub fn set_staking_state(e: Env, caller: Address, state: u32) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        e.storage().instance().set(&DataKey::StakingState, &state);
        e.events().publish((symbol_short!("stk_state"),), state);
        Ok(())
    }

    /// Move the caller's passes into contract custody, appending each id to
    /// the caller's staked sequence in call order.
    ///
    /// Each id must currently be owned by the caller; a failure on any id
    /// leaves the whole batch unapplied.
    pub fn stake(e: Env, staker: Address, token_ids: Vec<u32>) -> Result<(), Error> {
        staker.require_auth();

        let state: u32 = e
            .storage()
            .instance()
            .get(&DataKey::StakingState)
            .unwrap_or(STAKING_CLOSED);
        if state != STAKING_OPEN {
            return Err(Error::InvalidInput);
        }
        if token_ids.is_empty() {
            return Err(Error::InvalidInput);
        }

        let contract = e.current_contract_address();
        let key = DataKey::Staked(staker.clone());
        let mut record: Vec<u32> = e
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(&e));
        for token_id in token_ids.iter() {
            nft::transfer(&e, &staker, &staker, &contract, token_id)?;
            record.push_back(token_id);
        }
        e.storage().persistent().set(&key, &record);

        e.events().publish((symbol_short!("stake"), staker), token_ids);
        Ok(())
    }

    /// Return staked passes to the caller, removing each id from the caller's
    /// sequence while preserving the order of the remaining entries.
    ///
    /// Allowed regardless of the staking gate, so closing staking never traps
    /// custody. Only the depositor can unstake an id.
    pub fn unstake(e: Env, staker: Address, token_ids: Vec<u32>) -> Result<(), Error> {
        staker.require_auth();

        if token_ids.is_empty() {
            return Err(Error::InvalidInput);
        }

        let contract = e.current_contract_address();
        let key = DataKey::Staked(staker.clone());
        let mut record: Vec<u32> = e
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(&e));
        for token_id in token_ids.iter() {
            let index = record
                .first_index_of(token_id)
                .ok_or(Error::TokenNotStaked)?;
            record.remove(index);
            nft::transfer(&e, &contract, &contract, &staker, token_id)?;
        }
        e.storage().persistent().set(&key, &record);

        e.events().publish((symbol_short!("unstake"), staker), token_ids);
        Ok(())
    }

    /// Number of passes currently staked by `owner`.
    pub fn staked_num(e: Env, owner: Address) -> u32 {
        let record: Vec<u32> = e
            .storage()
            .persistent()
            .get(&DataKey::Staked(owner))
            .unwrap_or_else(|| Vec::new(&e));
        record.len()
    }

    /// Identifier at `index` in `owner`'s staked sequence.
    pub fn staked_address_info(e: Env, owner: Address, index: u32) -> Result<u32, Error> {
        let record: Vec<u32> = e
            .storage()
            .persistent()
            .get(&DataKey::Staked(owner))
            .unwrap_or_else(|| Vec::new(&e));
        record.get(index).ok_or(Error::IndexOutOfBounds)
    }

    // ── Upgrade ─────────────────────────────────────────────────────────────

    /// Swap the running contract code for `new_wasm_hash`, optionally
    /// re-pointing the treasury in the same invocation. Admin only.
    ///
    /// Storage survives the swap untouched; only the optional treasury step
    /// mutates it, under the same contract as `set_treasury_address`.
    pub fn upgrade(
        e: Env,
        caller: Address,
        new_wasm_hash: BytesN<32>,
        new_treasury: Option<Address>,
    ) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        e.deployer()
            .update_current_contract_wasm(new_wasm_hash.clone());
        if let Some(treasury) = new_treasury {
            e.storage().instance().set(&DataKey::Treasury, &treasury);
        }

        e.events()
            .publish((symbol_short!("upgrade"), caller), new_wasm_hash);
        Ok(())
    }

    /// Hand the administrator role to `new_admin`. Admin only.
    pub fn set_admin(e: Env, caller: Address, new_admin: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::require_admin(&e, &caller)?;

        e.storage().instance().set(&DataKey::Admin, &new_admin);
        e.events().publish((symbol_short!("admin"),), new_admin);
        Ok(())
    }

    // ── Pass ownership ──────────────────────────────────────────────────────

    /// Number of passes held by `owner` (staked passes count for the
    /// contract, not the depositor).
    pub fn balance(e: Env, owner: Address) -> u32 {
        nft::balance(&e, &owner)
    }

    /// Current owner of `token_id`.
    pub fn owner_of(e: Env, token_id: u32) -> Result<Address, Error> {
        nft::owner_of(&e, token_id).ok_or(Error::TokenNotMinted)
    }

    /// Give `approved` permission to move `token_id` on the owner's behalf.
    pub fn approve(
        e: Env,
        approver: Address,
        approved: Address,
        token_id: u32,
    ) -> Result<(), Error> {
        approver.require_auth();
        nft::approve(&e, &approver, &approved, token_id)
    }

    pub fn get_approved(e: Env, token_id: u32) -> Option<Address> {
        nft::get_approved(&e, token_id)
    }

    /// Transfer `token_id` from `from` to `to`. `from` must own it.
    pub fn transfer(e: Env, from: Address, to: Address, token_id: u32) -> Result<(), Error> {
        from.require_auth();
        nft::transfer(&e, &from, &from, &to, token_id)
    }

    /// Transfer `token_id` from `from` to `to` using `spender`'s approval.
    pub fn transfer_from(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
    ) -> Result<(), Error> {
        spender.require_auth();
        nft::transfer(&e, &spender, &from, &to, token_id)
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn get_admin(e: Env) -> Result<Address, Error> {
        e.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    pub fn treasury_address(e: Env) -> Result<Address, Error> {
        e.storage()
            .instance()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)
    }

    /// Total passes ever issued; equals the highest assigned identifier.
    pub fn minted(e: Env) -> u32 {
        e.storage().instance().get(&DataKey::Minted).unwrap_or(0)
    }

    /// Lifetime count of passes `owner` acquired through `mint`. Never
    /// decremented.
    pub fn minted_of(e: Env, owner: Address) -> u32 {
        e.storage()
            .persistent()
            .get(&DataKey::MintedOf(owner))
            .unwrap_or(0)
    }

    pub fn royalty(e: Env) -> u32 {
        e.storage().instance().get(&DataKey::RoyaltyBps).unwrap_or(0)
    }

    pub fn staking_state(e: Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::StakingState)
            .unwrap_or(STAKING_CLOSED)
    }

    pub fn mint_config(e: Env) -> MintConfig {
        Self::config_or_default(&e)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    /// Guard: reject any caller other than the stored administrator.
    fn require_admin(e: &Env, caller: &Address) -> Result<(), Error> {
        let admin: Address = e
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        if *caller != admin {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    /// An unset config behaves as all-zero, so mints before any
    /// configuration fail with `MintFinished`.
    fn config_or_default(e: &Env) -> MintConfig {
        e.storage()
            .instance()
            .get(&DataKey::MintConfig)
            .unwrap_or(MintConfig {
                price: 0,
                start_time: 0,
                end_time: 0,
            })
    }
}
