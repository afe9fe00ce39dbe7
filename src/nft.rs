//! Ownership bookkeeping for the pass collection: owner map, per-holder
//! balances, and single-slot transfer approvals.
//!
//! Only one account can be approved per token at a time, and any transfer
//! clears the token's approval slot.

use soroban_sdk::{symbol_short, Address, Env};

use crate::storage_types::DataKey;
use crate::Error;

pub fn owner_of(e: &Env, token_id: u32) -> Option<Address> {
    e.storage().persistent().get(&DataKey::Owner(token_id))
}

pub fn balance(e: &Env, owner: &Address) -> u32 {
    e.storage()
        .persistent()
        .get(&DataKey::Balance(owner.clone()))
        .unwrap_or(0)
}

pub fn get_approved(e: &Env, token_id: u32) -> Option<Address> {
    e.storage().persistent().get(&DataKey::Approved(token_id))
}

/// Record a freshly issued token. The caller guarantees `token_id` is unused.
pub fn issue(e: &Env, to: &Address, token_id: u32) {
    e.storage().persistent().set(&DataKey::Owner(token_id), to);
    let bal = balance(e, to);
    e.storage()
        .persistent()
        .set(&DataKey::Balance(to.clone()), &(bal + 1));
}

/// Give `approved` permission to move `token_id`. `approver` must own it.
pub fn approve(
    e: &Env,
    approver: &Address,
    approved: &Address,
    token_id: u32,
) -> Result<(), Error> {
    let owner = owner_of(e, token_id).ok_or(Error::TokenNotMinted)?;
    if owner != *approver {
        return Err(Error::Unauthorized);
    }
    e.storage()
        .persistent()
        .set(&DataKey::Approved(token_id), approved);
    e.events().publish(
        (symbol_short!("approve"), approver.clone(), approved.clone()),
        token_id,
    );
    Ok(())
}

/// Move `token_id` from `from` to `to` on behalf of `spender`.
///
/// `from` must be the current owner; `spender` must be `from` itself or hold
/// the token's approval slot. The approval is consumed by the move.
pub fn transfer(
    e: &Env,
    spender: &Address,
    from: &Address,
    to: &Address,
    token_id: u32,
) -> Result<(), Error> {
    let owner = owner_of(e, token_id).ok_or(Error::TokenNotMinted)?;
    if owner != *from {
        return Err(Error::TransferFromIncorrectOwner);
    }
    if spender != from && get_approved(e, token_id).as_ref() != Some(spender) {
        return Err(Error::Unauthorized);
    }
    e.storage().persistent().remove(&DataKey::Approved(token_id));
    e.storage().persistent().set(&DataKey::Owner(token_id), to);

    let from_bal = balance(e, from);
    e.storage()
        .persistent()
        .set(&DataKey::Balance(from.clone()), &from_bal.saturating_sub(1));
    let to_bal = balance(e, to);
    e.storage()
        .persistent()
        .set(&DataKey::Balance(to.clone()), &(to_bal + 1));

    e.events().publish(
        (symbol_short!("transfer"), from.clone(), to.clone()),
        token_id,
    );
    Ok(())
}
