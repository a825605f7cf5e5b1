//! Native SOL wrap/unwrap adapter
//!
//! The escrow program trades SPL tokens only; native SOL takes part by being
//! deposited into a wrapped-SOL token account (transfer + sync_native) and
//! recovered by closing that account back to a system account.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};

use crate::error::SwapError;

/// True when the mint is the wrapped-SOL mint.
pub fn is_native_mint(mint: &Pubkey) -> bool {
    *mint == spl_token::native_mint::id()
}

/// Builds the instruction pair that wraps `lamports` into a wrapped-SOL
/// token account: a system transfer followed by sync_native, which updates
/// the recorded token amount to match the lamport balance.
///
/// Wrapping zero lamports is a no-op and returns an empty sequence.
///
/// # Arguments
///
/// * `payer` - System account the lamports come from
/// * `target` - Wrapped-SOL token account receiving the deposit
/// * `lamports` - Amount to wrap, in lamports
pub fn wrap_into(
    payer: &Pubkey,
    target: &Pubkey,
    lamports: u64,
) -> Result<Vec<Instruction>, SwapError> {
    if lamports == 0 {
        return Ok(Vec::new());
    }
    let transfer = system_instruction::transfer(payer, target, lamports);
    let sync = spl_token::instruction::sync_native(&spl_token::id(), target)
        .map_err(|e| SwapError::Encode(format!("sync_native: {e}")))?;
    Ok(vec![transfer, sync])
}

/// Builds the close instruction that unwraps a wrapped-SOL token account,
/// returning its full lamport balance (principal plus the rent-exempt
/// reserve) to `beneficiary` as native SOL.
///
/// # Arguments
///
/// * `account` - Wrapped-SOL token account to close
/// * `beneficiary` - System account receiving the lamports
/// * `owner` - The token account's owner, which must sign
pub fn unwrap_close(
    account: &Pubkey,
    beneficiary: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, SwapError> {
    spl_token::instruction::close_account(&spl_token::id(), account, beneficiary, owner, &[])
        .map_err(|e| SwapError::Encode(format!("close_account: {e}")))
}
