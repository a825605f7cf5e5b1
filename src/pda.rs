//! Deterministic address derivation
//!
//! Pure helpers for the program-derived addresses the escrow program
//! validates against: the escrow record PDA and associated token accounts.
//! These must match the on-chain derivation bit-for-bit; a single mismatched
//! byte produces a different address and the transaction is rejected.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use std::str::FromStr;

use crate::error::SwapError;

/// Domain-separation prefix for escrow record PDAs.
pub const ESCROW_SEED: &[u8] = b"escrow";

// Well-known program ID from Solana mainnet/devnet docs.
const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Derives the escrow record PDA for a maker and seed.
///
/// Formula: `find_program_address(["escrow", maker, le64(seed)], program_id)`.
///
/// # Arguments
///
/// * `program_id` - The escrow program
/// * `maker` - Offer creator
/// * `seed` - Maker-chosen 64-bit seed
///
/// # Returns
///
/// * `(Pubkey, u8)` - Escrow address and canonical bump
pub fn derive_escrow_address(program_id: &Pubkey, maker: &Pubkey, seed: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[ESCROW_SEED, maker.as_ref(), &seed.to_le_bytes()],
        program_id,
    )
}

/// Derives the associated token account (ATA) for an owner and mint.
///
/// Valid for off-curve owners such as the escrow PDA, which is how the vault
/// address is derived: ATA(mint_a, escrow).
///
/// # Arguments
///
/// * `owner` - Token account owner
/// * `mint` - SPL token mint
///
/// # Returns
///
/// * `Ok(Pubkey)` - Derived ATA address
/// * `Err(SwapError)` - Invalid associated token program id
pub fn derive_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, SwapError> {
    let program_id = associated_token_program_id()?;
    Ok(Pubkey::find_program_address(
        &[owner.as_ref(), spl_token::id().as_ref(), mint.as_ref()],
        &program_id,
    )
    .0)
}

/// Builds a CreateAssociatedTokenAccount instruction.
///
/// # Arguments
///
/// * `payer` - Fee payer
/// * `owner` - Token account owner
/// * `mint` - SPL token mint
///
/// # Returns
///
/// * `Ok(Instruction)` - ATA creation instruction
/// * `Err(SwapError)` - Invalid associated token program id
pub fn create_associated_token_account_instruction(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, SwapError> {
    let program_id = associated_token_program_id()?;
    let ata = derive_associated_token_address(owner, mint)?;

    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data: vec![],
    })
}

/// Returns the associated token program id as a Pubkey.
pub fn associated_token_program_id() -> Result<Pubkey, SwapError> {
    Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID)
        .map_err(|_| SwapError::Config("invalid associated token program id".to_string()))
}
