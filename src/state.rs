//! On-chain account state and offer projections

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::SwapError;

/// Escrow record, one per open offer. The record's own address (a PDA of the
/// maker and seed) is the owning authority of the vault token account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Escrow {
    /// Maker-chosen value combined with the maker address to derive the PDA
    pub seed: u64,
    /// Offer creator; sole authority for refund
    pub maker: Pubkey,
    /// Mint deposited into the vault
    pub mint_a: Pubkey,
    /// Mint the maker wants in return
    pub mint_b: Pubkey,
    /// Exact base-unit amount of mint_b the taker must pay
    pub receive: u64,
    /// Canonical PDA bump, stored so later derivations skip the search
    pub bump: u8,
}

impl Escrow {
    /// Account discriminator: sha256("account:Escrow")[..8]
    pub const DISCRIMINATOR: [u8; 8] = [31, 213, 123, 187, 186, 22, 218, 155];

    /// Serialized length: discriminator + seed + 3 pubkeys + receive + bump
    pub const LEN: usize = 8 + 8 + 32 + 32 + 32 + 8 + 1;

    /// Parses an escrow record from raw account data.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Escrow))` - Data carries the escrow discriminator and parses
    /// * `Ok(None)` - Some other account type owned by the program
    /// * `Err(SwapError::AccountData)` - Discriminator matches but the body is malformed
    pub fn try_parse(data: &[u8]) -> Result<Option<Self>, SwapError> {
        if data.len() < 8 || data[..8] != Self::DISCRIMINATOR {
            return Ok(None);
        }
        Escrow::try_from_slice(&data[8..])
            .map(Some)
            .map_err(|e| SwapError::AccountData(format!("escrow record: {e}")))
    }

    /// Serializes the record with its discriminator, the on-chain layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SwapError> {
        let mut out = Self::DISCRIMINATOR.to_vec();
        let body = self
            .try_to_vec()
            .map_err(|e| SwapError::Encode(format!("escrow record: {e}")))?;
        out.extend_from_slice(&body);
        Ok(out)
    }
}

/// Outcome of a vault balance read.
///
/// A missing vault is expected steady-state for an offer settled or refunded
/// between the record fetch and the balance read; malformed data is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultRead {
    /// The vault token account no longer exists
    Missing,
    /// Live balance in base units
    Found(u64),
}

/// A displayable offer: the escrow record joined with its vault's live
/// balance. Rebuilt on every fetch; never a source of truth.
#[derive(Debug, Clone)]
pub struct Offer {
    /// Address of the escrow record (the PDA itself)
    pub escrow: Pubkey,
    /// The on-chain record
    pub record: Escrow,
    /// Vault balance in base units
    pub vault_raw: u64,
    /// Vault balance in display units (registry decimals, fallback 0)
    pub vault_amount: f64,
}
