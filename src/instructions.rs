//! Escrow program instruction composition
//!
//! Builds the make/take/refund calls against the escrow program's ABI:
//! an 8-byte sighash discriminator followed by Borsh-encoded arguments, over
//! an order-sensitive account list. Account lists are modeled as one struct
//! per instruction so every role is named and derived in one place.
//!
//! Each lifecycle operation is assembled as an [`InstructionPlan`]: an
//! ordered, phase-tagged sequence of pre-instructions (account creation,
//! native wrap), the core program call, and post-instructions (unwrap
//! closes). The builders are pure; all chain queries happen in the service
//! before a plan is built.

use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::error::{Phase, SwapError};
use crate::pda::{associated_token_program_id, derive_associated_token_address, derive_escrow_address};
use crate::state::Escrow;
use crate::wrap::{is_native_mint, unwrap_close, wrap_into};

// ============================================================================
// INSTRUCTION DATA ENCODING
// ============================================================================

/// Computes the 8-byte instruction discriminator: sha256("global:<name>")[..8].
pub fn sighash(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{name}").as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

// ============================================================================
// TYPED ACCOUNT LISTS
// ============================================================================

/// Accounts for the `make` instruction, in the program's ABI order.
#[derive(Debug, Clone)]
pub struct MakeAccounts {
    /// Offer creator; signs and pays for the escrow and vault creation
    pub maker: Pubkey,
    /// Mint deposited into the vault
    pub mint_a: Pubkey,
    /// Mint the maker wants in return
    pub mint_b: Pubkey,
    /// Maker's source token account for mint_a; must exist before the core
    /// call (the client prepends creation when it is absent)
    pub maker_ata_a: Pubkey,
    /// Escrow record PDA; created by the program
    pub escrow: Pubkey,
    /// Vault ATA of (mint_a, escrow); created by the program
    pub vault: Pubkey,
}

impl MakeAccounts {
    /// Derives every account from the maker, mints and seed.
    pub fn derive(
        program_id: &Pubkey,
        maker: &Pubkey,
        mint_a: &Pubkey,
        mint_b: &Pubkey,
        seed: u64,
    ) -> Result<Self, SwapError> {
        let (escrow, _bump) = derive_escrow_address(program_id, maker, seed);
        Ok(Self {
            maker: *maker,
            mint_a: *mint_a,
            mint_b: *mint_b,
            maker_ata_a: derive_associated_token_address(maker, mint_a)?,
            escrow,
            vault: derive_associated_token_address(&escrow, mint_a)?,
        })
    }

    fn to_metas(&self) -> Result<Vec<AccountMeta>, SwapError> {
        Ok(vec![
            AccountMeta::new(self.maker, true),
            AccountMeta::new_readonly(self.mint_a, false),
            AccountMeta::new_readonly(self.mint_b, false),
            AccountMeta::new(self.maker_ata_a, false),
            AccountMeta::new(self.escrow, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(associated_token_program_id()?, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ])
    }
}

/// Accounts for the `take` instruction, in the program's ABI order.
#[derive(Debug, Clone)]
pub struct TakeAccounts {
    /// Offer acceptor; signs and pays for any accounts the program creates
    pub taker: Pubkey,
    /// Offer creator; receives mint_b and the reclaimed rent
    pub maker: Pubkey,
    /// Mint held in the vault (taker receives this)
    pub mint_a: Pubkey,
    /// Mint the taker pays with
    pub mint_b: Pubkey,
    /// Taker's destination for mint_a; the program creates it if needed
    pub taker_ata_a: Pubkey,
    /// Taker's source for mint_b; must exist and be funded before the call
    pub taker_ata_b: Pubkey,
    /// Maker's destination for mint_b; the program creates it if needed
    pub maker_ata_b: Pubkey,
    /// Escrow record PDA; closed on success
    pub escrow: Pubkey,
    /// Vault ATA of (mint_a, escrow); emptied and closed on success
    pub vault: Pubkey,
}

impl TakeAccounts {
    /// Derives every account from the taker and the offer's record. The
    /// escrow address is the offer's own address; only the vault and the
    /// associated token accounts are re-derived.
    pub fn derive(taker: &Pubkey, escrow: &Pubkey, record: &Escrow) -> Result<Self, SwapError> {
        Ok(Self {
            taker: *taker,
            maker: record.maker,
            mint_a: record.mint_a,
            mint_b: record.mint_b,
            taker_ata_a: derive_associated_token_address(taker, &record.mint_a)?,
            taker_ata_b: derive_associated_token_address(taker, &record.mint_b)?,
            maker_ata_b: derive_associated_token_address(&record.maker, &record.mint_b)?,
            escrow: *escrow,
            vault: derive_associated_token_address(escrow, &record.mint_a)?,
        })
    }

    fn to_metas(&self) -> Result<Vec<AccountMeta>, SwapError> {
        Ok(vec![
            AccountMeta::new(self.taker, true),
            AccountMeta::new(self.maker, false),
            AccountMeta::new_readonly(self.mint_a, false),
            AccountMeta::new_readonly(self.mint_b, false),
            AccountMeta::new(self.taker_ata_a, false),
            AccountMeta::new(self.taker_ata_b, false),
            AccountMeta::new(self.maker_ata_b, false),
            AccountMeta::new(self.escrow, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(associated_token_program_id()?, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ])
    }
}

/// Accounts for the `refund` instruction, in the program's ABI order.
#[derive(Debug, Clone)]
pub struct RefundAccounts {
    /// Offer creator; the only signer the program accepts
    pub maker: Pubkey,
    /// Mint held in the vault
    pub mint_a: Pubkey,
    /// Maker's destination for mint_a; must exist before the call
    pub maker_ata_a: Pubkey,
    /// Escrow record PDA; closed on success
    pub escrow: Pubkey,
    /// Vault ATA of (mint_a, escrow); emptied and closed on success
    pub vault: Pubkey,
}

impl RefundAccounts {
    /// Derives every account from the offer's record.
    pub fn derive(escrow: &Pubkey, record: &Escrow) -> Result<Self, SwapError> {
        Ok(Self {
            maker: record.maker,
            mint_a: record.mint_a,
            maker_ata_a: derive_associated_token_address(&record.maker, &record.mint_a)?,
            escrow: *escrow,
            vault: derive_associated_token_address(escrow, &record.mint_a)?,
        })
    }

    fn to_metas(&self) -> Result<Vec<AccountMeta>, SwapError> {
        Ok(vec![
            AccountMeta::new(self.maker, true),
            AccountMeta::new_readonly(self.mint_a, false),
            AccountMeta::new(self.maker_ata_a, false),
            AccountMeta::new(self.escrow, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(associated_token_program_id()?, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ])
    }
}

// ============================================================================
// CORE INSTRUCTIONS
// ============================================================================

/// Builds the `make(seed, deposit, receive)` program call.
pub fn make_instruction(
    program_id: &Pubkey,
    accounts: &MakeAccounts,
    seed: u64,
    deposit: u64,
    receive: u64,
) -> Result<Instruction, SwapError> {
    let mut data = sighash("make").to_vec();
    data.extend_from_slice(&seed.to_le_bytes());
    data.extend_from_slice(&deposit.to_le_bytes());
    data.extend_from_slice(&receive.to_le_bytes());
    Ok(Instruction {
        program_id: *program_id,
        accounts: accounts.to_metas()?,
        data,
    })
}

/// Builds the `take()` program call.
pub fn take_instruction(
    program_id: &Pubkey,
    accounts: &TakeAccounts,
) -> Result<Instruction, SwapError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: accounts.to_metas()?,
        data: sighash("take").to_vec(),
    })
}

/// Builds the `refund()` program call.
pub fn refund_instruction(
    program_id: &Pubkey,
    accounts: &RefundAccounts,
) -> Result<Instruction, SwapError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: accounts.to_metas()?,
        data: sighash("refund").to_vec(),
    })
}

// ============================================================================
// INSTRUCTION PLANS
// ============================================================================

/// An ordered, phase-tagged instruction sequence for one atomic transaction.
///
/// The phase tags let a rejected transaction's failing instruction index be
/// mapped back to the step that contributed it.
#[derive(Debug, Clone, Default)]
pub struct InstructionPlan {
    steps: Vec<(Phase, Instruction)>,
}

impl InstructionPlan {
    pub fn push(&mut self, phase: Phase, instruction: Instruction) {
        self.steps.push((phase, instruction));
    }

    pub fn extend(&mut self, phase: Phase, instructions: Vec<Instruction>) {
        for instruction in instructions {
            self.steps.push((phase, instruction));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// The instruction sequence in submission order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.steps.iter().map(|(_, ix)| ix.clone()).collect()
    }

    /// Phase tags in submission order.
    pub fn phases(&self) -> Vec<Phase> {
        self.steps.iter().map(|(phase, _)| *phase).collect()
    }

    /// Maps a failing instruction index back to its phase.
    pub fn phase_of(&self, index: usize) -> Option<Phase> {
        self.steps.get(index).map(|(phase, _)| *phase)
    }
}

/// Rejects offer parameters that can never produce a valid transaction:
/// self-swaps and zero amounts. Called before any network traffic.
pub fn validate_make(
    mint_a: &Pubkey,
    mint_b: &Pubkey,
    deposit: u64,
    receive: u64,
) -> Result<(), SwapError> {
    if mint_a == mint_b {
        return Err(SwapError::SameMint);
    }
    if deposit == 0 || receive == 0 {
        return Err(SwapError::ZeroAmount);
    }
    Ok(())
}

/// Assembles the Make transaction: [create source ATA?, wrap?, make].
///
/// # Arguments
///
/// * `create_source_ata` - Creation instruction from the prechecker when the
///   maker's source account is absent
pub fn build_make_plan(
    program_id: &Pubkey,
    accounts: &MakeAccounts,
    seed: u64,
    deposit: u64,
    receive: u64,
    create_source_ata: Option<Instruction>,
) -> Result<InstructionPlan, SwapError> {
    let mut plan = InstructionPlan::default();
    if let Some(ix) = create_source_ata {
        plan.push(Phase::Precheck, ix);
    }
    if is_native_mint(&accounts.mint_a) {
        plan.extend(Phase::Wrap, wrap_into(&accounts.maker, &accounts.maker_ata_a, deposit)?);
    }
    plan.push(
        Phase::Core,
        make_instruction(program_id, accounts, seed, deposit, receive)?,
    );
    Ok(plan)
}

/// Assembles the Take transaction:
/// [create pay-from ATA?, wrap?, take, unwrap closes?].
///
/// When the taker pays in wrapped SOL, exactly `receive` lamports are wrapped
/// into the pay-from account and that account is closed after settlement to
/// reclaim the rent reserve. When the taker receives wrapped SOL, the
/// destination account is closed after settlement to unwrap it.
pub fn build_take_plan(
    program_id: &Pubkey,
    accounts: &TakeAccounts,
    receive: u64,
    create_pay_ata: Option<Instruction>,
) -> Result<InstructionPlan, SwapError> {
    let mut plan = InstructionPlan::default();
    if let Some(ix) = create_pay_ata {
        plan.push(Phase::Precheck, ix);
    }
    if is_native_mint(&accounts.mint_b) {
        plan.extend(Phase::Wrap, wrap_into(&accounts.taker, &accounts.taker_ata_b, receive)?);
    }
    plan.push(Phase::Core, take_instruction(program_id, accounts)?);
    if is_native_mint(&accounts.mint_b) {
        plan.push(
            Phase::Cleanup,
            unwrap_close(&accounts.taker_ata_b, &accounts.taker, &accounts.taker)?,
        );
    }
    if is_native_mint(&accounts.mint_a) {
        plan.push(
            Phase::Cleanup,
            unwrap_close(&accounts.taker_ata_a, &accounts.taker, &accounts.taker)?,
        );
    }
    Ok(plan)
}

/// Assembles the Refund transaction: [create destination ATA?, refund,
/// unwrap close?].
pub fn build_refund_plan(
    program_id: &Pubkey,
    accounts: &RefundAccounts,
    create_dest_ata: Option<Instruction>,
) -> Result<InstructionPlan, SwapError> {
    let mut plan = InstructionPlan::default();
    if let Some(ix) = create_dest_ata {
        plan.push(Phase::Precheck, ix);
    }
    plan.push(Phase::Core, refund_instruction(program_id, accounts)?);
    if is_native_mint(&accounts.mint_a) {
        plan.push(
            Phase::Cleanup,
            unwrap_close(&accounts.maker_ata_a, &accounts.maker, &accounts.maker)?,
        );
    }
    Ok(plan)
}
