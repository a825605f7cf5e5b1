//! Unit tests for instruction composition
//!
//! Covers the typed account derivations and the pre/core/post sequencing of
//! each lifecycle operation, including the native wrap/unwrap steps.

use solana_sdk::{pubkey::Pubkey, system_program};
use swap_client::instructions::{
    build_make_plan, build_refund_plan, build_take_plan, make_instruction, refund_instruction,
    sighash, take_instruction, MakeAccounts, RefundAccounts, TakeAccounts,
};
use swap_client::pda::{
    associated_token_program_id, create_associated_token_account_instruction,
    derive_associated_token_address, derive_escrow_address,
};
use swap_client::Phase;

mod helpers;
use helpers::escrow_record;

fn native_mint() -> Pubkey {
    spl_token::native_mint::id()
}

/// Test that MakeAccounts derives the escrow PDA and vault consistently
/// Why: Every account must match the program's own derivation bit-for-bit
#[test]
fn test_make_accounts_derivation() {
    let program_id = Pubkey::new_unique();
    let maker = Pubkey::new_unique();
    let mint_a = Pubkey::new_unique();
    let mint_b = Pubkey::new_unique();

    let accounts =
        MakeAccounts::derive(&program_id, &maker, &mint_a, &mint_b, 42).expect("derive");

    let (escrow, _) = derive_escrow_address(&program_id, &maker, 42);
    assert_eq!(accounts.escrow, escrow);
    assert_eq!(
        accounts.vault,
        derive_associated_token_address(&escrow, &mint_a).expect("vault")
    );
    assert_eq!(
        accounts.maker_ata_a,
        derive_associated_token_address(&maker, &mint_a).expect("ata")
    );
}

/// Test that TakeAccounts re-derives only the vault and ATAs
/// Why: The escrow address comes from the offer itself, not a re-derivation
#[test]
fn test_take_accounts_derivation() {
    let taker = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        7,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        500,
    );

    let accounts = TakeAccounts::derive(&taker, &escrow, &record).expect("derive");
    assert_eq!(accounts.escrow, escrow);
    assert_eq!(accounts.maker, record.maker);
    assert_eq!(
        accounts.vault,
        derive_associated_token_address(&escrow, &record.mint_a).expect("vault")
    );
    assert_eq!(
        accounts.maker_ata_b,
        derive_associated_token_address(&record.maker, &record.mint_b).expect("ata")
    );
}

/// Test the make account list against the program's ABI order
/// Why: Account lists are order-sensitive; a swap breaks validation
#[test]
fn test_make_instruction_abi_order() {
    let program_id = Pubkey::new_unique();
    let maker = Pubkey::new_unique();
    let accounts = MakeAccounts::derive(
        &program_id,
        &maker,
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        1,
    )
    .expect("derive");
    let ix = make_instruction(&program_id, &accounts, 1, 10, 20).expect("instruction");

    let expected = [
        accounts.maker,
        accounts.mint_a,
        accounts.mint_b,
        accounts.maker_ata_a,
        accounts.escrow,
        accounts.vault,
        associated_token_program_id().expect("atp"),
        system_program::id(),
        spl_token::id(),
    ];
    let actual: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
    assert_eq!(actual, expected);
    assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
    assert!(!ix.accounts[1].is_writable);
    assert!(ix.accounts[4].is_writable && !ix.accounts[4].is_signer);
}

/// Test the take account list against the program's ABI order
#[test]
fn test_take_instruction_abi_order() {
    let program_id = Pubkey::new_unique();
    let taker = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        3,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        500,
    );
    let accounts = TakeAccounts::derive(&taker, &escrow, &record).expect("derive");
    let ix = take_instruction(&program_id, &accounts).expect("instruction");

    let expected = [
        accounts.taker,
        accounts.maker,
        accounts.mint_a,
        accounts.mint_b,
        accounts.taker_ata_a,
        accounts.taker_ata_b,
        accounts.maker_ata_b,
        accounts.escrow,
        accounts.vault,
        associated_token_program_id().expect("atp"),
        system_program::id(),
        spl_token::id(),
    ];
    let actual: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
    assert_eq!(actual, expected);
    assert!(ix.accounts[0].is_signer);
    assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
    assert_eq!(ix.data, sighash("take").to_vec());
}

/// Test the refund account list and bare-discriminator data
#[test]
fn test_refund_instruction_abi_order() {
    let program_id = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        9,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        500,
    );
    let accounts = RefundAccounts::derive(&escrow, &record).expect("derive");
    let ix = refund_instruction(&program_id, &accounts).expect("instruction");

    assert_eq!(ix.accounts.len(), 8);
    assert_eq!(ix.accounts[0].pubkey, record.maker);
    assert!(ix.accounts[0].is_signer);
    assert_eq!(ix.accounts[3].pubkey, escrow);
    assert_eq!(ix.data, sighash("refund").to_vec());
}

/// Test that a plain make is just the core call
/// Why: No wrap and no creation step may appear when none is needed
#[test]
fn test_make_plan_plain() {
    let program_id = Pubkey::new_unique();
    let accounts = MakeAccounts::derive(
        &program_id,
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        1,
    )
    .expect("derive");

    let plan = build_make_plan(&program_id, &accounts, 1, 10, 20, None).expect("plan");
    assert_eq!(plan.phases(), vec![Phase::Core]);
    assert_eq!(plan.instructions()[0].program_id, program_id);
}

/// Test the full make sequence for a wrapped-SOL deposit with a fresh ATA
/// Why: Creation must precede the wrap, and the wrap must precede the core call
#[test]
fn test_make_plan_native_with_create() {
    let program_id = Pubkey::new_unique();
    let maker = Pubkey::new_unique();
    let accounts = MakeAccounts::derive(
        &program_id,
        &maker,
        &native_mint(),
        &Pubkey::new_unique(),
        1,
    )
    .expect("derive");
    let create = create_associated_token_account_instruction(&maker, &maker, &native_mint())
        .expect("create ata");

    let plan = build_make_plan(&program_id, &accounts, 1, 1_000_000, 20, Some(create))
        .expect("plan");
    assert_eq!(
        plan.phases(),
        vec![Phase::Precheck, Phase::Wrap, Phase::Wrap, Phase::Core]
    );

    let ixs = plan.instructions();
    assert_eq!(ixs[0].program_id, associated_token_program_id().expect("atp"));
    assert_eq!(ixs[1].program_id, system_program::id());
    assert_eq!(ixs[2].program_id, spl_token::id());
    assert_eq!(ixs[3].program_id, program_id);
}

/// Test that paying in wrapped SOL wraps exactly the asked amount and closes
/// the temporary pay-in account after settlement
#[test]
fn test_take_plan_native_pay() {
    let program_id = Pubkey::new_unique();
    let taker = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        5,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        native_mint(),
        750_000,
    );
    let accounts = TakeAccounts::derive(&taker, &escrow, &record).expect("derive");
    let create = create_associated_token_account_instruction(&taker, &taker, &native_mint())
        .expect("create ata");

    let plan =
        build_take_plan(&program_id, &accounts, record.receive, Some(create)).expect("plan");
    assert_eq!(
        plan.phases(),
        vec![
            Phase::Precheck,
            Phase::Wrap,
            Phase::Wrap,
            Phase::Core,
            Phase::Cleanup
        ]
    );

    let ixs = plan.instructions();
    // The wrap transfer moves exactly the asked amount into the pay-in ATA.
    assert_eq!(ixs[1].program_id, system_program::id());
    assert_eq!(ixs[1].accounts[1].pubkey, accounts.taker_ata_b);
    // Cleanup closes the temporary pay-in account back to the taker.
    let close = &ixs[4];
    assert_eq!(close.program_id, spl_token::id());
    assert_eq!(close.accounts[0].pubkey, accounts.taker_ata_b);
    assert_eq!(close.accounts[1].pubkey, taker);
}

/// Test that receiving wrapped SOL schedules an unwrap of the destination
#[test]
fn test_take_plan_native_receive() {
    let program_id = Pubkey::new_unique();
    let taker = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        5,
        Pubkey::new_unique(),
        native_mint(),
        Pubkey::new_unique(),
        750_000,
    );
    let accounts = TakeAccounts::derive(&taker, &escrow, &record).expect("derive");

    let plan = build_take_plan(&program_id, &accounts, record.receive, None).expect("plan");
    assert_eq!(plan.phases(), vec![Phase::Core, Phase::Cleanup]);

    let ixs = plan.instructions();
    assert_eq!(ixs[1].accounts[0].pubkey, accounts.taker_ata_a);
    assert_eq!(ixs[1].accounts[1].pubkey, taker);
}

/// Test that a plain take is just the core call
#[test]
fn test_take_plan_plain() {
    let program_id = Pubkey::new_unique();
    let record = escrow_record(
        5,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        750_000,
    );
    let accounts =
        TakeAccounts::derive(&Pubkey::new_unique(), &Pubkey::new_unique(), &record)
            .expect("derive");
    let plan = build_take_plan(&program_id, &accounts, record.receive, None).expect("plan");
    assert_eq!(plan.phases(), vec![Phase::Core]);
}

/// Test that refunding a wrapped-SOL deposit unwraps the destination account
#[test]
fn test_refund_plan_native() {
    let program_id = Pubkey::new_unique();
    let escrow = Pubkey::new_unique();
    let record = escrow_record(
        11,
        Pubkey::new_unique(),
        native_mint(),
        Pubkey::new_unique(),
        123,
    );
    let accounts = RefundAccounts::derive(&escrow, &record).expect("derive");
    let create = create_associated_token_account_instruction(
        &record.maker,
        &record.maker,
        &native_mint(),
    )
    .expect("create ata");

    let plan = build_refund_plan(&program_id, &accounts, Some(create)).expect("plan");
    assert_eq!(
        plan.phases(),
        vec![Phase::Precheck, Phase::Core, Phase::Cleanup]
    );

    let ixs = plan.instructions();
    assert_eq!(ixs[2].accounts[0].pubkey, accounts.maker_ata_a);
    assert_eq!(ixs[2].accounts[1].pubkey, record.maker);
}

/// Test that a plain refund is just the core call
#[test]
fn test_refund_plan_plain() {
    let program_id = Pubkey::new_unique();
    let record = escrow_record(
        11,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        123,
    );
    let accounts = RefundAccounts::derive(&Pubkey::new_unique(), &record).expect("derive");
    let plan = build_refund_plan(&program_id, &accounts, None).expect("plan");
    assert_eq!(plan.phases(), vec![Phase::Core]);
}

/// Test that plan indexes map back to phases for failure attribution
/// Why: A rejected transaction reports only the failing instruction index
#[test]
fn test_plan_phase_mapping() {
    let program_id = Pubkey::new_unique();
    let maker = Pubkey::new_unique();
    let accounts = MakeAccounts::derive(
        &program_id,
        &maker,
        &native_mint(),
        &Pubkey::new_unique(),
        1,
    )
    .expect("derive");
    let plan =
        build_make_plan(&program_id, &accounts, 1, 1_000_000, 20, None).expect("plan");

    assert_eq!(plan.phase_of(0), Some(Phase::Wrap));
    assert_eq!(plan.phase_of(2), Some(Phase::Core));
    assert_eq!(plan.phase_of(99), None);
}
