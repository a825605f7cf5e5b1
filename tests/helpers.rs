//! Shared test helpers for swap client tests
//!
//! Dummy constants, record builders, and JSON-RPC response builders used by
//! the integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_option::COption;
use spl_token::state::{Account as TokenAccount, AccountState};
use swap_client::config::{ClusterConfig, ServiceConfig, SignerConfig, SwapConfig};
use swap_client::state::Escrow;

/// Dummy escrow program id (valid base58 pubkey string)
pub const DUMMY_PROGRAM_ID: &str = "H959Jtz2FKx71J2oFfJb1R7uGyuXBpgHZpp9cimtqX2c";

/// Env var name placeholder for tests that never load the signer
pub const UNUSED_KEY_ENV: &str = "SWAP_TEST_UNUSED_KEY";

/// Builds a minimal valid config pointing at the given RPC endpoint.
pub fn test_config(rpc_url: &str, private_key_env: &str) -> SwapConfig {
    SwapConfig {
        cluster: ClusterConfig {
            name: "test".to_string(),
            rpc_url: rpc_url.to_string(),
            program_id: DUMMY_PROGRAM_ID.to_string(),
        },
        signer: SignerConfig {
            private_key_env: private_key_env.to_string(),
        },
        service: ServiceConfig::default(),
    }
}

/// Builds an escrow record with the given terms.
pub fn escrow_record(
    seed: u64,
    maker: Pubkey,
    mint_a: Pubkey,
    mint_b: Pubkey,
    receive: u64,
) -> Escrow {
    Escrow {
        seed,
        maker,
        mint_a,
        mint_b,
        receive,
        bump: 254,
    }
}

/// Serializes an escrow record to base64 account data.
pub fn escrow_base64(record: &Escrow) -> String {
    STANDARD.encode(record.to_bytes().expect("serialize escrow"))
}

/// Packs an SPL token account with the given balance to base64 account data.
pub fn token_account_base64(mint: Pubkey, owner: Pubkey, amount: u64) -> String {
    let account = TokenAccount {
        mint,
        owner,
        amount,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(account, &mut data).expect("pack token account");
    STANDARD.encode(data)
}

/// JSON-RPC request body for getAccountInfo, matching the client exactly.
pub fn account_info_request(address: &Pubkey) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getAccountInfo",
        "params": [address.to_string(), { "encoding": "base64" }]
    })
}

/// JSON-RPC request body for getProgramAccounts, matching the client exactly.
pub fn program_accounts_request(program_id: &Pubkey) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getProgramAccounts",
        "params": [program_id.to_string(), { "encoding": "base64" }]
    })
}

/// JSON-RPC response for getAccountInfo with account data present.
pub fn account_info_response(data_base64: &str) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "context": { "slot": 1 },
            "value": {
                "data": [data_base64, "base64"],
                "executable": false,
                "lamports": 2_039_280u64,
                "owner": spl_token::id().to_string(),
                "rentEpoch": 0
            }
        }
    })
}

/// JSON-RPC response for getAccountInfo when the account does not exist.
pub fn missing_account_response() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "context": { "slot": 1 },
            "value": null
        }
    })
}

/// JSON-RPC response for getProgramAccounts.
pub fn program_accounts_response(entries: &[(Pubkey, String)]) -> serde_json::Value {
    let accounts: Vec<serde_json::Value> = entries
        .iter()
        .map(|(pubkey, data)| {
            json!({
                "pubkey": pubkey.to_string(),
                "account": {
                    "data": [data, "base64"],
                    "executable": false,
                    "lamports": 1_000_000u64,
                    "owner": DUMMY_PROGRAM_ID,
                    "rentEpoch": 0
                }
            })
        })
        .collect();
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": accounts
    })
}
