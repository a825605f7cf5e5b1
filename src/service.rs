//! Swap Service
//!
//! Client for the swap escrow program. Queries chain state over JSON-RPC,
//! assembles each lifecycle operation (Make, Take, Refund) as one atomic
//! instruction sequence, submits it, and reconciles raw escrow records into
//! a displayable offer list.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::SwapConfig;
use crate::error::{Phase, SwapError};
use crate::instructions::{
    build_make_plan, build_refund_plan, build_take_plan, validate_make, InstructionPlan,
    MakeAccounts, RefundAccounts, TakeAccounts,
};
use crate::pda::{create_associated_token_account_instruction, derive_associated_token_address};
use crate::state::{Escrow, Offer, VaultRead};
use crate::tokens::{ui_amount, TokenRegistry};
use crate::wrap::is_native_mint;

#[derive(Debug, Clone, Deserialize)]
struct ProgramAccountResult {
    pubkey: String,
    account: RpcAccount,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcAccount {
    data: (String, String),
}

/// Client service for the swap escrow program.
///
/// Holds the RPC connection and signer settings explicitly; every operation
/// works from these, never from ambient globals.
pub struct SwapService {
    client: Client,
    rpc_url: String,
    rpc_client: RpcClient,
    program_id: Pubkey,
    tokens: TokenRegistry,
    /// Env var name that stores the signer private key (base58).
    /// The key is decoded at submission time, never held in config.
    private_key_env: String,
}

impl SwapService {
    /// Creates a new swap service from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Swap client configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SwapService)` - Initialized service
    /// * `Err(SwapError)` - Invalid config values
    pub fn new(config: &SwapConfig) -> Result<Self, SwapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.service.request_timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| SwapError::Rpc(format!("failed to create HTTP client: {e}")))?;

        let rpc_client = RpcClient::new_with_commitment(
            config.cluster.rpc_url.clone(),
            CommitmentConfig::confirmed(),
        );

        Ok(Self {
            client,
            rpc_url: config.cluster.rpc_url.clone(),
            rpc_client,
            program_id: config.program_id()?,
            tokens: TokenRegistry::devnet()?,
            private_key_env: config.signer.private_key_env.clone(),
        })
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.tokens
    }

    // ========================================================================
    // JSON-RPC QUERIES
    // ========================================================================

    async fn rpc_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, SwapError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response: serde_json::Value = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SwapError::Rpc(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| SwapError::Rpc(format!("{method}: {e}")))?;

        if let Some(error) = response.get("error") {
            if !error.is_null() {
                return Err(SwapError::Rpc(format!("{method}: {error}")));
            }
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| SwapError::Rpc(format!("{method}: missing result")))
    }

    /// Fetches raw account data, with absence as a normal outcome.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError> {
        let result = self
            .rpc_request(
                "getAccountInfo",
                serde_json::json!([address.to_string(), { "encoding": "base64" }]),
            )
            .await?;

        let value = match result.get("value") {
            None => return Ok(None),
            Some(v) if v.is_null() => return Ok(None),
            Some(v) => v,
        };
        let encoded = value
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.as_str())
            .ok_or_else(|| SwapError::Rpc("getAccountInfo: malformed data field".to_string()))?;
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| SwapError::AccountData(format!("{address}: {e}")))?;
        Ok(Some(data))
    }

    /// Fetches every account owned by the escrow program.
    async fn get_program_accounts(&self) -> Result<Vec<(Pubkey, Vec<u8>)>, SwapError> {
        let result = self
            .rpc_request(
                "getProgramAccounts",
                serde_json::json!([self.program_id.to_string(), { "encoding": "base64" }]),
            )
            .await?;

        let entries = result
            .as_array()
            .ok_or_else(|| SwapError::Rpc("getProgramAccounts: invalid response".to_string()))?;

        let mut accounts = Vec::new();
        for entry in entries {
            let parsed: ProgramAccountResult = serde_json::from_value(entry.clone())
                .map_err(|e| SwapError::Rpc(format!("getProgramAccounts: {e}")))?;
            let pubkey = Pubkey::from_str(&parsed.pubkey)
                .map_err(|e| SwapError::Rpc(format!("getProgramAccounts: bad pubkey: {e}")))?;
            let data = STANDARD
                .decode(&parsed.account.data.0)
                .map_err(|e| SwapError::AccountData(format!("{pubkey}: {e}")))?;
            accounts.push((pubkey, data));
        }
        Ok(accounts)
    }

    // ========================================================================
    // PRECHECKS AND VAULT READS
    // ========================================================================

    /// Checks whether the associated token account for (mint, owner) exists,
    /// and returns the creation instruction to prepend when it does not.
    ///
    /// Absence is expected steady-state, never an error; only transport
    /// failures propagate.
    ///
    /// # Arguments
    ///
    /// * `mint` - SPL token mint
    /// * `owner` - Token account owner
    /// * `payer` - Fee payer for the creation instruction
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Account already exists
    /// * `Ok(Some(Instruction))` - Creation instruction to prepend
    pub async fn ensure_associated_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Option<Instruction>, SwapError> {
        let ata = derive_associated_token_address(owner, mint)?;
        if self.get_account_data(&ata).await?.is_some() {
            return Ok(None);
        }
        Ok(Some(create_associated_token_account_instruction(
            payer, owner, mint,
        )?))
    }

    /// Reads a vault's balance as a tagged outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(VaultRead::Missing)` - The account does not exist (offer already
    ///   settled or refunded)
    /// * `Ok(VaultRead::Found(amount))` - Live balance in base units
    /// * `Err(SwapError::AccountData)` - The account exists but is not a
    ///   token account
    pub async fn read_vault(&self, vault: &Pubkey) -> Result<VaultRead, SwapError> {
        match self.get_account_data(vault).await? {
            None => Ok(VaultRead::Missing),
            Some(data) => {
                let account = spl_token::state::Account::unpack(&data)
                    .map_err(|e| SwapError::AccountData(format!("vault {vault}: {e}")))?;
                Ok(VaultRead::Found(account.amount))
            }
        }
    }

    // ========================================================================
    // OFFER RECONCILER
    // ========================================================================

    /// Fetches every escrow record and joins each with its vault's live
    /// balance, producing the displayable offer list.
    ///
    /// Records whose vault is gone are excluded: the offer was settled or
    /// refunded between the record fetch and the balance read, which is an
    /// expected race, not a fault. A single offer's enrichment failure is
    /// logged and excluded without aborting the others. Results are ordered
    /// newest-first by seed.
    pub async fn list_offers(&self) -> Result<Vec<Offer>, SwapError> {
        let accounts = self.get_program_accounts().await?;

        let mut offers = Vec::new();
        for (address, data) in accounts {
            let record = match Escrow::try_parse(&data) {
                Ok(Some(record)) => record,
                // Some other account type owned by the program
                Ok(None) => continue,
                Err(e) => {
                    warn!("skipping malformed escrow record {}: {}", address, e);
                    continue;
                }
            };

            let vault = match derive_associated_token_address(&address, &record.mint_a) {
                Ok(vault) => vault,
                Err(e) => {
                    warn!("skipping offer {}: vault derivation failed: {}", address, e);
                    continue;
                }
            };
            let vault_raw = match self.read_vault(&vault).await {
                Ok(VaultRead::Found(amount)) => amount,
                Ok(VaultRead::Missing) => {
                    info!("vault for offer {} is gone, treating as settled", address);
                    continue;
                }
                Err(e) => {
                    warn!("skipping offer {}: vault read failed: {}", address, e);
                    continue;
                }
            };

            let decimals = self.tokens.decimals_for(&record.mint_a);
            offers.push(Offer {
                escrow: address,
                vault_raw,
                vault_amount: ui_amount(vault_raw, decimals),
                record,
            });
        }

        offers.sort_by(|a, b| b.record.seed.cmp(&a.record.seed));
        Ok(offers)
    }

    // ========================================================================
    // LIFECYCLE OPERATIONS
    // ========================================================================

    /// Creates a new offer: deposits `deposit` of `mint_a` into the vault
    /// and records that the maker wants `receive` of `mint_b`.
    ///
    /// Sequence: [create source ATA?, wrap?, make], one atomic transaction.
    ///
    /// # Arguments
    ///
    /// * `seed` - Maker-chosen 64-bit seed for the escrow PDA
    /// * `mint_a` - Mint deposited into the vault
    /// * `mint_b` - Mint the maker wants in return
    /// * `deposit` - Deposit amount in base units
    /// * `receive` - Asked amount in base units
    ///
    /// # Returns
    ///
    /// * `Ok((Pubkey, Signature))` - Escrow address and transaction signature
    /// * `Err(SwapError)` - Validation failure or rejected transaction
    pub async fn make_offer(
        &self,
        seed: u64,
        mint_a: &Pubkey,
        mint_b: &Pubkey,
        deposit: u64,
        receive: u64,
    ) -> Result<(Pubkey, Signature), SwapError> {
        validate_make(mint_a, mint_b, deposit, receive)?;

        let payer = self.load_keypair()?;
        let maker = payer.pubkey();
        let accounts = MakeAccounts::derive(&self.program_id, &maker, mint_a, mint_b, seed)?;

        let create_source = self
            .ensure_associated_token_account(mint_a, &maker, &maker)
            .await?;
        // A freshly created account can only fund the deposit when it is
        // wrapped SOL (the wrap step fills it in the same transaction).
        if create_source.is_some() && !is_native_mint(mint_a) {
            return Err(SwapError::MissingAccount(format!(
                "maker token account {} for the deposit mint does not exist",
                accounts.maker_ata_a
            )));
        }

        let plan = build_make_plan(&self.program_id, &accounts, seed, deposit, receive, create_source)?;

        info!(
            "making offer: escrow={}, seed={}, deposit={}, receive={}",
            accounts.escrow, seed, deposit, receive
        );
        let signature = self.submit(&plan, &payer).await?;
        Ok((accounts.escrow, signature))
    }

    /// Accepts an offer: pays `receive` of `mint_b` to the maker and drains
    /// the vault's `mint_a` to the taker, atomically.
    ///
    /// Sequence: [create pay-from ATA?, wrap?, take, unwrap closes?].
    ///
    /// # Arguments
    ///
    /// * `offer` - The offer, as returned by [`Self::list_offers`]
    ///
    /// # Returns
    ///
    /// * `Ok(Signature)` - Transaction signature
    /// * `Err(SwapError)` - Missing pay-from account or rejected transaction
    pub async fn take_offer(&self, offer: &Offer) -> Result<Signature, SwapError> {
        let payer = self.load_keypair()?;
        let taker = payer.pubkey();
        let accounts = TakeAccounts::derive(&taker, &offer.escrow, &offer.record)?;

        let create_pay = self
            .ensure_associated_token_account(&offer.record.mint_b, &taker, &taker)
            .await?;
        // The pay-from account must be funded before the core call; a fresh
        // empty account only works for wrapped SOL, where the wrap step funds
        // it in the same transaction.
        if create_pay.is_some() && !is_native_mint(&offer.record.mint_b) {
            return Err(SwapError::MissingAccount(format!(
                "taker token account {} for the pay-side mint does not exist",
                accounts.taker_ata_b
            )));
        }

        let plan = build_take_plan(&self.program_id, &accounts, offer.record.receive, create_pay)?;

        info!(
            "taking offer {}: paying {} of mint {}",
            offer.escrow, offer.record.receive, offer.record.mint_b
        );
        self.submit(&plan, &payer).await
    }

    /// Reclaims an offer's vault back to its maker and closes the record.
    ///
    /// Only the maker may refund; any other signer is rejected locally,
    /// before submission. Sequence: [create destination ATA?, refund,
    /// unwrap close?].
    ///
    /// # Arguments
    ///
    /// * `offer` - The offer to refund
    ///
    /// # Returns
    ///
    /// * `Ok(Signature)` - Transaction signature
    /// * `Err(SwapError::UnauthorizedRefund)` - Signer is not the maker
    pub async fn refund_offer(&self, offer: &Offer) -> Result<Signature, SwapError> {
        let payer = self.load_keypair()?;
        if payer.pubkey() != offer.record.maker {
            return Err(SwapError::UnauthorizedRefund);
        }

        let accounts = RefundAccounts::derive(&offer.escrow, &offer.record)?;
        let create_dest = self
            .ensure_associated_token_account(&offer.record.mint_a, &offer.record.maker, &offer.record.maker)
            .await?;

        let plan = build_refund_plan(&self.program_id, &accounts, create_dest)?;

        info!("refunding offer {}", offer.escrow);
        self.submit(&plan, &payer).await
    }

    // ========================================================================
    // SUBMISSION
    // ========================================================================

    /// Loads the signer keypair from the configured env var (base58 key).
    fn load_keypair(&self) -> Result<Keypair, SwapError> {
        let private_key_b58 = std::env::var(&self.private_key_env).map_err(|_| {
            SwapError::Signer(format!(
                "missing signer private key env var: {}",
                self.private_key_env
            ))
        })?;
        keypair_from_base58(&private_key_b58)
    }

    /// Submits a plan as one signed transaction and waits for confirmation.
    ///
    /// No automatic retry: a rejected transaction surfaces as
    /// [`SwapError::Rejected`] with the phase of the failing instruction,
    /// and resubmission is the caller's deliberate decision.
    async fn submit(
        &self,
        plan: &InstructionPlan,
        payer: &Keypair,
    ) -> Result<Signature, SwapError> {
        let blockhash = self
            .rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::Rpc(format!("failed to get latest blockhash: {e}")))?;

        let instructions = plan.instructions();
        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );

        self.rpc_client
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|err| {
                let reason = err.to_string();
                match err.get_transaction_error() {
                    Some(TransactionError::InstructionError(index, _)) => SwapError::Rejected {
                        phase: plan.phase_of(index as usize).unwrap_or(Phase::Submission),
                        reason,
                    },
                    Some(_) => SwapError::Rejected {
                        phase: Phase::Submission,
                        reason,
                    },
                    None => SwapError::Rpc(reason),
                }
            })
    }
}

/// Decodes a base58 private key string into a Keypair.
///
/// Solana private keys are 64 bytes (seed + public key) encoded as base58.
fn keypair_from_base58(b58: &str) -> Result<Keypair, SwapError> {
    let bytes = bs58::decode(b58)
        .into_vec()
        .map_err(|_| SwapError::Signer("invalid base58 private key".to_string()))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| SwapError::Signer(format!("invalid keypair bytes: {e}")))
}
