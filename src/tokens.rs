//! Token registry
//!
//! Static table of the tokens the client knows how to display, plus
//! decimal-string conversion into base units.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::error::SwapError;

// Devnet mint addresses. Mainnet deployments need their own table.
const USDC_MINT: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";
const USDT_MINT: &str = "9NGDi2tZtNmCCp8svb5pW32wRYN1PC9o4m4vW4rK7e1B";

/// Display metadata for a known token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub mint: Pubkey,
    pub icon: String,
    pub decimals: u8,
}

impl TokenInfo {
    /// True when this token is the wrapped form of native SOL.
    pub fn is_native_wrapped(&self) -> bool {
        self.mint == spl_token::native_mint::id()
    }
}

/// Lookup table over the known tokens.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
}

impl TokenRegistry {
    /// Builds the devnet registry (SOL, USDC, USDT).
    pub fn devnet() -> Result<Self, SwapError> {
        let tokens = vec![
            TokenInfo {
                name: "Solana".to_string(),
                symbol: "SOL".to_string(),
                mint: spl_token::native_mint::id(),
                icon: "sol.svg".to_string(),
                decimals: 9,
            },
            TokenInfo {
                name: "USD Coin".to_string(),
                symbol: "USDC".to_string(),
                mint: parse_mint(USDC_MINT)?,
                icon: "usdc.svg".to_string(),
                decimals: 6,
            },
            TokenInfo {
                name: "Tether".to_string(),
                symbol: "USDT".to_string(),
                mint: parse_mint(USDT_MINT)?,
                icon: "usdt.svg".to_string(),
                decimals: 6,
            },
        ];
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }

    pub fn by_mint(&self, mint: &Pubkey) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| t.mint == *mint)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Decimal count for a mint, falling back to 0 (raw integer display)
    /// for mints the registry does not know.
    pub fn decimals_for(&self, mint: &Pubkey) -> u8 {
        self.by_mint(mint).map(|t| t.decimals).unwrap_or(0)
    }
}

fn parse_mint(value: &str) -> Result<Pubkey, SwapError> {
    Pubkey::from_str(value).map_err(|_| SwapError::Config(format!("invalid mint address: {value}")))
}

/// Converts a decimal string like "1.5" into base units for a mint with the
/// given decimal count. Digits past the mint's precision are truncated.
///
/// # Arguments
///
/// * `value` - Decimal amount as typed by the user
/// * `decimals` - The mint's decimal count
///
/// # Returns
///
/// * `Ok(u64)` - Amount in base units
/// * `Err(SwapError::InvalidAmount)` - Not a decimal number, or out of range
pub fn parse_amount(value: &str, decimals: u8) -> Result<u64, SwapError> {
    let trimmed = value.trim();
    let (ints, frac_raw) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if ints.is_empty() && frac_raw.is_empty() {
        return Err(SwapError::InvalidAmount(value.to_string()));
    }
    if !ints.chars().all(|c| c.is_ascii_digit()) || !frac_raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(SwapError::InvalidAmount(value.to_string()));
    }

    // Pad the fractional part out to the mint's precision, then truncate.
    let mut frac = frac_raw.to_string();
    while frac.len() < decimals as usize {
        frac.push('0');
    }
    frac.truncate(decimals as usize);

    let base = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| SwapError::InvalidAmount(format!("unsupported decimals: {decimals}")))?;
    let int_part: u64 = if ints.is_empty() {
        0
    } else {
        ints.parse()
            .map_err(|_| SwapError::InvalidAmount(value.to_string()))?
    };
    let frac_part: u64 = if frac.is_empty() {
        0
    } else {
        frac.parse()
            .map_err(|_| SwapError::InvalidAmount(value.to_string()))?
    };

    int_part
        .checked_mul(base)
        .and_then(|v| v.checked_add(frac_part))
        .ok_or_else(|| SwapError::InvalidAmount(format!("amount out of range: {value}")))
}

/// Converts base units into a display amount using the given decimal count.
pub fn ui_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}
