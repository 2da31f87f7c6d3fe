use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ensure, OptionExt, Snafu};

use crate::{impl_auto_error_conversion, Name, Symbol, InvalidSymbol};


#[derive(Debug, Snafu)]
pub enum InvalidAsset {
    #[snafu(display(r#"asset amount and symbol should be separated with space: "{repr}""#))]
    MissingSpace { repr: String },

    #[snafu(display("missing decimal fraction after decimal point"))]
    MissingDecimal,

    #[snafu(display("could not parse amount for asset"))]
    ParseAmountError { source: ParseIntError },

    #[snafu(display("amount overflow for: {repr}"))]
    AmountOverflow { repr: String },

    #[snafu(display("amount out of range, max is 2^62-1"))]
    AmountOutOfRange,

    #[snafu(display("could not parse symbol from asset string"))]
    SymbolError { source: InvalidSymbol },
}

impl_auto_error_conversion!(ParseIntError, InvalidAsset, ParseAmountSnafu);
impl_auto_error_conversion!(InvalidSymbol, InvalidAsset, SymbolSnafu);


/// A quantity of a token: a signed amount at the precision of its [`Symbol`].
///
/// The string form is `"<amount> <symbol name>"` where the number of decimal
/// digits of the amount is the symbol precision, e.g. `"1.2345 SYS"`.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    const MAX_AMOUNT: i64 = (1 << 62) - 1;

    pub fn new(amount: i64, symbol: Symbol) -> Result<Asset, InvalidAsset> {
        let result = Asset { amount, symbol };
        result.check_valid()?;
        Ok(result)
    }

    fn is_amount_within_range(&self) -> bool {
        -Self::MAX_AMOUNT <= self.amount && self.amount <= Self::MAX_AMOUNT
    }

    fn check_valid(&self) -> Result<(), InvalidAsset> {
        // no need to check for symbol validity, it has been successfully constructed
        ensure!(self.is_amount_within_range(), AmountOutOfRangeSnafu);
        Ok(())
    }

    pub fn amount(&self) -> i64 { self.amount }
    pub fn symbol(&self) -> Symbol { self.symbol }
    pub fn symbol_name(&self) -> String { self.symbol.name() }
    pub fn decimals(&self) -> u8 { self.symbol.decimals() }
    pub fn precision(&self) -> i64 { self.symbol.precision() }

    pub fn from_str(s: &str) -> Result<Self, InvalidAsset> {
        let s = s.trim();

        // find space in order to split amount and symbol
        let space_pos = s.find(' ').context(MissingSpaceSnafu { repr: s })?;

        let amount_str = &s[..space_pos];
        let symbol_str = s[space_pos + 1..].trim();

        // the number of digits after the decimal point gives the precision
        let dot_pos = amount_str.find('.');
        let precision = match dot_pos {
            Some(pos) => {
                // if a decimal point is used, a decimal fraction has to follow it
                ensure!(pos != amount_str.len() - 1, MissingDecimalSnafu);
                amount_str.len() - pos - 1
            },
            None => 0,
        };

        let symbol = Symbol::new(&format!("{},{}", precision, symbol_str))?;

        let amount: i64 = match dot_pos {
            None => amount_str.parse()?,
            Some(dot_pos) => {
                let int_part: i64 = amount_str[..dot_pos].parse()?;
                let mut frac_part: i64 = amount_str[dot_pos + 1..].parse()?;
                if amount_str.starts_with('-') { frac_part = -frac_part; }
                int_part
                    .checked_mul(symbol.precision()).context(AmountOverflowSnafu { repr: amount_str })?
                    .checked_add(frac_part).context(AmountOverflowSnafu { repr: amount_str })?
            },
        };

        Asset::new(amount, symbol)
    }
}


/// An [`Asset`] paired with the contract managing the token.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ExtendedAsset {
    pub quantity: Asset,
    pub contract: Name,
}


// -----------------------------------------------------------------------------
//     `Display` implementation
// -----------------------------------------------------------------------------

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs_amount = self.amount.unsigned_abs();
        let precision = self.precision() as u64;
        let int_part = abs_amount / precision;
        if self.decimals() != 0 {
            let frac_part = abs_amount % precision;
            write!(f, "{}{}.{:0width$} {}", sign, int_part, frac_part,
                   self.symbol_name(), width = self.decimals() as usize)
        }
        else {
            write!(f, "{}{} {}", sign, int_part, self.symbol_name())
        }
    }
}


// -----------------------------------------------------------------------------
//     `FromStr` implementation
// -----------------------------------------------------------------------------

impl FromStr for Asset {
    type Err = InvalidAsset;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Asset::from_str(s)
    }
}


// -----------------------------------------------------------------------------
//     `Serde` traits implementation
// -----------------------------------------------------------------------------

impl Serialize for Asset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D>(deserializer: D) -> Result<Asset, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr: &str = <&str>::deserialize(deserializer)?;
        Asset::from_str(repr).map_err(|e| de::Error::custom(e.to_string()))
    }
}


// =============================================================================
//
//     Unittests
//
// =============================================================================
