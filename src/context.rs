use std::collections::HashMap;

use crate::{
    abi::variant_from_str,
    ABI, ABIError, ByteStream, Name,
};

type Result<T, E = ABIError> = core::result::Result<T, E>;

/// Memory-owning handle exposing the conversion API.
///
/// A context holds the ABIs loaded so far (keyed by contract name), the last
/// error message and the result buffers of the last conversion. Buffers are
/// reused across calls, so a returned slice or string is only valid until the
/// next call on the same context. A context requires exclusive access; use
/// one context per thread.
///
/// Every operation reports failure through a sentinel return value (`false`,
/// `None` or `0`) and records a message retrievable with
/// [`Self::last_error`]; the message stays put until the next call. This
/// mirrors a C-style boundary where errors cannot unwind through the caller.
#[derive(Default)]
pub struct Context {
    contracts: HashMap<Name, ABI>,
    last_error: String,
    result_bin: Vec<u8>,
    result_str: String,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the error recorded by the last failing operation, or an empty
    /// string if the last operation succeeded.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Size in bytes of the last binary conversion result.
    pub fn bin_size(&self) -> usize {
        self.result_bin.len()
    }

    /// The last binary conversion result.
    pub fn bin_data(&self) -> &[u8] {
        &self.result_bin
    }

    /// The last binary conversion result as an uppercase hex string.
    pub fn bin_hex(&mut self) -> &str {
        self.result_str = hex::encode_upper(&self.result_bin);
        &self.result_str
    }

    // -----------------------------------------------------------------------------
    //     Name conversions
    // -----------------------------------------------------------------------------

    /// Encode a name string into its `u64` form; returns 0 and records the
    /// error for strings with characters outside the name alphabet.
    pub fn string_to_name(&mut self, s: &str) -> u64 {
        self.record(Name::new(s).map_err(|e| ABIError::NameError { source: e }))
            .map(|n| n.as_u64())
            .unwrap_or(0)
    }

    /// Decode the `u64` form of a name into its string representation.
    pub fn name_to_string(&mut self, name: u64) -> &str {
        self.last_error.clear();
        self.result_str = Name::from_u64(name).to_string();
        &self.result_str
    }

    // -----------------------------------------------------------------------------
    //     ABI loading
    // -----------------------------------------------------------------------------

    /// Load a contract ABI from its JSON document form. Replaces any ABI
    /// previously loaded under the same name.
    pub fn load_abi_json(&mut self, contract: Name, abi: &str) -> bool {
        let result = ABI::from_str(abi);
        self.store_abi(contract, result)
    }

    /// Load a contract ABI from its binary form.
    pub fn load_abi_bin(&mut self, contract: Name, data: &[u8]) -> bool {
        let result = ABI::from_bin_abi(data);
        self.store_abi(contract, result)
    }

    /// Load a contract ABI from the hex representation of its binary form.
    pub fn load_abi_hex(&mut self, contract: Name, hex_repr: &str) -> bool {
        let result = ABI::from_hex_abi(hex_repr.trim());
        self.store_abi(contract, result)
    }

    fn store_abi(&mut self, contract: Name, abi: Result<ABI>) -> bool {
        match self.record(abi) {
            Some(abi) => {
                self.contracts.insert(contract, abi);
                true
            },
            None => false,
        }
    }

    // -----------------------------------------------------------------------------
    //     Schema queries
    // -----------------------------------------------------------------------------

    /// Return the name of the type describing the payload of the given action.
    pub fn type_for_action(&mut self, contract: Name, action: Name) -> Option<String> {
        let result = self.get_contract(contract).and_then(|abi| {
            abi.action_type(action)
                .map(|t| t.to_owned())
                .ok_or(ABIError::UnknownActionError { contract, action })
        });
        self.record(result)
    }

    /// Return the name of the type describing the rows of the given table.
    pub fn type_for_table(&mut self, contract: Name, table: Name) -> Option<String> {
        let result = self.get_contract(contract).and_then(|abi| {
            abi.table_type(table)
                .map(|t| t.to_owned())
                .ok_or(ABIError::UnknownTableError { contract, table })
        });
        self.record(result)
    }

    // -----------------------------------------------------------------------------
    //     Conversions
    // -----------------------------------------------------------------------------

    /// Convert a JSON document to binary under `(contract, type expression)`;
    /// struct fields must appear in their declared order. Retrieve the result
    /// with [`Self::bin_data`] / [`Self::bin_hex`].
    pub fn json_to_bin(&mut self, contract: Name, typename: &str, json: &str) -> bool {
        self.encode_to_result_buffer(contract, typename, json, false)
    }

    /// Same as [`Self::json_to_bin`] but accepting struct fields in any order.
    pub fn json_to_bin_reorderable(&mut self, contract: Name, typename: &str, json: &str) -> bool {
        self.encode_to_result_buffer(contract, typename, json, true)
    }

    fn encode_to_result_buffer(&mut self, contract: Name, typename: &str, json: &str,
                               reorderable: bool) -> bool {
        // encode into the retained buffer so its capacity is reused across
        // calls; on failure it may hold partial output and must not be read
        let mut ds = ByteStream::from(std::mem::take(&mut self.result_bin));
        ds.clear();

        let result = self.get_contract(contract).and_then(|abi| {
            let value = variant_from_str(json)?;
            match reorderable {
                false => abi.encode_variant(&mut ds, typename, &value),
                true => abi.encode_variant_reorderable(&mut ds, typename, &value),
            }
        });

        self.result_bin = ds.into_bytes();
        self.record(result).is_some()
    }

    /// Convert binary data to its JSON text form under `(contract, type
    /// expression)`. Trailing bytes after the value fail the conversion.
    pub fn bin_to_json(&mut self, contract: Name, typename: &str, data: &[u8]) -> Option<&str> {
        let result = self.get_contract(contract).and_then(|abi| {
            let value = abi.binary_to_variant(typename, data.to_vec())?;
            Ok(crate::json::to_string(&value)?)
        });
        match self.record(result) {
            Some(repr) => {
                self.result_str = repr;
                Some(&self.result_str)
            },
            None => None,
        }
    }

    /// Convert the hex form of binary data to its JSON text form.
    pub fn hex_to_json(&mut self, contract: Name, typename: &str, hex_repr: &str) -> Option<&str> {
        let data = match self.record(hex::decode(hex_repr.trim()).map_err(ABIError::from)) {
            Some(data) => data,
            None => return None,
        };
        self.bin_to_json(contract, typename, &data)
    }

    // -----------------------------------------------------------------------------
    //     Helpers
    // -----------------------------------------------------------------------------

    fn get_contract(&self, contract: Name) -> Result<&ABI> {
        self.contracts.get(&contract)
            .ok_or(ABIError::UnknownContractError { contract })
    }

    /// Convert a result into its sentinel form, recording the error message
    /// on failure and clearing it on success.
    fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error.clear();
                Some(value)
            },
            Err(e) => {
                self.last_error = render_error(&e);
                None
            },
        }
    }
}

/// Render an error with its full source chain, so that the recorded message
/// carries the same detail a `Debug` report would.
fn render_error(e: &ABIError) -> String {
    use std::error::Error;

    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}
