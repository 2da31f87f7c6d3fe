use std::fs;

use clap::Parser;
use color_eyre::Result;

use abiconv::ABI;

/// Decode hex binary data to its JSON form under a given ABI type.
#[derive(Parser)]
struct Opts {
    /// Path of a file containing the ABI (JSON format)
    #[arg(short, long)]
    abi: String,

    /// Name of the type to decode under
    #[arg(short, long)]
    typename: String,

    /// The hex data to decode
    #[arg(short = 'x', long)]
    hex: String,
}


pub fn main() -> Result<()> {
    let opts = Opts::parse();

    // read ABI from file
    let abi_str = fs::read_to_string(&opts.abi)
        .unwrap_or_else(|_| panic!("{}", &format!("File {} does not exist", opts.abi)));
    let abi = ABI::from_str(&abi_str)?;

    // perform the hex->json conversion
    let bin = hex::decode(opts.hex.trim())?;
    let value = abi.binary_to_variant(&opts.typename, bin)?;

    println!("{}", abiconv::json::to_string(&value)?);

    Ok(())
}
