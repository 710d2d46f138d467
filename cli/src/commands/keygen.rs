//! Keypair generation

use clap::Args;

use tally_crypto::KeyPair;

/// Generate a keypair and print the public point
#[derive(Args)]
pub struct KeygenCommand {
    /// Print the canonical account-table key instead of pretty JSON
    #[arg(long)]
    key_string: bool,
}

impl KeygenCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let keypair = KeyPair::generate();

        if self.key_string {
            println!("{}", keypair.public_key().key_string());
        } else {
            println!("{}", serde_json::to_string_pretty(keypair.public_key())?);
        }

        Ok(())
    }
}
