//! everlock-wallet
//!
//! CLI wallet for the Everlock portal. Manages a local keyfile, derives lock
//! addresses, and builds, signs, and submits lock/unlock transactions
//! through an indexer node.
//!
//! Usage:
//!   everlock-wallet keygen   [--keyfile <path>]
//!   everlock-wallet address  [--config <path>]
//!   everlock-wallet balance  [--rpc <url>]
//!   everlock-wallet lock permanent --policy <hex> --name <text> [--note <text>]
//!   everlock-wallet lock timed     --policy <hex> --name <text> --duration <secs>
//!   everlock-wallet lock password  --policy <hex> --name <text>
//!   everlock-wallet unlock timed    --policy <hex> --name <text>
//!   everlock-wallet unlock password --policy <hex> --name <text>
//!
//! Every submission passes an explicit confirmation prompt first; --yes
//! acknowledges it up front for scripted use.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;

use everlock_core::{Address, AssetId, AssetName, LockError, PolicyId, UnsignedTx};
use everlock_engine::{lock_asset, unlock_asset, LockIntent, Outcome, UnlockIntent};
use everlock_provider::{ConfirmationGate, IndexerClient, WalletSession};
use everlock_script::LockConfig;

mod session;
mod signer;

use session::SoftwareWallet;
use signer::WalletKeys;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "everlock-wallet",
    version,
    about = "Everlock wallet — place assets under lock policies and reclaim them"
)]
struct Cli {
    /// Path to the keyfile (JSON).
    #[arg(long, global = true, default_value = "~/.everlock/wallet.json")]
    keyfile: PathBuf,

    /// Path to the validator configuration (JSON).
    #[arg(long, global = true, default_value = "~/.everlock/validators.json")]
    config: PathBuf,

    /// Indexer RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8645")]
    rpc: String,

    /// Acknowledge the submission prompt up front.
    #[arg(long, global = true, default_value_t = false)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct AssetArgs {
    /// Minting policy id (hex).
    #[arg(long)]
    policy: String,

    /// Asset name as text, e.g. "05PROPHE7".
    #[arg(long, conflicts_with = "name_hex")]
    name: Option<String>,

    /// Asset name as raw hex, for names that are not text.
    #[arg(long)]
    name_hex: Option<String>,
}

impl AssetArgs {
    fn asset_id(&self) -> anyhow::Result<AssetId> {
        let policy_id = PolicyId::from_hex(&self.policy).context("parsing --policy")?;
        let name = match (&self.name, &self.name_hex) {
            (Some(text), None) => AssetName::from_text(text),
            (None, Some(h)) => AssetName::from_hex(h).context("parsing --name-hex")?,
            _ => bail!("provide exactly one of --name or --name-hex"),
        };
        Ok(AssetId::new(policy_id, name))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new wallet keyfile (payment + stake keys).
    Keygen,

    /// Print the wallet address and the derived contract addresses.
    Address,

    /// Print the wallet's coin balance and asset holdings.
    Balance,

    /// Place an asset under a lock policy.
    Lock {
        #[command(subcommand)]
        policy: LockCommand,
    },

    /// Reclaim an asset from a lock policy.
    Unlock {
        #[command(subcommand)]
        policy: UnlockCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LockCommand {
    /// Seal the asset forever; optionally leave a note in the datum.
    Permanent {
        #[command(flatten)]
        asset: AssetArgs,
        /// Optional note stored alongside the sealed asset.
        #[arg(long)]
        note: Option<String>,
        /// Lock on behalf of this owner address instead of the wallet's own.
        #[arg(long)]
        owner: Option<String>,
    },

    /// Lock until a duration from now has passed.
    Timed {
        #[command(flatten)]
        asset: AssetArgs,
        /// Lock duration in seconds from the current ledger time.
        #[arg(long)]
        duration: i64,
    },

    /// Lock behind a password (prompted, never passed on the command line).
    Password {
        #[command(flatten)]
        asset: AssetArgs,
    },
}

#[derive(Subcommand, Debug)]
enum UnlockCommand {
    /// Reclaim a time-locked asset once its deadline has passed.
    Timed {
        #[command(flatten)]
        asset: AssetArgs,
    },

    /// Reclaim a password-locked asset (password prompted).
    Password {
        #[command(flatten)]
        asset: AssetArgs,
    },
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn,everlock_engine=info,everlock_wallet=info")
        .init();

    let cli = Cli::parse();
    let keyfile = expand_tilde(&cli.keyfile);
    let config_path = expand_tilde(&cli.config);
    let indexer = IndexerClient::new(&cli.rpc);
    let gate = PromptGate { assume_yes: cli.yes };

    match cli.command {
        Command::Keygen => cmd_keygen(&keyfile),

        Command::Address => {
            let cfg = load_config(&config_path)?;
            let keys = load_keys(&keyfile)?;
            let address = keys.address(cfg.network);
            println!("Wallet address: {address}");
            for kind in [
                everlock_script::LockKind::Permanent,
                everlock_script::LockKind::Timed,
                everlock_script::LockKind::Password,
            ] {
                let contract = everlock_script::contract_address_for_owner(
                    cfg.validators.for_kind(kind),
                    &address,
                    cfg.network,
                )?;
                println!("{:<9} lock address: {contract}", kind.label());
            }
            Ok(())
        }

        Command::Balance => {
            let cfg = load_config(&config_path)?;
            let keys = load_keys(&keyfile)?;
            let wallet = SoftwareWallet::enable(keys, cfg.network, &indexer);
            let utxos = wallet.utxos().await?;
            let coin: u64 = utxos.iter().map(|u| u.value.coin).sum();
            println!("Address: {}", wallet.address());
            println!("Coin:    {coin}");
            for utxo in &utxos {
                for (asset, quantity) in &utxo.value.assets {
                    println!("Asset:   {} x{quantity}", asset.unit());
                }
            }
            Ok(())
        }

        Command::Lock { policy } => {
            let cfg = load_config(&config_path)?;
            let keys = load_keys(&keyfile)?;
            let wallet = SoftwareWallet::enable(keys, cfg.network, &indexer);

            let (asset, owner, intent) = match policy {
                LockCommand::Permanent { asset, note, owner } => {
                    let owner = match owner {
                        Some(text) => Address::from_bech32(&text)
                            .map_err(|e| anyhow::anyhow!("invalid --owner: {e}"))?,
                        None => wallet.address().clone(),
                    };
                    (
                        asset.asset_id()?,
                        owner,
                        LockIntent::Permanent {
                            note: note.map(|n| n.into_bytes()),
                        },
                    )
                }
                LockCommand::Timed { asset, duration } => (
                    asset.asset_id()?,
                    wallet.address().clone(),
                    LockIntent::Timed {
                        lock_duration: duration,
                    },
                ),
                LockCommand::Password { asset } => {
                    let password = prompt("Enter lock password: ")?;
                    if password.is_empty() {
                        bail!("empty password not allowed");
                    }
                    (
                        asset.asset_id()?,
                        wallet.address().clone(),
                        LockIntent::Password { password },
                    )
                }
            };

            info!(asset = %asset, "starting lock flow");
            let outcome =
                lock_asset(&cfg, &indexer, &wallet, &gate, &owner, &asset, intent).await;
            report(outcome)
        }

        Command::Unlock { policy } => {
            let cfg = load_config(&config_path)?;
            let keys = load_keys(&keyfile)?;
            let wallet = SoftwareWallet::enable(keys, cfg.network, &indexer);

            let (asset, intent) = match policy {
                UnlockCommand::Timed { asset } => (asset.asset_id()?, UnlockIntent::Timed),
                UnlockCommand::Password { asset } => {
                    let password = prompt("Enter unlock password: ")?;
                    (asset.asset_id()?, UnlockIntent::Password { password })
                }
            };

            info!(asset = %asset, "starting unlock flow");
            let owner = wallet.address().clone();
            let outcome =
                unlock_asset(&cfg, &indexer, &wallet, &gate, &owner, &asset, intent).await;
            report(outcome)
        }
    }
}

fn report(outcome: Result<Outcome, LockError>) -> anyhow::Result<()> {
    match outcome {
        Ok(Outcome::Submitted(tx_id)) => {
            println!("Submitted: {tx_id}");
            Ok(())
        }
        Ok(Outcome::Cancelled) => {
            println!("Cancelled");
            Ok(())
        }
        Err(e) => bail!("{}: {e}", e.class()),
    }
}

// ── Confirmation gate ─────────────────────────────────────────────────────────

/// Interactive gate: show the built transaction, ask before signing.
struct PromptGate {
    assume_yes: bool,
}

impl ConfirmationGate for PromptGate {
    async fn confirm(&self, tx: &UnsignedTx) -> bool {
        println!("Transaction {}", tx.tx_id());
        println!("  fee: {}", tx.fee);
        for output in &tx.outputs {
            let assets: u64 = output.value.assets.values().sum();
            println!(
                "  out: {} coin, {} asset(s) -> {}",
                output.value.coin, assets, output.address
            );
        }
        if let Some(not_before) = tx.validity.not_before {
            let when = chrono::DateTime::from_timestamp(not_before, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| not_before.to_string());
            println!("  valid from: {when}");
        }
        if self.assume_yes {
            return true;
        }
        matches!(
            prompt("Submit transaction? (y/n): ").as_deref(),
            Ok("y") | Ok("Y")
        )
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_keygen(keyfile: &PathBuf) -> anyhow::Result<()> {
    if keyfile.exists() {
        bail!(
            "Keyfile {} already exists. Delete it first to generate a new key.",
            keyfile.display()
        );
    }
    if let Some(parent) = keyfile.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let keys = WalletKeys::generate();
    let json = serde_json::to_string_pretty(&keys)?;
    std::fs::write(keyfile, &json)
        .with_context(|| format!("writing keyfile to {}", keyfile.display()))?;

    println!("Generated new wallet keys.");
    println!("Payment key hash: {}", keys.payment.key_hash);
    println!("Stake key hash:   {}", keys.stake.key_hash);
    println!("Keyfile:          {}", keyfile.display());
    println!("\nBACK UP YOUR KEYFILE. Loss = permanent loss of funds.");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_keys(keyfile: &PathBuf) -> anyhow::Result<WalletKeys> {
    let json = std::fs::read_to_string(keyfile)
        .with_context(|| format!("reading keyfile {}", keyfile.display()))?;
    let keys: WalletKeys = serde_json::from_str(&json)
        .context("parsing keyfile — is it a valid Everlock keyfile?")?;
    Ok(keys)
}

fn load_config(path: &PathBuf) -> anyhow::Result<LockConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading validator configuration {}", path.display()))?;
    let cfg: LockConfig = serde_json::from_str(&json)
        .context("parsing validator configuration")?;
    Ok(cfg)
}

fn prompt(text: &str) -> anyhow::Result<String> {
    print!("{text}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.clone()
}
