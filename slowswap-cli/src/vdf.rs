// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use clap::{Args, Parser, ValueEnum};
use num_bigint::BigUint;
use slowswap_vdf::config::VdfConfig;
use slowswap_vdf::error::{VdfError, VdfResult};
use slowswap_vdf::math::word::to_word;
use slowswap_vdf::pipeline::VdfRequest;
use slowswap_vdf::proof::VdfProof;
use slowswap_vdf::rsa_group::modulus::RSAModulus;
use slowswap_vdf::seed::{
    derive_seed, generate_x, Address, BlockContext, Quantity, TradeDigestInputs, TradeDirection,
};
use slowswap_vdf::vdf::wesolowski::fiat_shamir::generate_challenge;
use slowswap_vdf::worker::{VdfEvent, VdfWorker};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vdf-cli")]
#[command(about = "Time-lock proofs for delayed swaps using Wesolowski's VDF over Z/NZ", long_about = None)]
enum Command {
    /// Compute the seed committing to a trade.
    Seed(SeedArguments),

    /// Compute the VDF input for a trade and a block hash.
    StartValue(StartValueArguments),

    /// Compute the VDF output and proof for a trade and a block.
    Evaluate(EvaluateArguments),

    /// Decode a proof payload.
    Decode(DecodeArguments),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    /// The input amount is fixed.
    ExactInput,
    /// The output amount is fixed.
    ExactOutput,
}

#[derive(Args, Clone)]
struct TradeArguments {
    /// Hex encoded address of the account placing the trade.
    #[clap(long)]
    origin: String,

    /// Comma separated hex encoded token addresses along the swap path.
    #[clap(long, value_delimiter = ',')]
    path: Vec<String>,

    /// Which side of the trade is fixed.
    #[clap(long, value_enum, default_value_t = Direction::ExactInput)]
    direction: Direction,

    /// The fixed amount in base units.
    #[clap(long)]
    amount: String,
}

#[derive(Args, Clone, Default)]
struct ConfigArguments {
    /// TOML file with the VDF parameters. The environment is used if not given.
    #[clap(long)]
    config: Option<PathBuf>,

    /// The modulus N, as a decimal or 0x-prefixed hex number.
    #[clap(long)]
    modulus: Option<String>,

    /// The number of sequential squarings T.
    #[clap(long)]
    iterations: Option<u64>,

    /// The number of iterations between two progress reports.
    #[clap(long)]
    checkpoint_interval: Option<u64>,
}

#[derive(Parser, Clone)]
struct SeedArguments {
    #[clap(flatten)]
    trade: TradeArguments,
}

#[derive(Parser, Clone)]
struct StartValueArguments {
    #[clap(flatten)]
    trade: TradeArguments,

    /// The hex encoded hash of the block the run is bound to.
    #[clap(long)]
    block_hash: String,

    #[clap(flatten)]
    config: ConfigArguments,
}

#[derive(Parser, Clone)]
struct EvaluateArguments {
    #[clap(flatten)]
    trade: TradeArguments,

    /// The hex encoded hash of the block the run is bound to.
    #[clap(long)]
    block_hash: String,

    /// The number of the block the run is bound to.
    #[clap(long)]
    block_number: u64,

    #[clap(flatten)]
    config: ConfigArguments,
}

#[derive(Parser, Clone)]
struct DecodeArguments {
    /// The hex encoded 96-byte payload.
    #[clap(long)]
    payload: String,
}

impl TradeArguments {
    fn to_inputs(&self) -> Result<TradeDigestInputs, Error> {
        let origin = Address::from_str(&self.origin).map_err(invalid_input)?;
        let path = self
            .path
            .iter()
            .map(|hop| Address::from_str(hop))
            .collect::<VdfResult<Vec<_>>>()
            .map_err(invalid_input)?;
        let amount = Quantity::from_str(&self.amount).map_err(invalid_input)?;
        let direction = match self.direction {
            Direction::ExactInput => TradeDirection::ExactInput(amount),
            Direction::ExactOutput => TradeDirection::ExactOutput(amount),
        };
        Ok(TradeDigestInputs::new(origin, path, &direction))
    }
}

impl ConfigArguments {
    fn load(&self) -> Result<VdfConfig, Error> {
        let mut config = match &self.config {
            Some(path) => VdfConfig::load_from_file(path),
            None => VdfConfig::from_env(),
        }
        .map_err(invalid_input)?;
        if let Some(modulus) = &self.modulus {
            config.modulus = RSAModulus::from_str(modulus).map_err(invalid_input)?;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(checkpoint_interval) = self.checkpoint_interval {
            config.checkpoint_interval = checkpoint_interval;
        }
        config.validate().map_err(invalid_input)?;
        Ok(config)
    }
}

fn invalid_input(e: VdfError) -> Error {
    Error::new(ErrorKind::InvalidInput, e.to_string())
}

fn encode_word(value: &BigUint) -> Result<String, Error> {
    let word = to_word(value).map_err(invalid_input)?;
    Ok(format!("0x{}", hex::encode(word)))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match execute(Command::parse()) {
        Ok(res) => {
            println!("{}", res);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            println!("Error: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    }
}

fn execute(cmd: Command) -> Result<String, Error> {
    match cmd {
        Command::Seed(arguments) => {
            let seed = derive_seed(&arguments.trade.to_inputs()?).map_err(invalid_input)?;
            Ok(format!("Seed: 0x{}", hex::encode(seed)))
        }

        Command::StartValue(arguments) => {
            let config = arguments.config.load()?;
            let block = BlockContext::from_hex(&arguments.block_hash, 0).map_err(invalid_input)?;
            let seed = derive_seed(&arguments.trade.to_inputs()?).map_err(invalid_input)?;
            let x = generate_x(&config.modulus, &seed, &block.hash);
            Ok(format!("Start value: {}", encode_word(&x)?))
        }

        Command::Evaluate(arguments) => {
            let config = arguments.config.load()?;
            let request = VdfRequest {
                trade: arguments.trade.to_inputs()?,
                block: BlockContext::from_hex(&arguments.block_hash, arguments.block_number)
                    .map_err(invalid_input)?,
            };
            let seed = derive_seed(&request.trade).map_err(invalid_input)?;
            let x = generate_x(&config.modulus, &seed, &request.block.hash);

            let mut worker = VdfWorker::new(&config).map_err(invalid_input)?;
            let mut handle = worker.start(request).map_err(invalid_input)?;
            let mut reported = 0;
            let proof = loop {
                match handle.next() {
                    Some(VdfEvent::Progress { .. }) => {
                        let percent = handle.progress_percent();
                        if percent >= reported + 10 {
                            info!("VDF run {} at {}%", handle.id(), percent);
                            reported = percent;
                        }
                    }
                    Some(VdfEvent::Ready { proof, .. }) => break proof,
                    Some(VdfEvent::Failed { error, .. }) => {
                        return Err(Error::new(ErrorKind::Other, error.to_string()))
                    }
                    Some(VdfEvent::Cancelled { .. }) | None => {
                        return Err(Error::new(ErrorKind::Interrupted, "VDF run was cancelled"))
                    }
                }
            };

            let challenge =
                generate_challenge(&x, proof.output(), &config.modulus, config.iterations)
                    .map_err(invalid_input)?;

            let mut result = "Start value: ".to_string();
            result.push_str(&encode_word(&x)?);
            result.push_str("\nOutput: ");
            result.push_str(&encode_word(proof.output())?);
            result.push_str("\nChallenge: ");
            result.push_str(&encode_word(&challenge)?);
            result.push_str("\nPayload: ");
            result.push_str(&proof.to_hex());
            Ok(result)
        }

        Command::Decode(arguments) => {
            let proof = VdfProof::from_str(&arguments.payload).map_err(invalid_input)?;
            let mut result = "Proof: ".to_string();
            result.push_str(&encode_word(proof.proof())?);
            result.push_str("\nOutput: ");
            result.push_str(&encode_word(proof.output())?);
            result.push_str("\nBlock number: ");
            result.push_str(&proof.block_number().to_string());
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        execute, Command, ConfigArguments, DecodeArguments, Direction, EvaluateArguments,
        SeedArguments, StartValueArguments, TradeArguments,
    };

    const MODULUS: &str =
        "44771746775035800231893057667067514385523709770528832291415080542575843241867";

    fn swap_trade() -> TradeArguments {
        TradeArguments {
            origin: "0x00000000000000000000000000000000000000aa".to_string(),
            path: vec![
                "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2".to_string(),
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
            ],
            direction: Direction::ExactOutput,
            amount: "250000".to_string(),
        }
    }

    fn config(iterations: u64) -> ConfigArguments {
        ConfigArguments {
            modulus: Some(MODULUS.to_string()),
            iterations: Some(iterations),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed() {
        let result = execute(Command::Seed(SeedArguments {
            trade: swap_trade(),
        }))
        .unwrap();
        let expected = "Seed: 0xda127addc3bcac71c7c6cc56b4bba95311729a9602f51e87ee462fe789b1135e";
        assert_eq!(expected, result);
    }

    #[test]
    fn test_start_value() {
        let result = execute(Command::StartValue(StartValueArguments {
            trade: swap_trade(),
            block_hash: "11".repeat(32),
            config: config(1000),
        }))
        .unwrap();
        let expected =
            "Start value: 0x44c0e48903c904f5da280dfa97380ea226b659e8a8939d619384d5eecf7bbaff";
        assert_eq!(expected, result);
    }

    #[test]
    fn test_evaluate() {
        let result = execute(Command::Evaluate(EvaluateArguments {
            trade: swap_trade(),
            block_hash: format!("0x{}", "11".repeat(32)),
            block_number: 17,
            config: config(1000),
        }))
        .unwrap();
        let expected = "Start value: 0x44c0e48903c904f5da280dfa97380ea226b659e8a8939d619384d5eecf7bbaff\nOutput: 0x093ebe309e462a6e3dc347e1452952748c415f5463bfc15ba00052cebcc39adb\nChallenge: 0x75558191362e033cff1a707872e99692d269585cfaf558bdb9228d82ec0a44a9\nPayload: 0x597fb322e7253f6d562bce78b0386372390a82d6b3412b753f466edfe2ad479b093ebe309e462a6e3dc347e1452952748c415f5463bfc15ba00052cebcc39adb0000000000000000000000000000000000000000000000000000000000000011";
        assert_eq!(expected, result);
    }

    #[test]
    fn test_decode() {
        let payload = "0x597fb322e7253f6d562bce78b0386372390a82d6b3412b753f466edfe2ad479b093ebe309e462a6e3dc347e1452952748c415f5463bfc15ba00052cebcc39adb0000000000000000000000000000000000000000000000000000000000000011";
        let result = execute(Command::Decode(DecodeArguments {
            payload: payload.to_string(),
        }))
        .unwrap();
        let expected = "Proof: 0x597fb322e7253f6d562bce78b0386372390a82d6b3412b753f466edfe2ad479b\nOutput: 0x093ebe309e462a6e3dc347e1452952748c415f5463bfc15ba00052cebcc39adb\nBlock number: 17";
        assert_eq!(expected, result);

        assert!(execute(Command::Decode(DecodeArguments {
            payload: payload[..100].to_string(),
        }))
        .is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut trade = swap_trade();
        trade.origin = "0x1234".to_string();
        assert!(execute(Command::Seed(SeedArguments { trade })).is_err());

        let mut trade = swap_trade();
        trade.amount = "-5".to_string();
        assert!(execute(Command::Seed(SeedArguments { trade })).is_err());

        assert!(execute(Command::StartValue(StartValueArguments {
            trade: swap_trade(),
            block_hash: "11".repeat(31),
            config: config(1000),
        }))
        .is_err());

        assert!(execute(Command::Evaluate(EvaluateArguments {
            trade: swap_trade(),
            block_hash: "11".repeat(32),
            block_number: 17,
            config: config(0),
        }))
        .is_err());
    }
}
