use anyhow::{Context, Result};
use colored::Colorize;
use contract_abi::{classify_functions, constructor_parameters, parse_abi_value, signature_of, ContractSchema};
use serde::{Deserialize, Serialize};
use shared::{keys, KvStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use studio::assistant::plan_file_write;
use studio::chain::EvmClient;
use studio::compiler::{CompileOutcome, Compiler, SolcCompiler, DEFAULT_FILENAME};
use studio::config::StudioConfig;
use studio::dispatch;
use studio::form::{fields_for, FieldSpec};
use studio::server::{self, AppState};
use studio::session::{CallOutcome, DeploySession, InteractionSession, Mode};
use studio::workspace::ProjectFiles;

/// `{abi, bytecode}` as written by `compile --out` and read by `deploy`
#[derive(Debug, Serialize, Deserialize)]
struct Artifact {
    abi: serde_json::Value,
    bytecode: String,
}

fn open_store(config: &StudioConfig) -> Result<KvStore> {
    let path = config.state_file();
    KvStore::open(&path).with_context(|| format!("Failed to open state file {:?}", path))
}

fn chain_client(config: &StudioConfig) -> Result<EvmClient> {
    EvmClient::new(
        &config.rpc_url,
        config.chain_id(),
        config.private_key.as_deref(),
        config.receipt_timeout,
    )
    .context("Failed to create chain client")
}

fn read_schema(path: &str) -> Result<ContractSchema> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("{} is not JSON", path))?;
    parse_abi_value(value).with_context(|| format!("Invalid ABI in {}", path))
}

fn contract_address(explicit: Option<&str>, store: &KvStore) -> Result<String> {
    explicit
        .or_else(|| store.get(keys::CONTRACT_ADDRESS))
        .map(str::to_string)
        .context("No contract address: pass --address")
}

fn prepare(session: &mut InteractionSession, mode: Mode, signature: &str, args: &[String]) -> Result<()> {
    session.switch_mode(mode);
    session
        .select_function(signature)
        .with_context(|| format!("Available {} functions: {}", mode, session.signatures().join(", ")))?;
    for (index, arg) in args.iter().enumerate() {
        session.set_arg(index, arg.as_str())?;
    }
    Ok(())
}

fn print_fields(fields: &[FieldSpec]) {
    for field in fields {
        println!(
            "    {} {} {}",
            field.label.bold(),
            field.solidity_type.bright_blue(),
            field.placeholder.bright_black()
        );
    }
}

pub async fn serve(config: &StudioConfig) -> Result<()> {
    let compiler = Arc::new(SolcCompiler::new(&config.solc_path));
    server::serve(config.bind, AppState::new(compiler))
        .await
        .with_context(|| format!("Failed to serve on {}", config.bind))
}

pub async fn compile(config: &StudioConfig, source: &str, out: Option<&str>) -> Result<()> {
    let code = fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?;
    let filename = Path::new(source).file_name().and_then(|n| n.to_str());

    let compiler = SolcCompiler::new(&config.solc_path);
    match compiler.compile(&code, filename).await? {
        CompileOutcome::Compiled(contract) => {
            println!("\n{} {}", "✓ Compiled".green().bold(), contract.name.bold());
            println!("  Bytecode: {} bytes", contract.bytecode.len() / 2);
            println!("  Functions: {}", contract.schema.functions().count());
            for warning in &contract.warnings {
                println!("{}", warning.display_text().yellow());
            }

            if let Some(out) = out {
                let artifact = Artifact {
                    abi: contract.abi,
                    bytecode: contract.bytecode,
                };
                fs::write(out, serde_json::to_string_pretty(&artifact)?)
                    .with_context(|| format!("Failed to write {}", out))?;
                println!("  Artifact: {}", out.bright_black());
            }
            Ok(())
        }
        CompileOutcome::Failed(errors) => {
            for error in &errors {
                eprintln!("{}", error.display_text().red());
            }
            anyhow::bail!("Compilation failed with {} error(s)", errors.len())
        }
    }
}

pub fn functions(abi: &str) -> Result<()> {
    let schema = read_schema(abi)?;
    let (read, write) = classify_functions(&schema);

    println!("\n{}", "Read".bold().cyan());
    for function in read {
        println!("  {}", signature_of(function).green());
        print_fields(&fields_for(&function.parameters));
    }

    println!("\n{}", "Write".bold().cyan());
    for function in write {
        println!("  {}", signature_of(function).yellow());
        print_fields(&fields_for(&function.parameters));
    }

    let constructor = constructor_parameters(&schema);
    if !constructor.is_empty() {
        println!("\n{}", "Constructor".bold().cyan());
        print_fields(&fields_for(constructor));
    }
    println!();
    Ok(())
}

pub async fn call(
    config: &StudioConfig,
    abi: &str,
    signature: &str,
    args: &[String],
    address: Option<&str>,
) -> Result<()> {
    let mut store = open_store(config)?;
    let address = contract_address(address, &store)?;

    let mut session = InteractionSession::with_schema(read_schema(abi)?);
    session.set_contract_address(address.as_str());
    prepare(&mut session, Mode::Read, signature, args)?;

    let client = chain_client(config)?;
    let outcome = dispatch::execute_read(&client, &mut session).await;
    store.set(keys::CONTRACT_ADDRESS, address)?;

    match outcome {
        Some(CallOutcome::Value(value)) => {
            println!("{}", value);
            Ok(())
        }
        Some(CallOutcome::Failed(message)) => anyhow::bail!(message),
        _ => anyhow::bail!("Nothing was called"),
    }
}

pub async fn send(
    config: &StudioConfig,
    abi: &str,
    signature: &str,
    args: &[String],
    address: Option<&str>,
) -> Result<()> {
    let mut store = open_store(config)?;
    let address = contract_address(address, &store)?;

    let mut session = InteractionSession::with_schema(read_schema(abi)?);
    session.set_contract_address(address.as_str());
    prepare(&mut session, Mode::Write, signature, args)?;

    let client = chain_client(config)?;
    let wallet = client.has_signer().then_some(&client);
    let outcome = dispatch::execute_write(wallet, &mut session).await;
    store.set(keys::CONTRACT_ADDRESS, address)?;

    match outcome {
        Some(CallOutcome::Submitted(tx_hash)) => {
            println!("{} {}", "Transaction submitted:".green(), tx_hash);
            Ok(())
        }
        Some(CallOutcome::Failed(message)) => anyhow::bail!(message),
        _ => anyhow::bail!("No wallet connected: set SEIATLAS_PRIVATE_KEY"),
    }
}

async fn load_deployable(config: &StudioConfig, source: &str) -> Result<(ContractSchema, String)> {
    if source.ends_with(".sol") {
        let code = fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?;
        let filename = Path::new(source).file_name().and_then(|n| n.to_str());
        return match SolcCompiler::new(&config.solc_path).compile(&code, filename).await? {
            CompileOutcome::Compiled(contract) => Ok((contract.schema, contract.bytecode)),
            CompileOutcome::Failed(errors) => {
                for error in &errors {
                    eprintln!("{}", error.display_text().red());
                }
                anyhow::bail!("Compilation failed with {} error(s)", errors.len())
            }
        };
    }

    let content = fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?;
    let artifact: Artifact =
        serde_json::from_str(&content).with_context(|| format!("{} is not an {{abi, bytecode}} artifact", source))?;
    let schema = parse_abi_value(artifact.abi).with_context(|| format!("Invalid ABI in {}", source))?;
    Ok((schema, artifact.bytecode))
}

pub async fn deploy(config: &StudioConfig, source: &str, args: &[String]) -> Result<()> {
    let (schema, bytecode) = load_deployable(config, source).await?;

    let mut deploy = DeploySession::new(&schema);
    for (index, arg) in args.iter().enumerate() {
        deploy.set_arg(index, arg.as_str())?;
    }

    let client = Arc::new(chain_client(config)?);
    let wallet = client.has_signer().then_some(client.as_ref());
    let tx_hash = match dispatch::deploy_contract(wallet, &schema, &bytecode, &deploy).await {
        Some(CallOutcome::Submitted(tx_hash)) => tx_hash,
        Some(CallOutcome::Failed(message)) => anyhow::bail!(message),
        Some(other) => anyhow::bail!("Unexpected deployment outcome: {}", other),
        None => anyhow::bail!("Nothing to deploy: set SEIATLAS_PRIVATE_KEY and provide bytecode"),
    };
    println!("{} {}", "Deployment submitted. Tx hash:".green(), tx_hash);

    let address = dispatch::spawn_address_lookup(client.clone(), tx_hash)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Address lookup task failed");
            None
        });

    let mut session = InteractionSession::new();
    dispatch::adopt_deployment(&mut session, schema, address);
    if session.contract_address().is_empty() {
        println!("{}", "Contract address not yet known.".yellow());
    } else {
        println!("{} {}", "Contract address:".green(), session.contract_address().bold());
        let mut store = open_store(config)?;
        store.set(keys::CONTRACT_ADDRESS, session.contract_address())?;
    }
    Ok(())
}

pub fn assist(config: &StudioConfig, reply: &str) -> Result<()> {
    let markdown = fs::read_to_string(reply).with_context(|| format!("Failed to read {}", reply))?;

    let mut store = open_store(config)?;
    let mut files = ProjectFiles::load(&store);
    let active = files.active_path().unwrap_or(DEFAULT_FILENAME).to_string();

    let Some(write) = plan_file_write(&markdown, &active) else {
        println!("{}", "Reply contains no code block; nothing to apply.".yellow());
        return Ok(());
    };

    files.apply(&write);
    files.save(&mut store)?;
    println!("{} {}", "Updated".green(), write.path().bold());
    Ok(())
}

pub fn files(config: &StudioConfig) -> Result<()> {
    let store = open_store(config)?;
    let files = ProjectFiles::load(&store);

    println!("\n{}", "Project files:".bold().cyan());
    for file in files.files() {
        let marker = if files.active_path() == Some(file.path.as_str()) {
            "●".green()
        } else if files.open_tabs().contains(&file.path) {
            "○".normal()
        } else {
            " ".normal()
        };
        println!("{} {} {}", marker, file.path, format!("({} bytes)", file.content.len()).bright_black());
    }
    println!();
    Ok(())
}
