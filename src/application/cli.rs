use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use strum::IntoEnumIterator;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AssessmentScores;
use crate::domain::models::CandidateProfile;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ConversationTurn;
use crate::domain::models::CredentialEntry;
use crate::domain::models::CredentialStore;
use crate::domain::models::GatewayResponse;
use crate::domain::models::ProviderName;
use crate::domain::services::Assessments;
use crate::domain::services::Credentials;
use crate::domain::services::Gateway;
use crate::infrastructure::backends::ProviderManager;

const DEFAULT_INSTRUCTION: &str = "You are a friendly interviewer running a recruitment assessment simulation. Ask one question at a time and stay in character. After each candidate answer, append your evaluation as a ```json block.";

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn create_gateway() -> Gateway {
    return Gateway::new(
        Box::<Credentials>::default(),
        Box::<ProviderManager>::default(),
        &Config::get(ConfigKey::OpenRouterToken),
    );
}

fn print_response(res: &GatewayResponse) -> Result<()> {
    println!("{}", res.display_text);

    if let Some(payload) = &res.structured_payload {
        println!(
            "\n{}\n{}",
            Paint::cyan("Analysis:").bold(),
            serde_json::to_string_pretty(payload)?
        );
    }

    return Ok(());
}

fn format_credential(entry: &CredentialEntry) -> String {
    let mut res = format!(
        "- (ID: {}) {}, Created: {}",
        entry.id, entry.name, entry.created_at
    );

    if let Some(last_used_at) = &entry.last_used_at {
        res = format!("{res}, Last used: {last_used_at}");
    }

    if entry.is_active {
        res = format!("{res} {}", Paint::green("[active]"));
    }

    return res;
}

async fn load_history(matches: &ArgMatches) -> Result<Vec<ConversationTurn>> {
    let history_file = match matches.get_one::<String>("history") {
        Some(history_file) => history_file,
        None => return Ok(vec![]),
    };

    let payload = fs::read_to_string(history_file).await?;
    let history: Vec<ConversationTurn> = serde_json::from_str(&payload)?;

    return Ok(history);
}

async fn ask(matches: &ArgMatches) -> Result<()> {
    let message = matches.get_one::<String>("message").unwrap();
    let instruction = matches.get_one::<String>("instruction").unwrap();
    let history = load_history(matches).await?;

    let prompt = ChatPrompt::new(history, message, instruction);
    let res = create_gateway().send(&prompt).await?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        print_response(&res)?;
    }

    return Ok(());
}

async fn start_chat(matches: &ArgMatches) -> Result<()> {
    let instruction = matches.get_one::<String>("instruction").unwrap();
    let mut history = load_history(matches).await?;
    let gateway = create_gateway();

    println!(
        "{}",
        Paint::new("Assessment chat started. Send an empty message or /quit to finish.").dimmed()
    );

    loop {
        let message: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        let message = message.trim();
        if message.is_empty() || message == "/quit" {
            break;
        }

        let prompt = ChatPrompt::new(history.clone(), message, instruction);
        match gateway.send(&prompt).await {
            Ok(res) => {
                print_response(&res)?;
                history.push(ConversationTurn::user(message));
                history.push(ConversationTurn::agent(&res.display_text));
            }
            Err(err) => {
                eprintln!("{}", Paint::red(err.to_string()));
            }
        }
    }

    return Ok(());
}

async fn print_credentials_list() -> Result<()> {
    let entries = Credentials::default()
        .list()
        .await?
        .iter()
        .map(|entry| {
            return format_credential(entry);
        })
        .collect::<Vec<String>>();

    if entries.is_empty() {
        println!("There are no API keys stored. Add one with `assessor keys add`.");
    } else {
        println!("{}", entries.join("\n"));
    }

    return Ok(());
}

async fn handle_keys(matches: &ArgMatches) -> Result<()> {
    let credentials = Credentials::default();

    match matches.subcommand() {
        Some(("list", _)) => {
            print_credentials_list().await?;
        }
        Some(("add", add_matches)) => {
            let key = add_matches.get_one::<String>("key").unwrap();
            let name = add_matches.get_one::<String>("name").map(|e| return e.as_str());
            let entry = credentials.save(key, name).await?;
            println!("Saved and activated API key {} ({})", entry.name, entry.id);
        }
        Some(("activate", id_matches)) => {
            let id = id_matches.get_one::<String>("id").unwrap();
            if !credentials.set_active(id).await? {
                bail!(format!("No API key found for id {id}"));
            }
            println!("Activated API key {id}");
        }
        Some(("delete", id_matches)) => {
            let id = id_matches.get_one::<String>("id").unwrap();
            credentials.delete(id).await?;
            println!("Deleted API key {id}");
        }
        Some(("rename", rename_matches)) => {
            let id = rename_matches.get_one::<String>("id").unwrap();
            let name = rename_matches.get_one::<String>("name").unwrap();
            if !credentials.rename(id, name).await? {
                bail!(format!("Unable to rename API key {id}"));
            }
            println!("Renamed API key {id} to {name}");
        }
        Some(("clear", _)) => {
            credentials.clear().await?;
            println!("Deleted all API keys");
        }
        Some(("export", _)) => {
            println!("{}", credentials.export().await?);
        }
        Some(("import", import_matches)) => {
            let file = import_matches.get_one::<String>("file").unwrap();
            let payload = fs::read_to_string(file).await?;
            if !credentials.import(&payload).await? {
                bail!(format!("{file} is not a valid API key backup"));
            }
            println!("Imported API keys from {file}");
        }
        Some(("stats", _)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&credentials.stats().await?)?
            );
        }
        Some(("path", _)) => {
            println!("{}", credentials.file_path.to_string_lossy());
        }
        _ => {
            subcommand_keys().print_long_help()?;
        }
    }

    return Ok(());
}

fn scores_from(matches: &ArgMatches) -> AssessmentScores {
    return AssessmentScores {
        logic_score: *matches.get_one::<u8>("logic").unwrap(),
        simulation_score: *matches.get_one::<u8>("simulation").unwrap(),
        overall_score: *matches.get_one::<u8>("overall").unwrap(),
    };
}

async fn summarize(matches: &ArgMatches) -> Result<()> {
    let profile = CandidateProfile {
        name: matches.get_one::<String>("name").unwrap().to_string(),
        major: matches.get_one::<String>("major").unwrap().to_string(),
    };
    let role = matches.get_one::<String>("role").unwrap();
    let feedback = matches.get_one::<String>("feedback").unwrap();

    let gateway = create_gateway();
    let res = Assessments::new(&gateway)
        .summarize(&profile, &scores_from(matches), feedback, role)
        .await;

    println!("{}", serde_json::to_string_pretty(&res)?);
    return Ok(());
}

async fn analyze_traits(matches: &ArgMatches) -> Result<()> {
    let feedback = matches.get_one::<String>("feedback").unwrap();

    let gateway = create_gateway();
    let res = Assessments::new(&gateway)
        .analyze_traits(feedback, &scores_from(matches))
        .await;

    println!("{}", serde_json::to_string_pretty(&res)?);
    return Ok(());
}

async fn print_status() -> Result<()> {
    let active = Credentials::default().get_active().await?;

    for name in ProviderName::iter() {
        let credential = match name {
            ProviderName::Gemini => active.clone().unwrap_or_default(),
            ProviderName::OpenRouter => Config::get(ConfigKey::OpenRouterToken),
        };

        let res = ProviderManager::get(name, &credential)?.health_check().await;
        match res {
            Ok(_) => println!("{name}: {}", Paint::green("ok")),
            Err(err) => println!("{name}: {}", Paint::red(err.to_string())),
        }
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn arg_instruction() -> Arg {
    return Arg::new("instruction")
        .short('i')
        .long("instruction")
        .env("ASSESSOR_INSTRUCTION")
        .num_args(1)
        .default_value(DEFAULT_INSTRUCTION)
        .hide_default_value(true)
        .help("System instruction describing the assessment the agent runs.");
}

fn arg_history() -> Arg {
    return Arg::new("history")
        .long("history")
        .num_args(1)
        .help("Path to a JSON file holding previous turns, e.g. [{\"sender\": \"agent\", \"text\": \"...\"}].");
}

fn arg_score(name: &'static str, help: &'static str) -> Arg {
    return Arg::new(name)
        .long(name)
        .num_args(1)
        .value_parser(value_parser!(u8).range(0..=100))
        .required(true)
        .help(help);
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Send a single message to the assessment agent.")
        .arg(
            Arg::new("message")
                .short('m')
                .long("message")
                .num_args(1)
                .required(true)
                .help("The candidate message to send."),
        )
        .arg(arg_instruction())
        .arg(arg_history())
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the full response as JSON."),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start an interactive assessment conversation.")
        .arg(arg_instruction())
        .arg(arg_history());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        )
        .subcommand(
            Command::new("keys").about("List all config keys as strings.")
        );
}

fn arg_id() -> Arg {
    return Arg::new("id")
        .short('i')
        .long("id")
        .num_args(1)
        .required(true)
        .help("API key ID");
}

fn subcommand_keys() -> Command {
    return Command::new("keys")
        .about("Manage stored Gemini API keys.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all stored API keys."))
        .subcommand(
            Command::new("add")
                .about("Store a new API key and make it the active one.")
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .num_args(1)
                        .required(true)
                        .help("API key"),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .num_args(1)
                        .help("Display name for the key."),
                ),
        )
        .subcommand(
            Command::new("activate")
                .about("Make a stored API key the active one.")
                .arg(arg_id()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a stored API key.")
                .arg(arg_id()),
        )
        .subcommand(
            Command::new("rename")
                .about("Change the display name of a stored API key.")
                .arg(arg_id())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .num_args(1)
                        .required(true)
                        .help("New display name"),
                ),
        )
        .subcommand(Command::new("clear").about("Delete all stored API keys."))
        .subcommand(Command::new("export").about("Print all stored API keys as JSON."))
        .subcommand(
            Command::new("import")
                .about("Replace all stored API keys with a JSON backup.")
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .num_args(1)
                        .required(true)
                        .help("Path to a backup created with `keys export`."),
                ),
        )
        .subcommand(Command::new("stats").about("Show key counts and the masked active key."))
        .subcommand(Command::new("path").about("Print the API key storage file path."));
}

fn subcommand_summary() -> Command {
    return Command::new("summary")
        .about("Generate a final candidate summary and hiring recommendation.")
        .arg(
            Arg::new("name")
                .long("name")
                .num_args(1)
                .required(true)
                .help("Candidate name"),
        )
        .arg(
            Arg::new("major")
                .long("major")
                .num_args(1)
                .required(true)
                .help("Candidate field of study"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .num_args(1)
                .required(true)
                .help("Role the candidate applied for"),
        )
        .arg(arg_score("logic", "Logic test score (0-100)"))
        .arg(arg_score("simulation", "Simulation score (0-100)"))
        .arg(arg_score("overall", "Overall score (0-100)"))
        .arg(
            Arg::new("feedback")
                .long("feedback")
                .num_args(1)
                .default_value("")
                .help("Feedback collected during the simulation"),
        );
}

fn subcommand_traits() -> Command {
    return Command::new("traits")
        .about("Estimate Big Five personality traits from simulation feedback.")
        .arg(
            Arg::new("feedback")
                .long("feedback")
                .num_args(1)
                .required(true)
                .help("Feedback collected during the simulation"),
        )
        .arg(arg_score("logic", "Logic test score (0-100)"))
        .arg(arg_score("simulation", "Simulation score (0-100)"))
        .arg(arg_score("overall", "Overall score (0-100)").required(false).default_value("0"));
}

fn global_arg(key: ConfigKey, env: &'static str, help: String) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("assessor")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_ask())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_keys())
        .subcommand(Command::new("status").about("Health check both AI providers."))
        .subcommand(subcommand_summary())
        .subcommand(subcommand_traits())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ASSESSOR_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(global_arg(
            ConfigKey::CredentialsFile,
            "ASSESSOR_CREDENTIALS_FILE",
            format!("Path to the file storing Gemini API keys. [default: {}]", Config::default(ConfigKey::CredentialsFile)),
        ))
        .arg(global_arg(
            ConfigKey::GeminiModel,
            "ASSESSOR_GEMINI_MODEL",
            format!("Gemini model used while an API key is active. [default: {}]", Config::default(ConfigKey::GeminiModel)),
        ))
        .arg(global_arg(
            ConfigKey::GeminiURL,
            "ASSESSOR_GEMINI_URL",
            format!("Gemini API URL. [default: {}]", Config::default(ConfigKey::GeminiURL)),
        ))
        .arg(global_arg(
            ConfigKey::HealthCheckTimeout,
            "ASSESSOR_HEALTH_CHECK_TIMEOUT",
            format!("Time to wait in milliseconds before timing out when health checking a provider. [default: {}]", Config::default(ConfigKey::HealthCheckTimeout)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterMaxTokens,
            "ASSESSOR_OPENROUTER_MAX_TOKENS",
            format!("Maximum tokens requested from the fallback provider. [default: {}]", Config::default(ConfigKey::OpenRouterMaxTokens)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterModel,
            "ASSESSOR_OPENROUTER_MODEL",
            format!("Model used on the fallback provider. [default: {}]", Config::default(ConfigKey::OpenRouterModel)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterReferer,
            "ASSESSOR_OPENROUTER_REFERER",
            format!("HTTP-Referer sent to OpenRouter. [default: {}]", Config::default(ConfigKey::OpenRouterReferer)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterTemperature,
            "ASSESSOR_OPENROUTER_TEMPERATURE",
            format!("Sampling temperature for the fallback provider. [default: {}]", Config::default(ConfigKey::OpenRouterTemperature)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterTitle,
            "ASSESSOR_OPENROUTER_TITLE",
            format!("Application title sent to OpenRouter. [default: {}]", Config::default(ConfigKey::OpenRouterTitle)),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterToken,
            "ASSESSOR_OPENROUTER_TOKEN",
            "OpenRouter API token used when no Gemini key is active or Gemini fails.".to_string(),
        ))
        .arg(global_arg(
            ConfigKey::OpenRouterURL,
            "ASSESSOR_OPENROUTER_URL",
            format!("OpenAI compatible API URL of the fallback provider. [default: {}]", Config::default(ConfigKey::OpenRouterURL)),
        ));
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("ask", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            ask(subcmd_matches).await?;
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            start_chat(subcmd_matches).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            Some(("keys", _)) => {
                println!("{}", ConfigKey::VARIANTS.join("\n"));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("keys", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            handle_keys(subcmd_matches).await?;
        }
        Some(("status", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            print_status().await?;
        }
        Some(("summary", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            summarize(subcmd_matches).await?;
        }
        Some(("traits", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            analyze_traits(subcmd_matches).await?;
        }
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}
