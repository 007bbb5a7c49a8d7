use std::{io::Write, process::ExitCode, time::Duration};

use ab_api::{
    constants::DEFAULT_ADDRESSES_ENDPOINT, util::http_client_with_timeout, AddressApi,
    AddressBookClient, AddressChanges, AddressChangesBuilder, AddressChangesBuilderError,
    AddressField, AddressId, AddressRecord, AddressRecordBuilder, AddressRecordBuilderError,
    EndpointConfig, Notifier,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::future;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "addressbook", about = "Client for the address book service")]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(
        short = 'e',
        long,
        global = true,
        default_value = DEFAULT_ADDRESSES_ENDPOINT,
        help = "Address collection endpoint"
    )]
    pub endpoint: String,

    #[arg(
        short = 't',
        long,
        global = true,
        help = "Give up on a request after this many seconds"
    )]
    pub timeout: Option<u64>,

    #[arg(long, global = true, help = "Write logs as JSON")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(name = "list", about = "Show all addresses")]
    List,

    #[clap(name = "get", about = "Show a single address")]
    Get { id: AddressId },

    #[clap(name = "add", about = "Add an address")]
    Add {
        #[command(flatten)]
        fields: FieldOpts,
    },

    #[clap(name = "update", about = "Change fields of an address")]
    Update {
        id: AddressId,

        #[command(flatten)]
        fields: FieldOpts,
    },

    #[clap(name = "delete", about = "Delete one or more addresses")]
    Delete {
        #[arg(required = true)]
        ids: Vec<AddressId>,
    },

    #[clap(name = "search", about = "Show addresses whose field equals the text, ignoring case")]
    Search { field: AddressField, text: String },

    #[clap(name = "birthdays", about = "Show addresses with a birthday today")]
    Birthdays,

    #[clap(name = "shell", about = "Edit a draft and manage addresses interactively")]
    Shell,
}

#[derive(Args, Debug)]
struct FieldOpts {
    #[arg(long)]
    pub firstname: Option<String>,
    #[arg(long)]
    pub lastname: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub place: Option<String>,
    #[arg(long)]
    pub birthday: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl FieldOpts {
    fn into_record(self) -> Result<AddressRecord, AddressRecordBuilderError> {
        let mut builder = AddressRecordBuilder::default();
        if let Some(firstname) = self.firstname {
            builder.firstname(firstname);
        }
        if let Some(lastname) = self.lastname {
            builder.lastname(lastname);
        }
        if let Some(street) = self.street {
            builder.street(street);
        }
        if let Some(number) = self.number {
            builder.number(number);
        }
        if let Some(postal_code) = self.postal_code {
            builder.postal_code(postal_code);
        }
        if let Some(place) = self.place {
            builder.place(place);
        }
        if let Some(birthday) = self.birthday {
            builder.birthday(birthday);
        }
        if let Some(phone) = self.phone {
            builder.phone(phone);
        }
        if let Some(email) = self.email {
            builder.email(email);
        }
        builder.build()
    }

    fn into_changes(self) -> Result<AddressChanges, AddressChangesBuilderError> {
        let mut builder = AddressChangesBuilder::default();
        if let Some(firstname) = self.firstname {
            builder.firstname(firstname);
        }
        if let Some(lastname) = self.lastname {
            builder.lastname(lastname);
        }
        if let Some(street) = self.street {
            builder.street(street);
        }
        if let Some(number) = self.number {
            builder.number(number);
        }
        if let Some(postal_code) = self.postal_code {
            builder.postal_code(postal_code);
        }
        if let Some(place) = self.place {
            builder.place(place);
        }
        if let Some(birthday) = self.birthday {
            builder.birthday(birthday);
        }
        if let Some(phone) = self.phone {
            builder.phone(phone);
        }
        if let Some(email) = self.email {
            builder.email(email);
        }
        builder.build()
    }
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn init_tracing(log_json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    init_tracing(args.global_opts.log_json);

    let http = http_client_with_timeout(args.global_opts.timeout.map(Duration::from_secs))
        .context("unable to build the HTTP client")?;
    let api = AddressApi::new(http, EndpointConfig::new(args.global_opts.endpoint))?;
    let client = AddressBookClient::with_stdout(api);

    // Failures are already logged by the client; only the exit code is left to set.
    let succeeded = match args.subcommand {
        Command::List => match client.fetch_all().await {
            Ok(addresses) => {
                print_json(&addresses)?;
                true
            }
            Err(_) => false,
        },
        Command::Get { id } => match client.get(&id).await {
            Ok(address) => {
                print_json(&address)?;
                true
            }
            Err(_) => false,
        },
        Command::Add { fields } => {
            let record = fields.into_record()?;
            let ok = client.create(&record).await.is_ok();
            if ok {
                print_json(&client.addresses())?;
            }
            ok
        }
        Command::Update { id, fields } => {
            let changes = fields.into_changes()?;
            if changes.is_empty() {
                anyhow::bail!("nothing to update, pass at least one field");
            }
            let ok = client.update(&id, &changes).await.is_ok();
            if ok {
                print_json(&client.addresses())?;
            }
            ok
        }
        Command::Delete { ids } => {
            // issued together; the list shows whichever refresh lands last
            let results = future::join_all(ids.iter().map(|id| client.delete(id))).await;
            let ok = results.iter().all(Result::is_ok);
            if results.iter().any(Result::is_ok) {
                print_json(&client.addresses())?;
            }
            ok
        }
        Command::Search { field, text } => {
            let ok = client.fetch_all().await.is_ok();
            if ok {
                print_json(&client.search(field, &text))?;
            }
            ok
        }
        Command::Birthdays => {
            let ok = client.fetch_all().await.is_ok();
            if ok {
                print_json(&client.todays_birthdays())?;
            }
            ok
        }
        Command::Shell => {
            run_shell(&client).await?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

const SHELL_HELP: &str = "\
commands:
  list                        show all addresses
  show <id>                   show one address
  search <field> <text...>    addresses whose field equals text
  birthdays                   addresses with a birthday today
  set <field> <value...>      edit the draft
  draft                       show the draft
  clear                       empty the draft
  add                         submit the draft
  update <id> <field> <value...>
  delete <id>
  help
  quit";

async fn run_shell<N: Notifier>(client: &AddressBookClient<N>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let _ = client.fetch_all().await;
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();
        match (command, rest.as_slice()) {
            ("quit" | "exit", _) => break,
            ("help", _) => println!("{SHELL_HELP}"),
            ("list", _) => {
                if client.fetch_all().await.is_ok() {
                    print_addresses(&client.addresses());
                }
            }
            ("show", [id]) => {
                if let Ok(address) = client.get(&parse_id(id)).await {
                    println!("{address}");
                }
            }
            ("set", [field, value @ ..]) => match field.parse::<AddressField>() {
                Ok(field) => client.set_draft_field(field, value.join(" ")),
                Err(e) => println!("{e}"),
            },
            ("search", [field, text @ ..]) => match field.parse::<AddressField>() {
                Ok(field) => print_addresses(&client.search(field, &text.join(" "))),
                Err(e) => println!("{e}"),
            },
            ("birthdays", _) => print_addresses(&client.todays_birthdays()),
            ("draft", _) => println!("{}", client.draft()),
            ("clear", _) => client.clear_draft(),
            ("add", _) => {
                if client.submit_draft().await.is_ok() {
                    print_addresses(&client.addresses());
                }
            }
            ("update", [id, field, value @ ..]) => match field.parse::<AddressField>() {
                Ok(field) => {
                    let mut changes = AddressChanges::default();
                    changes.set_field(field, value.join(" "));
                    if client.update(&parse_id(id), &changes).await.is_ok() {
                        print_addresses(&client.addresses());
                    }
                }
                Err(e) => println!("{e}"),
            },
            ("delete", [id]) => {
                if client.delete(&parse_id(id)).await.is_ok() {
                    print_addresses(&client.addresses());
                }
            }
            _ => println!("unrecognized command, try `help`"),
        }
    }
    Ok(())
}

fn parse_id(raw: &str) -> AddressId {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

fn print_addresses(addresses: &[AddressRecord]) {
    if addresses.is_empty() {
        println!("No addresses.");
    }
    for address in addresses {
        println!("{address}\n");
    }
}
