//! tntcodec CLI
//!
//! Encodes requests to hex and decodes hex responses, for inspecting
//! packets by hand.

use clap::{Parser, Subcommand};
use tarantool_codec::protocol::{
    Call, Delete, FieldType, Insert, Key, Ping, Request, Response, Select, Update,
    UpdateOperation,
};
use tarantool_codec::{CodecError, Config, Field, Result, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// tntcodec
#[derive(Parser, Debug)]
#[command(name = "tntcodec")]
#[command(about = "Encode and decode Tarantool 1.5 protocol packets")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a request and print it as hex
    Encode {
        #[command(subcommand)]
        request: EncodeCommand,
    },

    /// Decode a response given as hex
    Decode {
        /// 12-byte header as hex
        #[arg(long)]
        header: String,

        /// Body as hex (may be empty)
        #[arg(long, default_value = "")]
        body: String,

        /// Column types, comma separated (raw, text, integer)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Print rows as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum EncodeCommand {
    /// INSERT a tuple given as a JSON array
    Insert {
        #[arg(short, long)]
        space: u32,

        /// JSON array of values, e.g. '[1, "hello"]'
        values: String,

        #[arg(long)]
        return_tuple: bool,
    },

    /// DELETE by key (JSON scalar or array)
    Delete {
        #[arg(short, long)]
        space: u32,

        key: String,

        #[arg(long)]
        return_tuple: bool,
    },

    /// UPDATE by key with a JSON list of [field_no, op, value] operations
    Update {
        #[arg(short, long)]
        space: u32,

        key: String,

        /// e.g. '[[1, "+", 5]]'
        ops: String,

        #[arg(long)]
        return_tuple: bool,
    },

    /// SELECT by a JSON list of keys
    Select {
        #[arg(short, long)]
        space: u32,

        /// e.g. '[1, [2, "composite"]]'
        keys: String,

        #[arg(short, long, default_value = "0")]
        index: u32,

        #[arg(long, default_value = "0")]
        offset: u32,

        #[arg(long, default_value = "4294967295")]
        limit: u32,
    },

    /// CALL a stored procedure
    Call {
        proc_name: String,

        /// JSON array of arguments
        #[arg(default_value = "[]")]
        args: String,

        #[arg(long)]
        return_tuple: bool,
    },

    /// PING
    Ping,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Encode { request } => build_request(request)
            .and_then(|r| r.encode())
            .map(hex::encode),
        Commands::Decode {
            header,
            body,
            types,
            json,
        } => decode(&header, &body, &types, json),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build_request(command: EncodeCommand) -> Result<Request> {
    let request: Request = match command {
        EncodeCommand::Insert {
            space,
            values,
            return_tuple,
        } => Insert::new(space, parse_fields(&values)?)
            .return_tuple(return_tuple)
            .into(),
        EncodeCommand::Delete {
            space,
            key,
            return_tuple,
        } => Delete::new(space, Key::try_from(parse_value(&key)?)?)
            .return_tuple(return_tuple)
            .into(),
        EncodeCommand::Update {
            space,
            key,
            ops,
            return_tuple,
        } => {
            let ops = match parse_value(&ops)? {
                Value::Array(items) => items
                    .into_iter()
                    .map(UpdateOperation::try_from)
                    .collect::<Result<Vec<_>>>()?,
                other => return Err(CodecError::InvalidOperation(format!(
                    "operations must be an array, got {}",
                    other.type_name()
                ))),
            };
            Update::new(space, Key::try_from(parse_value(&key)?)?, ops)
                .return_tuple(return_tuple)
                .into()
        }
        EncodeCommand::Select {
            space,
            keys,
            index,
            offset,
            limit,
        } => {
            let keys = match parse_value(&keys)? {
                Value::Array(items) => items
                    .into_iter()
                    .map(Key::try_from)
                    .collect::<Result<Vec<_>>>()?,
                other => vec![Key::try_from(other)?],
            };
            Select::new(space, keys)
                .index(index)
                .offset(offset)
                .limit(limit)
                .into()
        }
        EncodeCommand::Call {
            proc_name,
            args,
            return_tuple,
        } => Call::new(proc_name, parse_fields(&args)?)
            .return_tuple(return_tuple)
            .into(),
        EncodeCommand::Ping => Ping.into(),
    };

    tracing::debug!("Built request: {:?}", request);
    Ok(request)
}

fn decode(header: &str, body: &str, types: &[String], json: bool) -> Result<String> {
    let header = decode_hex(header)?;
    let body = decode_hex(body)?;

    let types = types
        .iter()
        .map(|t| t.parse::<FieldType>())
        .collect::<Result<Vec<_>>>()?;

    let mut builder = Config::builder();
    if !types.is_empty() {
        builder = builder.field_types(types);
    }
    let config = builder.build();

    let response = Response::new(&header, &body, config.field_types())?;

    if json {
        return serde_json::to_string(response.rows())
            .map_err(|e| CodecError::Cast(format!("unable to render rows as JSON: {}", e)));
    }

    let mut out = response.to_string();
    if let Some(message) = response.return_message() {
        out.push_str(&format!(
            "\nstatus={} code={} message={}",
            response.completion_status(),
            response.return_code(),
            message
        ));
    }
    Ok(out)
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|e| {
        CodecError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })
}

fn parse_value(input: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(input).map_err(|e| {
        CodecError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;
    json_to_value(json)
}

fn parse_fields(input: &str) -> Result<Vec<Field>> {
    match parse_value(input)? {
        Value::Array(items) => items.into_iter().map(Field::try_from).collect(),
        scalar => Ok(vec![Field::try_from(scalar)?]),
    }
}

fn json_to_value(json: serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(_) => return Err(CodecError::UnsupportedType("object")),
    })
}
