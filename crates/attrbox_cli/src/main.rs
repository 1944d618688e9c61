use anyhow::{anyhow, bail, Context, Result};
use attrbox_core::{AttrContainer, AttrRead, AttrValue, ContainerConfig, SystemAllocator};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "attrbox", about = "Build and inspect attrbox attribute containers")]
struct Cli {
    /// Debug-level logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliType {
    Short,
    Int,
    #[value(name = "int64")]
    Int64,
    Byte,
    #[value(name = "uint16")]
    Uint16,
    Float,
    Double,
    Bool,
    String,
    #[value(name = "bytearray")]
    ByteArray,
}

#[derive(Subcommand)]
enum Cmd {
    /// Encode a container and write it to a file
    Build {
        #[arg(long)]
        tag: String,
        /// Attribute as KEY:TYPE=VALUE (bytearray values in hex); repeatable
        #[arg(long = "set", value_name = "KEY:TYPE=VALUE")]
        sets: Vec<String>,
        #[arg(long)]
        out: PathBuf,
        /// Mark readonly; implies --flagged since the bit lives in the flag bytes
        #[arg(long, default_value_t = false)]
        readonly: bool,
        /// Prefix the two flag bytes
        #[arg(long, default_value_t = false)]
        flagged: bool,
        /// JSON container config
        #[arg(long)]
        config: Option<PathBuf>,
    },

    Info {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        flagged: bool,
    },

    Dump {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        flagged: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print one attribute converted to the requested type (zero value when absent)
    Get {
        file: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long = "as", value_enum)]
        as_type: CliType,
        #[arg(long, default_value_t = false)]
        flagged: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Splits `key:type=value`. The key may itself contain ':'; the last one before '=' wins.
fn parse_assignment(raw: &str) -> Result<(String, AttrValue)> {
    let (lhs, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY:TYPE=VALUE, got {raw:?}"))?;
    let (key, ty) = lhs
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("missing :TYPE in {raw:?}"))?;
    let ty = CliType::from_str(ty, true).map_err(|e| anyhow!("bad type in {raw:?}: {e}"))?;
    let value = parse_value(ty, value).with_context(|| format!("bad value in {raw:?}"))?;
    Ok((key.to_owned(), value))
}

fn parse_value(ty: CliType, raw: &str) -> Result<AttrValue> {
    Ok(match ty {
        CliType::Short => AttrValue::Short(raw.parse()?),
        CliType::Int => AttrValue::Int(raw.parse()?),
        CliType::Int64 => AttrValue::Int64(raw.parse()?),
        CliType::Byte => AttrValue::Byte(raw.parse()?),
        CliType::Uint16 => AttrValue::Uint16(raw.parse()?),
        CliType::Float => AttrValue::Float(raw.parse()?),
        CliType::Double => AttrValue::Double(raw.parse()?),
        CliType::Bool => AttrValue::Bool(raw.parse()?),
        CliType::String => AttrValue::String(raw.to_owned()),
        CliType::ByteArray => AttrValue::ByteArray(hex::decode(raw)?),
    })
}

fn load(path: &Path, flagged: bool) -> Result<AttrContainer> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let c = if flagged {
        AttrContainer::parse_flagged(&bytes)
    } else {
        AttrContainer::parse(&bytes)
    };
    c.with_context(|| format!("decode {}", path.display()))
}

fn print_value(c: &AttrContainer, key: &str, ty: CliType) {
    match ty {
        CliType::Short => println!("{}", c.get_as_short(key)),
        CliType::Int => println!("{}", c.get_as_int(key)),
        CliType::Int64 => println!("{}", c.get_as_int64(key)),
        CliType::Byte => println!("{}", c.get_as_byte(key)),
        CliType::Uint16 => println!("{}", c.get_as_uint16(key)),
        CliType::Float => println!("{}", c.get_as_float(key)),
        CliType::Double => println!("{}", c.get_as_double(key)),
        CliType::Bool => println!("{}", c.get_as_bool(key)),
        CliType::String => println!("{}", c.get_as_string(key).unwrap_or_default()),
        CliType::ByteArray => println!("{}", hex::encode(c.get_as_bytearray(key).unwrap_or_default())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Build { tag, sets, out, readonly, flagged, config } => {
            let cfg = match config {
                Some(p) => ContainerConfig::from_json_file(&p)
                    .with_context(|| format!("config {}", p.display()))?,
                None => ContainerConfig::default(),
            };
            let mut c = AttrContainer::create_in(&tag, SystemAllocator, cfg)?;
            for raw in &sets {
                let (key, value) = parse_assignment(raw)?;
                c.set(&key, &value).with_context(|| format!("set {key}"))?;
                debug!(key = %key, ty = %value.attr_type(), "attribute set");
            }
            if readonly {
                c = c.freeze();
                if !flagged {
                    info!("--readonly implies --flagged");
                }
            }
            let flagged = flagged || readonly;
            let bytes = if flagged { c.to_flagged_bytes() } else { c.to_bytes() };
            std::fs::write(&out, &bytes).with_context(|| format!("write {}", out.display()))?;
            info!(attrs = c.attr_num(), "container built");
            println!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        Cmd::Info { file, flagged } => {
            let c = load(&file, flagged)?;
            println!("tag       : {}", String::from_utf8_lossy(c.tag()));
            println!("attributes: {}", c.attr_num());
            println!("length    : {}", c.serialize_length());
            println!("readonly  : {}", c.is_constant());
        }
        Cmd::Dump { file, flagged, json } => {
            let c = load(&file, flagged)?;
            if json {
                let mut attrs = Vec::new();
                for rec in c.records() {
                    let mut v = serde_json::to_value(rec.value()?.to_owned_value())?;
                    match v.as_object_mut() {
                        Some(obj) => {
                            obj.insert("key".into(), String::from_utf8_lossy(rec.key).into());
                        }
                        None => bail!("attribute did not encode as an object"),
                    }
                    attrs.push(v);
                }
                let doc = json!({
                    "tag": String::from_utf8_lossy(c.tag()),
                    "readonly": c.is_constant(),
                    "attributes": attrs,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", c.dump());
            }
        }
        Cmd::Get { file, key, as_type, flagged } => {
            let c = load(&file, flagged)?;
            if !c.contains_key(&key) {
                debug!(key = %key, "key not present, printing zero value");
            }
            print_value(&c, &key, as_type);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parsing() {
        let (k, v) = parse_assignment("code:int=404").unwrap();
        assert_eq!(k, "code");
        assert_eq!(v, AttrValue::Int(404));

        let (k, v) = parse_assignment("a:b:string=x=y").unwrap();
        assert_eq!(k, "a:b");
        assert_eq!(v, AttrValue::String("x=y".into()));

        let (_, v) = parse_assignment("blob:bytearray=00ff10").unwrap();
        assert_eq!(v, AttrValue::ByteArray(vec![0x00, 0xFF, 0x10]));

        let (_, v) = parse_assignment("n:INT64=-5").unwrap();
        assert_eq!(v, AttrValue::Int64(-5));
    }

    #[test]
    fn bad_assignments() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("k=1").is_err());
        assert!(parse_assignment("k:nope=1").is_err());
        assert!(parse_assignment("k:byte=300").is_err());
        assert!(parse_assignment("k:bytearray=zz").is_err());
    }

    #[test]
    fn every_wire_type_has_a_cli_name() {
        for ty in attrbox_core::AttrType::ALL {
            let cli = CliType::from_str(ty.name(), false).unwrap();
            let sample = match ty {
                attrbox_core::AttrType::String => "x",
                attrbox_core::AttrType::ByteArray => "00",
                attrbox_core::AttrType::Bool => "true",
                _ => "1",
            };
            assert_eq!(parse_value(cli, sample).unwrap().attr_type(), ty);
        }
    }
}
