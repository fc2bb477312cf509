use types::{Address, Bytes, ExecError, RResult, RuntimeError, TxnArrayField, TxnField};

use crate::opcode::{AssetHoldingField, AssetParamsField, GlobalField, Op};

/// An assembled program: its declared pragma version and its resolved
/// instruction sequence. Branch targets are absolute indices into
/// `ops`, computed once here by resolving labels with a linear scan at
/// assembly time rather than re-scanning on every jump at execution
/// time. An unresolved label can never surface mid-execution, and the
/// scan costs nothing extra since the whole program is already
/// available up front.
#[derive(Debug, Clone)]
pub struct Program {
    pub version: u64,
    pub ops: Vec<Op>,
    /// Source line each entry of `ops` was assembled from, same length
    /// and indexing as `ops`; lets the interpreter attach a line number
    /// to runtime errors the same way assembly errors already carry one.
    pub lines: Vec<u32>,
}

/// Maximum declared `#pragma version`. Programs declaring higher are
/// rejected at assembly.
pub const MAX_SCL_VERSION: u64 = 4;

struct Line<'a> {
    number: u32,
    tokens: Vec<String>,
    _raw: &'a str,
}

pub fn assemble(source: &str) -> RResult<Program> {
    let mut physical_lines = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let stripped = strip_comment(raw).trim();
        if stripped.is_empty() {
            continue;
        }
        physical_lines.push(Line {
            number: (idx + 1) as u32,
            tokens: tokenize(stripped),
            _raw: raw,
        });
    }

    let mut iter = physical_lines.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| ExecError::from(RuntimeError::PragmaNotAtFirstLine))?;
    let version = parse_pragma(&first)?;
    if version == 0 || version > MAX_SCL_VERSION {
        return Err(ExecError::from(RuntimeError::PragmaVersionError(version)).with_line(first.number));
    }

    let remaining: Vec<Line> = iter.collect();

    // Pass 1: record label positions (index into the final op list).
    let mut labels = std::collections::HashMap::new();
    let mut op_count = 0usize;
    for line in &remaining {
        if is_label_def(&line.tokens) {
            let name = line.tokens[0].trim_end_matches(':').to_string();
            labels.insert(name, op_count);
        } else {
            op_count += 1;
        }
    }

    // Pass 2: build ops, resolving branch targets against the label map.
    let mut ops = Vec::with_capacity(op_count);
    let mut lines = Vec::with_capacity(op_count);
    for line in &remaining {
        if is_label_def(&line.tokens) {
            continue;
        }
        let op = build_op(&line.tokens, version, &labels)
            .map_err(|e| e.with_line(line.number))?;
        ops.push(op);
        lines.push(line.number);
    }

    Ok(Program { version, ops, lines })
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn is_label_def(tokens: &[String]) -> bool {
    tokens.len() == 1 && tokens[0].ends_with(':') && tokens[0].len() > 1
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current = String::new();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        if c == '"' {
            current.push(c);
            in_quotes = !in_quotes;
            continue;
        }
        if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_pragma(line: &Line) -> RResult<u64> {
    if line.tokens.len() != 3 || line.tokens[0] != "#pragma" || line.tokens[1] != "version" {
        return Err(ExecError::from(RuntimeError::PragmaNotAtFirstLine).with_line(line.number));
    }
    line.tokens[2]
        .parse::<u64>()
        .map_err(|_| ExecError::from(RuntimeError::PragmaVersionError(0)).with_line(line.number))
}

fn parse_u64(s: &str, opcode: &str) -> RResult<u64> {
    s.parse::<u64>()
        .map_err(|_| ExecError::from(RuntimeError::InvalidOpArg(opcode.to_string())))
}

fn parse_usize(s: &str, opcode: &str) -> RResult<usize> {
    Ok(parse_u64(s, opcode)? as usize)
}

fn resolve_label(labels: &std::collections::HashMap<String, usize>, name: &str) -> RResult<usize> {
    labels
        .get(name)
        .copied()
        .ok_or_else(|| ExecError::from(RuntimeError::UnresolvedLabel(name.to_string())))
}

/// Decodes a `byte`-literal tag + value pair into raw bytes. Accepted
/// forms: `base64 "..."`, `base32 "..."`, `hex 0x...`, a bare `0x...`
/// literal, or a quoted UTF-8 string.
fn decode_byte_literal(tokens: &[String]) -> RResult<Bytes> {
    let unquote = |s: &str| -> String {
        s.trim_matches('"').to_string()
    };
    let bytes = match tokens {
        [tag, val] if tag == "base64" => base64_decode(&unquote(val))?,
        [tag, val] if tag == "base32" => {
            base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &unquote(val))
                .ok_or_else(|| ExecError::from(RuntimeError::UnknownDecodeType("base32".to_string())))?
        }
        [tag, val] if tag == "hex" => decode_hex(&unquote(val))?,
        [single] if single.starts_with("0x") => decode_hex(single)?,
        [single] => unquote(single).into_bytes(),
        _ => return Err(ExecError::from(RuntimeError::UnknownDecodeType(tokens.join(" ")))),
    };
    Bytes::new(bytes).map_err(ExecError::from)
}

fn decode_hex(s: &str) -> RResult<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|_| ExecError::from(RuntimeError::UnknownDecodeType(s.to_string())))
}

/// Minimal base64 decoder (standard alphabet, optional `=` padding),
/// used only for the `byte base64 "..."` literal form.
fn base64_decode(s: &str) -> RResult<Vec<u8>> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut table = [255u8; 256];
    for (i, &c) in ALPHABET.iter().enumerate() {
        table[c as usize] = i as u8;
    }
    let cleaned: Vec<u8> = s.bytes().filter(|&b| b != b'=').collect();
    let mut out = Vec::new();
    let mut buf = 0u32;
    let mut bits = 0u32;
    for b in cleaned {
        let v = table[b as usize];
        if v == 255 {
            return Err(ExecError::from(RuntimeError::UnknownDecodeType("base64".to_string())));
        }
        buf = (buf << 6) | v as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
        }
    }
    Ok(out)
}

fn build_op(
    tokens: &[String],
    version: u64,
    labels: &std::collections::HashMap<String, usize>,
) -> RResult<Op> {
    let mnemonic = tokens[0].as_str();
    let args = &tokens[1..];

    let op = match mnemonic {
        "intcblock" => Op::IntCBlock(
            args.iter()
                .map(|a| parse_u64(a, "intcblock"))
                .collect::<RResult<Vec<_>>>()?,
        ),
        "bytecblock" => {
            let mut bytes = Vec::with_capacity(args.len());
            for a in args {
                bytes.push(decode_byte_literal(std::slice::from_ref(a))?);
            }
            Op::ByteCBlock(bytes)
        }
        "intc" => Op::IntC(parse_u64(require_one(args, "intc")?, "intc")?),
        "bytec" => Op::ByteC(parse_u64(require_one(args, "bytec")?, "bytec")?),
        "pushint" => Op::PushInt(parse_u64(require_one(args, "pushint")?, "pushint")?),
        "pushbytes" => Op::PushBytes(decode_byte_literal(args)?),
        "int" => Op::PushInt(parse_u64(require_one(args, "int")?, "int")?),
        "byte" => Op::PushBytes(decode_byte_literal(args)?),
        "addr" => {
            let s = require_one(args, "addr")?;
            let addr = Address::decode_checksum_address(s)?;
            Op::PushBytes(Bytes::from(addr.to_bytes().to_vec()))
        }

        "+" => Op::Add,
        "-" => Op::Sub,
        "*" => Op::Mul,
        "/" => Op::Div,
        "%" => Op::Mod,
        "<" => Op::Lt,
        "<=" => Op::Le,
        ">" => Op::Gt,
        ">=" => Op::Ge,
        "==" => Op::Eq,
        "!=" => Op::Ne,
        "&&" => Op::And,
        "||" => Op::Or,
        "!" => Op::Not,
        "&" => Op::BitAnd,
        "|" => Op::BitOr,
        "^" => Op::BitXor,
        "~" => Op::BitNot,
        "addw" => Op::AddW,
        "mulw" => Op::MulW,

        "len" => Op::Len,
        "itob" => Op::Itob,
        "btoi" => Op::Btoi,
        "concat" => Op::Concat,
        "substring" => {
            if args.len() != 2 {
                return Err(ExecError::from(RuntimeError::AssertFieldLength("substring".to_string())));
            }
            Op::Substring(parse_u64(&args[0], "substring")?, parse_u64(&args[1], "substring")?)
        }
        "substring3" => Op::Substring3,

        "sha256" => Op::Sha256,
        "sha512_256" => Op::Sha512_256,
        "keccak256" => Op::Keccak256,
        "ed25519verify" => Op::Ed25519Verify,

        "bnz" => Op::Bnz(resolve_label(labels, require_one(args, "bnz")?)?),
        "bz" => Op::Bz(resolve_label(labels, require_one(args, "bz")?)?),
        "b" => Op::B(resolve_label(labels, require_one(args, "b")?)?),
        "return" => Op::Return,
        "err" => Op::Err,
        "assert" => Op::Assert,

        "dup" => Op::Dup,
        "dup2" => Op::Dup2,
        "pop" => Op::Pop,
        "swap" => Op::Swap,
        "dig" => Op::Dig(parse_u64(require_one(args, "dig")?, "dig")?),
        "select" => Op::Select,
        "cover" => Op::Cover(parse_u64(require_one(args, "cover")?, "cover")?),
        "uncover" => Op::Uncover(parse_u64(require_one(args, "uncover")?, "uncover")?),

        "setbit" => Op::SetBit,
        "getbit" => Op::GetBit,
        "setbyte" => Op::SetByte,
        "getbyte" => Op::GetByte,

        "store" => Op::Store(parse_u64(require_one(args, "store")?, "store")?),
        "load" => Op::Load(parse_u64(require_one(args, "load")?, "load")?),

        "txn" => Op::Txn(TxnField::from_name(require_one(args, "txn")?)?),
        "txna" => {
            let (field, idx) = require_two(args, "txna")?;
            Op::Txna(TxnArrayField::from_name(field)?, parse_u64(idx, "txna")?)
        }
        "gtxn" => {
            let (g, field) = require_two(args, "gtxn")?;
            Op::Gtxn(parse_usize(g, "gtxn")?, TxnField::from_name(field)?)
        }
        "gtxna" => {
            if args.len() != 3 {
                return Err(ExecError::from(RuntimeError::AssertFieldLength("gtxna".to_string())));
            }
            Op::Gtxna(
                parse_usize(&args[0], "gtxna")?,
                TxnArrayField::from_name(&args[1])?,
                parse_u64(&args[2], "gtxna")?,
            )
        }
        "gtxns" => Op::Gtxns(TxnField::from_name(require_one(args, "gtxns")?)?),
        "gtxnsa" => {
            let (field, idx) = require_two(args, "gtxnsa")?;
            Op::Gtxnsa(TxnArrayField::from_name(field)?, parse_u64(idx, "gtxnsa")?)
        }
        "global" => Op::Global(GlobalField::from_name(require_one(args, "global")?)?),

        "app_opted_in" => Op::AppOptedIn,
        "app_local_get" => Op::AppLocalGet,
        "app_local_get_ex" => Op::AppLocalGetEx,
        "app_global_get" => Op::AppGlobalGet,
        "app_global_get_ex" => Op::AppGlobalGetEx,
        "app_local_put" => Op::AppLocalPut,
        "app_global_put" => Op::AppGlobalPut,
        "app_local_del" => Op::AppLocalDel,
        "app_global_del" => Op::AppGlobalDel,
        "balance" => Op::Balance,
        "min_balance" => Op::MinBalance,
        "asset_holding_get" => {
            Op::AssetHoldingGet(AssetHoldingField::from_name(require_one(args, "asset_holding_get")?)?)
        }
        "asset_params_get" => {
            Op::AssetParamsGet(AssetParamsField::from_name(require_one(args, "asset_params_get")?)?)
        }

        other => return Err(ExecError::from(RuntimeError::UnknownOpcode(other.to_string()))),
    };

    if op.min_version() > version {
        return Err(ExecError::from(RuntimeError::OpcodeVersionGate {
            opcode: mnemonic.to_string(),
            min_version: op.min_version(),
            declared: version,
        }));
    }
    Ok(op)
}

fn require_one<'a>(args: &'a [String], opcode: &str) -> RResult<&'a str> {
    if args.len() != 1 {
        return Err(ExecError::from(RuntimeError::AssertFieldLength(opcode.to_string())));
    }
    Ok(&args[0])
}

fn require_two<'a>(args: &'a [String], opcode: &str) -> RResult<(&'a str, &'a str)> {
    if args.len() != 2 {
        return Err(ExecError::from(RuntimeError::AssertFieldLength(opcode.to_string())));
    }
    Ok((&args[0], &args[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pragma_rejects() {
        let err = assemble("int 1\nreturn\n").unwrap_err();
        assert_eq!(err.kind, RuntimeError::PragmaNotAtFirstLine);
    }

    #[test]
    fn simple_program_assembles() {
        let prog = assemble("#pragma version 2\nint 1\nreturn\n").unwrap();
        assert_eq!(prog.version, 2);
        assert_eq!(prog.ops.len(), 2);
    }

    #[test]
    fn forward_label_resolves() {
        let prog = assemble(
            "#pragma version 2\nint 1\nbnz done\nint 0\ndone:\nreturn\n",
        )
        .unwrap();
        match prog.ops[1] {
            Op::Bnz(idx) => assert_eq!(idx, 3),
            _ => panic!("expected Bnz"),
        }
    }

    #[test]
    fn unresolved_label_fails() {
        let err = assemble("#pragma version 2\nbnz nowhere\n").unwrap_err();
        assert_eq!(err.kind, RuntimeError::UnresolvedLabel("nowhere".to_string()));
    }

    #[test]
    fn opcode_gated_above_declared_version_fails() {
        let err = assemble("#pragma version 1\ndig 0\n").unwrap_err();
        assert!(matches!(err.kind, RuntimeError::OpcodeVersionGate { .. }));
    }
}
