//! # Command Dispatch
//!
//! Maps a parsed `Command` plus its arguments onto exactly one `Storage`
//! call. Arity is checked by the caller (the worker loop) before dispatch
//! ever runs; this module only validates argument *shape* (numeric fields)
//! and reads the payload for `SET`/`HSET`.

use hkv_common::{Command, HkvError, HkvResult, Key};
use hkv_engine::Storage;

use crate::connection::Connection;

/// What a successfully dispatched command produces.
pub enum Outcome {
    /// No values; reply with `OK`.
    Ok,
    /// Reply with a `VALUES` block of these byte strings.
    Values(Vec<Vec<u8>>),
}

/// Runs one already-arity-checked command against `storage`.
pub async fn dispatch(
    conn: &mut Connection,
    storage: &dyn Storage,
    cmd: Command,
    args: &[String],
) -> HkvResult<Outcome> {
    match cmd {
        Command::Get => {
            let key = parse_key(&args[0])?;
            let value = storage.get(&key)?;
            Ok(Outcome::Values(vec![value.into_bytes()]))
        }
        Command::Set => {
            let key = parse_key(&args[0])?;
            let ttl = parse_non_negative(&args[1])?;
            let len = parse_non_negative(&args[2])? as usize;
            let payload = conn.read_payload(len).await?;
            storage.set(key, payload, ttl)?;
            Ok(Outcome::Ok)
        }
        Command::HGet => {
            let key = parse_key(&args[0])?;
            let field = parse_key(&args[1])?;
            let value = storage.hget(&key, &field)?;
            Ok(Outcome::Values(vec![value.into_bytes()]))
        }
        Command::HSet => {
            let key = parse_key(&args[0])?;
            let field = parse_key(&args[1])?;
            let len = parse_non_negative(&args[2])? as usize;
            let payload = conn.read_payload(len).await?;
            storage.hset(key, field, payload)?;
            Ok(Outcome::Ok)
        }
        Command::HGetAll => {
            let key = parse_key(&args[0])?;
            let map = storage.hgetall(&key)?;
            let mut values = Vec::with_capacity(map.len() * 2);
            for (field, value) in map {
                values.push(field.into_bytes());
                values.push(value.into_bytes());
            }
            Ok(Outcome::Values(values))
        }
        Command::Delete => {
            let key = parse_key(&args[0])?;
            storage.delete(&key);
            Ok(Outcome::Ok)
        }
        Command::Keys => {
            let values = storage.keys().into_iter().map(|k| k.into_bytes()).collect();
            Ok(Outcome::Values(values))
        }
        Command::Expire => {
            let key = parse_key(&args[0])?;
            let ttl = parse_non_negative(&args[1])?;
            storage.expire(&key, ttl)?;
            Ok(Outcome::Ok)
        }
        Command::Auth | Command::Quit => {
            unreachable!("AUTH and QUIT are handled by the worker loop before dispatch")
        }
    }
}

fn parse_key(token: &str) -> HkvResult<Key> {
    Key::new(token.as_bytes().to_vec())
}

/// Parses an ASCII-decimal, non-negative integer fitting a 63-bit signed
/// range (ttl/length fields). Anything else — empty, non-digit, negative,
/// or overflowing — is `BadFormat`.
fn parse_non_negative(token: &str) -> HkvResult<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HkvError::BadFormat);
    }
    let value: u64 = token.parse().map_err(|_| HkvError::BadFormat)?;
    if value > i64::MAX as u64 {
        return Err(HkvError::BadFormat);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_numeric() {
        assert!(matches!(parse_non_negative("-1"), Err(HkvError::BadFormat)));
        assert!(matches!(parse_non_negative("abc"), Err(HkvError::BadFormat)));
        assert!(matches!(parse_non_negative(""), Err(HkvError::BadFormat)));
    }

    #[test]
    fn accepts_zero_and_positive() {
        assert_eq!(parse_non_negative("0").unwrap(), 0);
        assert_eq!(parse_non_negative("42").unwrap(), 42);
    }

    #[test]
    fn rejects_overflow_past_63_bits() {
        assert!(matches!(parse_non_negative("99999999999999999999"), Err(HkvError::BadFormat)));
    }
}
