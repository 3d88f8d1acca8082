//! Public hashing entry points.
//!
//! Thin wrappers that compose the parameter gate, the keyed hash and the
//! orchestrator for the different calling conventions: plain derivation,
//! garlic escalation of a stored hash, the client/server relief split and
//! the password-hashing-competition prototype.

use base64::engine::general_purpose;
use base64::Engine as _;
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use zeroize::Zeroize;

use crate::core::{rekey, TigerKdfCore};
use crate::error::KdfError;
use crate::hasher::keyed_hash;
use crate::params::{verify_parameters, Params};
use crate::{ENCODED_HASH_SIZE, GENERATED_SALT_SIZE, VERSION};

/// Derives `hash_size` bytes from a password and salt using `mem_size` MiB
/// of memory and default cost parameters (4 KiB blocks, one thread, one
/// repetition, no garlic).
pub fn simple_hash_password(
    hash_size: usize,
    password: &[u8],
    salt: &[u8],
    mem_size: u32,
) -> Result<Vec<u8>, KdfError> {
    let params = Params {
        mem_size,
        ..Params::default()
    };
    hash_password(hash_size, password, salt, 0, None, &params)
}

/// Derives `hash_size` bytes with full control over the cost parameters.
///
/// `data` is optional secret associated data (a second factor, a machine
/// secret); when present it is folded into the salt with one extra
/// keyed-hash call before the derivation. Zeroing password and data copies
/// after the call is the caller's responsibility.
pub fn hash_password(
    hash_size: usize,
    password: &[u8],
    salt: &[u8],
    garlic: u8,
    data: Option<&[u8]>,
    params: &Params,
) -> Result<Vec<u8>, KdfError> {
    verify_parameters(
        hash_size,
        password.len(),
        salt.len(),
        data.map(|d| d.len()),
        0,
        garlic,
        params,
    )?;
    let mut hash = vec![0u8; hash_size];
    initial_hash(&mut hash, password, salt, data);
    TigerKdfCore::new(params, 0, garlic, false).run(&mut hash)?;
    Ok(hash)
}

/// Escalates an existing hash from `old_garlic` to `new_garlic` without
/// the password, doubling memory and time per level. Escalating a stored
/// hash this way yields the same bytes as deriving at `new_garlic`
/// directly. `old_garlic == new_garlic` is a no-op.
pub fn update_password_hash(
    hash: &mut [u8],
    old_garlic: u8,
    new_garlic: u8,
    params: &Params,
) -> Result<(), KdfError> {
    verify_parameters(hash.len(), 16, 16, None, old_garlic, new_garlic, params)?;
    if old_garlic == new_garlic {
        return Ok(());
    }
    TigerKdfCore::new(params, old_garlic + 1, new_garlic, false).run(hash)
}

/// Client half of server-relief mode: the full memory-hard derivation with
/// the final re-key omitted. The result is sent to the server, which
/// finishes it with [`server_hash_password`].
pub fn client_hash_password(
    hash_size: usize,
    password: &[u8],
    salt: &[u8],
    garlic: u8,
    data: Option<&[u8]>,
    params: &Params,
) -> Result<Vec<u8>, KdfError> {
    verify_parameters(
        hash_size,
        password.len(),
        salt.len(),
        data.map(|d| d.len()),
        0,
        garlic,
        params,
    )?;
    let mut hash = vec![0u8; hash_size];
    initial_hash(&mut hash, password, salt, data);
    TigerKdfCore::new(params, 0, garlic, true).run(&mut hash)?;
    Ok(hash)
}

/// Server half of server-relief mode: the cheap final re-key over a
/// client-supplied intermediate hash.
pub fn server_hash_password(hash: &mut [u8], garlic: u8) {
    rekey(hash, garlic);
}

/// Password-hashing-competition prototype: `t_cost` maps to garlic,
/// `m_cost` to MiB of memory, with default block size, parallelism and
/// repetitions.
pub fn phs(
    out: &mut [u8],
    password: &[u8],
    salt: &[u8],
    t_cost: u32,
    m_cost: u32,
) -> Result<(), KdfError> {
    let garlic =
        u8::try_from(t_cost).map_err(|_| KdfError::InvalidParameter("garlic out of range"))?;
    let params = Params {
        mem_size: m_cost,
        ..Params::default()
    };
    let hash = hash_password(out.len(), password, salt, garlic, None, &params)?;
    out.copy_from_slice(&hash);
    Ok(())
}

/// Hashes a password into a self-describing string of the form
/// `$tigerkdf$v=1$m=..,g=..,b=..,p=..,r=..$<salt>$<hash>` with base64
/// salt and hash. A random 16-byte salt is generated when none is given.
pub fn hash_password_encoded(
    password: &str,
    salt: Option<&[u8]>,
    garlic: u8,
    params: &Params,
) -> Result<String, KdfError> {
    let salt = match salt {
        Some(salt) => salt.to_vec(),
        None => {
            let mut salt = vec![0u8; GENERATED_SALT_SIZE];
            rand::thread_rng().fill_bytes(&mut salt);
            salt
        }
    };
    let hash = hash_password(
        ENCODED_HASH_SIZE,
        password.as_bytes(),
        &salt,
        garlic,
        None,
        params,
    )?;
    let engine = general_purpose::STANDARD;
    Ok(format!(
        "$tigerkdf$v={}$m={},g={},b={},p={},r={}${}${}",
        VERSION,
        params.mem_size,
        garlic,
        params.block_size,
        params.parallelism,
        params.repetitions,
        engine.encode(&salt),
        engine.encode(&hash)
    ))
}

/// Checks a password against an encoded hash string, re-deriving with the
/// embedded parameters and comparing in constant time. Any malformed or
/// out-of-range input yields `false`.
pub fn verify(password: &str, encoded: &str) -> bool {
    let Some((garlic, params, salt, expected)) = parse_encoded(encoded) else {
        return false;
    };
    let Ok(mut hash) = hash_password(
        expected.len(),
        password.as_bytes(),
        &salt,
        garlic,
        None,
        &params,
    ) else {
        return false;
    };
    let matches = constant_time_eq(&hash, &expected);
    hash.zeroize();
    matches
}

fn initial_hash(hash: &mut [u8], password: &[u8], salt: &[u8], data: Option<&[u8]>) {
    match data {
        Some(data) => {
            let mut derived_salt = vec![0u8; hash.len()];
            keyed_hash(&mut derived_salt, data, salt);
            keyed_hash(hash, password, &derived_salt);
            derived_salt.zeroize();
        }
        None => keyed_hash(hash, password, salt),
    }
}

fn parse_encoded(encoded: &str) -> Option<(u8, Params, Vec<u8>, Vec<u8>)> {
    let rest = encoded.strip_prefix("$tigerkdf$v=")?;
    let (version, rest) = rest.split_once('$')?;
    if version.parse::<u32>().ok()? != VERSION {
        return None;
    }
    let (param_str, rest) = rest.split_once('$')?;
    let (salt_str, hash_str) = rest.split_once('$')?;

    let mut mem_size = None;
    let mut garlic = None;
    let mut block_size = None;
    let mut parallelism = None;
    let mut repetitions = None;
    for field in param_str.split(',') {
        let (key, value) = field.split_once('=')?;
        match key {
            "m" => set_once(&mut mem_size, value)?,
            "g" => set_once(&mut garlic, value)?,
            "b" => set_once(&mut block_size, value)?,
            "p" => set_once(&mut parallelism, value)?,
            "r" => set_once(&mut repetitions, value)?,
            _ => return None,
        }
    }
    let params = Params {
        mem_size: mem_size?,
        block_size: block_size?,
        parallelism: parallelism?,
        repetitions: repetitions?,
    };

    let engine = general_purpose::STANDARD;
    let salt = engine.decode(salt_str).ok()?;
    let hash = engine.decode(hash_str).ok()?;
    Some((garlic?, params, salt, hash))
}

/// Parses into an empty slot; `None` on duplicates and unparsable values.
fn set_once<T: std::str::FromStr>(slot: &mut Option<T>, value: &str) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(value.parse().ok()?);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> Params {
        Params {
            mem_size: 1,
            ..Params::default()
        }
    }

    #[test]
    fn encoded_string_shape() {
        let params = small_params();
        let encoded = hash_password_encoded("secret", Some(b"0123456789abcdef"), 1, &params).unwrap();
        assert!(encoded.starts_with("$tigerkdf$v=1$m=1,g=1,b=4096,p=1,r=1$"));

        let (garlic, parsed, salt, hash) = parse_encoded(&encoded).unwrap();
        assert_eq!(garlic, 1);
        assert_eq!(parsed, params);
        assert_eq!(salt, b"0123456789abcdef");
        assert_eq!(hash.len(), ENCODED_HASH_SIZE);
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        assert!(parse_encoded("$argon2id$v=19$m=65536$AAAA$BBBB").is_none());
        assert!(parse_encoded("$tigerkdf$v=2$m=1,g=0,b=4096,p=1,r=1$AA$BB").is_none());
        // Duplicate parameter.
        assert!(parse_encoded("$tigerkdf$v=1$m=1,m=2,g=0,b=4096,p=1$AA$BB").is_none());
        // Missing parameter.
        assert!(parse_encoded("$tigerkdf$v=1$m=1,g=0,b=4096,p=1$AA$BB").is_none());
        // Unknown parameter.
        assert!(parse_encoded("$tigerkdf$v=1$m=1,g=0,b=4096,p=1,r=1,x=3$AA$BB").is_none());
        // Bad base64.
        assert!(parse_encoded("$tigerkdf$v=1$m=1,g=0,b=4096,p=1,r=1$!!$BB").is_none());
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let encoded = hash_password_encoded("hunter2", None, 0, &small_params()).unwrap();
        assert!(verify("hunter2", &encoded));
        assert!(!verify("hunter3", &encoded));
        assert!(!verify("hunter2", "$tigerkdf$v=1$not-a-hash"));
    }

    #[test]
    fn associated_data_separates_hashes() {
        let params = small_params();
        let without = hash_password(32, b"pw", b"salt", 0, None, &params).unwrap();
        let with = hash_password(32, b"pw", b"salt", 0, Some(b"device-key"), &params).unwrap();
        let with_other = hash_password(32, b"pw", b"salt", 0, Some(b"device-kez"), &params).unwrap();
        assert_ne!(without, with);
        assert_ne!(with, with_other);
    }
}
